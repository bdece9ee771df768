use crate::api::traits::ConnectApi;
use crate::cli::{MenstrualArgs, MenstrualCommand};
use crate::commands::common::{get_json, show, single_day};
use crate::dates::parse_date;
use anyhow::Result;

const MENSTRUAL_PATH: &str = "/periodichealth-service/menstrualcycle";

pub async fn handle_menstrual_command<T: ConnectApi + ?Sized>(
    args: MenstrualArgs,
    client: &T,
) -> Result<()> {
    match args.command {
        None => {
            let date = single_day(&args.day)?;
            let path = format!("{MENSTRUAL_PATH}/dayview/{date}");
            let data = get_json(client, &path, None).await?;
            show(&data, &args.output, &format!("Menstrual Cycle ({date})")).await
        }
        Some(MenstrualCommand::Calendar { start, end, output }) => {
            let start = parse_date(&start)?;
            let end = parse_date(&end)?;
            let path = format!("{MENSTRUAL_PATH}/calendar/{start}/{end}");
            let data = get_json(client, &path, None).await?;
            show(&data, &output, &format!("Menstrual Calendar ({start} to {end})")).await
        }
        Some(MenstrualCommand::Pregnancy { output }) => {
            let path = format!("{MENSTRUAL_PATH}/pregnancysnapshot");
            let data = get_json(client, &path, None).await?;
            show(&data, &output, "Pregnancy Summary").await
        }
    }
}
