use crate::api::traits::ConnectApi;
use crate::cli::{HeartArgs, HeartCommand};
use crate::commands::common::{display_name, get_json, query, show, single_day};
use anyhow::Result;
use serde_json::json;

const HEART_RATE_PATH: &str = "/wellness-service/wellness/dailyHeartRate";
const USER_STATS_PATH: &str = "/userstats-service/wellness/daily";
/// Metric ID of resting heart rate in the user-stats service.
const RESTING_HR_METRIC: u32 = 60;

pub async fn handle_heart_command<T: ConnectApi + ?Sized>(
    args: HeartArgs,
    client: &T,
) -> Result<()> {
    match args.command {
        None => {
            let date = single_day(&args.day)?;
            let name = display_name(client).await?;
            let params = query([("date", json!(date))]);
            let path = format!("{HEART_RATE_PATH}/{name}");
            let data = get_json(client, &path, Some(&params)).await?;
            show(&data, &args.output, &format!("Heart Rate ({date})")).await
        }
        Some(HeartCommand::Resting { day, output }) => {
            let date = single_day(&day)?;
            let name = display_name(client).await?;
            let params = query([
                ("fromDate", json!(date)),
                ("untilDate", json!(date)),
                ("metricId", json!(RESTING_HR_METRIC)),
            ]);
            let path = format!("{USER_STATS_PATH}/{name}");
            let data = get_json(client, &path, Some(&params)).await?;
            show(&data, &output, &format!("Resting Heart Rate ({date})")).await
        }
    }
}
