use crate::api::traits::ConnectApi;
use crate::cli::{OutputArgs, SpanArgs, StressArgs, StressCommand};
use crate::commands::common::{date_span, get_json, query, show, single_day};
use anyhow::Result;
use serde_json::json;

const DAILY_STRESS_PATH: &str = "/wellness-service/wellness/dailyStress";
const WEEKLY_STRESS_PATH: &str = "/usersummary-service/stats/stress/weekly";
const BATTERY_REPORT_PATH: &str = "/wellness-service/wellness/bodyBattery/reports/daily";
const BATTERY_EVENTS_PATH: &str = "/wellness-service/wellness/bodyBattery/events";

pub async fn handle_stress_command<T: ConnectApi + ?Sized>(
    args: StressArgs,
    client: &T,
) -> Result<()> {
    match args.command {
        None => {
            let date = single_day(&args.day)?;
            if args.weekly.weekly {
                let path = format!("{WEEKLY_STRESS_PATH}/{date}/{}", args.weekly.weeks);
                let data = get_json(client, &path, None).await?;
                return show(&data, &args.output, "Weekly Stress").await;
            }
            let data = get_json(client, &format!("{DAILY_STRESS_PATH}/{date}"), None).await?;
            show(&data, &args.output, &format!("Stress ({date})")).await
        }
        Some(StressCommand::AllDay { day, output }) => {
            let date = single_day(&day)?;
            let data = get_json(client, &format!("{DAILY_STRESS_PATH}/{date}"), None).await?;
            show(&data, &output, &format!("All-Day Stress ({date})")).await
        }
    }
}

/// Body battery report for a day or range, or the events of the first day.
pub async fn battery<T: ConnectApi + ?Sized>(
    client: &T,
    span: &SpanArgs,
    events: bool,
    output: &OutputArgs,
) -> Result<()> {
    let range = date_span(span)?;
    if events {
        let path = format!("{BATTERY_EVENTS_PATH}/{}", range.start);
        let data = get_json(client, &path, None).await?;
        return show(&data, output, &format!("Body Battery Events ({})", range.start)).await;
    }

    let params = query([
        ("startDate", json!(range.start)),
        ("endDate", json!(range.last())),
    ]);
    let data = get_json(client, BATTERY_REPORT_PATH, Some(&params)).await?;
    show(&data, output, &format!("Body Battery ({})", range.start)).await
}
