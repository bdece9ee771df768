use crate::api::traits::ConnectApi;
use crate::cli::{DayArgs, OutputArgs, SpanArgs, WeeklyArgs};
use crate::commands::common::{date_span, display_name, get_json, query, show, single_day};
use crate::dates::weeks_before;
use anyhow::Result;
use serde_json::json;

const USER_SUMMARY_PATH: &str = "/usersummary-service/usersummary/daily";
const STEPS_CHART_PATH: &str = "/wellness-service/wellness/dailySummaryChart";
const DAILY_STEPS_PATH: &str = "/usersummary-service/stats/steps/daily";
const WEEKLY_STEPS_PATH: &str = "/usersummary-service/stats/steps/weekly";
const FLOORS_PATH: &str = "/wellness-service/wellness/floorsChartData/daily";
const INTENSITY_PATH: &str = "/wellness-service/wellness/daily/im";
const WEEKLY_INTENSITY_PATH: &str = "/usersummary-service/stats/im/weekly";
const EVENTS_PATH: &str = "/wellness-service/wellness/dailyEvents";
const SLEEP_PATH: &str = "/wellness-service/wellness/dailySleepData";
const HYDRATION_PATH: &str = "/usersummary-service/usersummary/hydration/daily";

pub async fn health<T: ConnectApi + ?Sized>(
    client: &T,
    day: &DayArgs,
    output: &OutputArgs,
) -> Result<()> {
    let date = single_day(day)?;
    let name = display_name(client).await?;
    let params = query([("calendarDate", json!(date))]);
    let data = get_json(client, &format!("{USER_SUMMARY_PATH}/{name}"), Some(&params)).await?;
    show(&data, output, &format!("Daily Summary ({date})")).await
}

/// Weekly totals win over a range, a range over the single-day chart.
pub async fn steps<T: ConnectApi + ?Sized>(
    client: &T,
    span: &SpanArgs,
    weekly: &WeeklyArgs,
    output: &OutputArgs,
) -> Result<()> {
    let range = date_span(span)?;
    if weekly.weekly {
        let path = format!("{WEEKLY_STEPS_PATH}/{}/{}", range.last(), weekly.weeks);
        let data = get_json(client, &path, None).await?;
        return show(&data, output, "Weekly Steps").await;
    }

    match &range.end {
        Some(end) => {
            let path = format!("{DAILY_STEPS_PATH}/{}/{end}", range.start);
            let data = get_json(client, &path, None).await?;
            show(&data, output, &format!("Daily Steps ({} to {end})", range.start)).await
        }
        None => {
            let name = display_name(client).await?;
            let params = query([("date", json!(range.start))]);
            let path = format!("{STEPS_CHART_PATH}/{name}");
            let data = get_json(client, &path, Some(&params)).await?;
            show(&data, output, &format!("Steps ({})", range.start)).await
        }
    }
}

pub async fn floors<T: ConnectApi + ?Sized>(
    client: &T,
    day: &DayArgs,
    output: &OutputArgs,
) -> Result<()> {
    let date = single_day(day)?;
    let data = get_json(client, &format!("{FLOORS_PATH}/{date}"), None).await?;
    show(&data, output, &format!("Floors ({date})")).await
}

pub async fn intensity<T: ConnectApi + ?Sized>(
    client: &T,
    day: &DayArgs,
    weekly: &WeeklyArgs,
    output: &OutputArgs,
) -> Result<()> {
    let date = single_day(day)?;
    if weekly.weekly {
        let start = weeks_before(&date, weekly.weeks)?;
        let path = format!("{WEEKLY_INTENSITY_PATH}/{start}/{date}");
        let data = get_json(client, &path, None).await?;
        return show(&data, output, "Weekly Intensity Minutes").await;
    }
    let data = get_json(client, &format!("{INTENSITY_PATH}/{date}"), None).await?;
    show(&data, output, &format!("Intensity Minutes ({date})")).await
}

pub async fn events<T: ConnectApi + ?Sized>(
    client: &T,
    day: &DayArgs,
    output: &OutputArgs,
) -> Result<()> {
    let date = single_day(day)?;
    let params = query([("calendarDate", json!(date))]);
    let data = get_json(client, EVENTS_PATH, Some(&params)).await?;
    show(&data, output, &format!("Events ({date})")).await
}

pub async fn sleep<T: ConnectApi + ?Sized>(
    client: &T,
    day: &DayArgs,
    output: &OutputArgs,
) -> Result<()> {
    let date = single_day(day)?;
    let name = display_name(client).await?;
    let params = query([("date", json!(date)), ("nonSleepBufferMinutes", json!(60))]);
    let data = get_json(client, &format!("{SLEEP_PATH}/{name}"), Some(&params)).await?;
    show(&data, output, &format!("Sleep ({date})")).await
}

pub async fn hydration<T: ConnectApi + ?Sized>(
    client: &T,
    day: &DayArgs,
    output: &OutputArgs,
) -> Result<()> {
    let date = single_day(day)?;
    let data = get_json(client, &format!("{HYDRATION_PATH}/{date}"), None).await?;
    show(&data, output, &format!("Hydration ({date})")).await
}
