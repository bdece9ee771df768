use crate::api::traits::ConnectApi;
use crate::cli::{DayArgs, OutputArgs, SpanArgs};
use crate::commands::common::{date_span, get_json, query, show, single_day};
use anyhow::Result;
use serde_json::json;

const RESPIRATION_PATH: &str = "/wellness-service/wellness/daily/respiration";
const SPO2_PATH: &str = "/wellness-service/wellness/daily/spo2";
const BLOOD_PRESSURE_PATH: &str = "/bloodpressure-service/bloodpressure/range";
const LIFESTYLE_PATH: &str = "/lifestylelogging-service/dailyLog";

pub async fn respiration<T: ConnectApi + ?Sized>(
    client: &T,
    day: &DayArgs,
    output: &OutputArgs,
) -> Result<()> {
    let date = single_day(day)?;
    let data = get_json(client, &format!("{RESPIRATION_PATH}/{date}"), None).await?;
    show(&data, output, &format!("Respiration ({date})")).await
}

pub async fn spo2<T: ConnectApi + ?Sized>(
    client: &T,
    day: &DayArgs,
    output: &OutputArgs,
) -> Result<()> {
    let date = single_day(day)?;
    let data = get_json(client, &format!("{SPO2_PATH}/{date}"), None).await?;
    show(&data, output, &format!("SpO2 ({date})")).await
}

pub async fn blood_pressure<T: ConnectApi + ?Sized>(
    client: &T,
    span: &SpanArgs,
    output: &OutputArgs,
) -> Result<()> {
    let range = date_span(span)?;
    let path = format!("{BLOOD_PRESSURE_PATH}/{}/{}", range.start, range.last());
    let params = query([("includeAll", json!(true))]);
    let data = get_json(client, &path, Some(&params)).await?;
    show(&data, output, &format!("Blood Pressure ({})", range.start)).await
}

pub async fn lifestyle<T: ConnectApi + ?Sized>(
    client: &T,
    day: &DayArgs,
    output: &OutputArgs,
) -> Result<()> {
    let date = single_day(day)?;
    let data = get_json(client, &format!("{LIFESTYLE_PATH}/{date}"), None).await?;
    show(&data, output, &format!("Lifestyle ({date})")).await
}
