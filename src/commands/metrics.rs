use crate::api::traits::ConnectApi;
use crate::cli::{Aggregation, MetricsArgs, MetricsCommand, OutputArgs, PredictionType, SpanArgs};
use crate::commands::common::{date_span, display_name, get_json, query, show, single_day};
use crate::dates::parse_date;
use anyhow::Result;
use serde_json::{Value, json};

const MAX_METRICS_PATH: &str = "/metrics-service/metrics/maxmet/daily";
const HRV_PATH: &str = "/hrv-service/hrv";
const TRAINING_READINESS_PATH: &str = "/metrics-service/metrics/trainingreadiness";
const TRAINING_STATUS_PATH: &str = "/metrics-service/metrics/trainingstatus/aggregated";
const FITNESS_AGE_PATH: &str = "/fitnessage-service/fitnessage";
const RACE_PREDICTIONS_PATH: &str = "/metrics-service/metrics/racepredictions";
const ENDURANCE_SCORE_PATH: &str = "/metrics-service/metrics/endurancescore";
const HILL_SCORE_PATH: &str = "/metrics-service/metrics/hillscore";
const LATEST_LACTATE_PATH: &str = "/biometric-service/biometric/latestLactateThreshold";
const LACTATE_STATS_PATH: &str = "/biometric-service/stats";
const CYCLING_FTP_PATH: &str =
    "/biometric-service/biometric/latestFunctionalThresholdPower/CYCLING";

/// Readiness entries computed right after waking carry this input context.
const WAKEUP_CONTEXT: &str = "AFTER_WAKEUP_RESET";

fn aggregation_key(aggregation: Aggregation) -> &'static str {
    match aggregation {
        Aggregation::Daily => "daily",
        Aggregation::Weekly => "weekly",
        Aggregation::Monthly => "monthly",
        Aggregation::Yearly => "yearly",
    }
}

fn prediction_key(prediction_type: PredictionType) -> &'static str {
    match prediction_type {
        PredictionType::Daily => "daily",
        PredictionType::Monthly => "monthly",
    }
}

/// Picks the readiness entry computed after waking up.
fn morning_entry(readiness: Value) -> Value {
    let entries = match readiness {
        Value::Array(entries) => entries,
        single @ Value::Object(_) => vec![single],
        _ => return Value::Null,
    };
    entries
        .into_iter()
        .find(|entry| entry.get("inputContext").and_then(Value::as_str) == Some(WAKEUP_CONTEXT))
        .unwrap_or(Value::Null)
}

/// Scores that answer for one day at the base path and for ranges at `/stats`.
async fn score<T: ConnectApi + ?Sized>(
    client: &T,
    base: &str,
    span: &SpanArgs,
    range_aggregation: &str,
    output: &OutputArgs,
    title: &str,
) -> Result<()> {
    let range = date_span(span)?;
    let data = match &range.end {
        Some(end) => {
            let params = query([
                ("startDate", json!(range.start)),
                ("endDate", json!(end)),
                ("aggregation", json!(range_aggregation)),
            ]);
            get_json(client, &format!("{base}/stats"), Some(&params)).await?
        }
        None => {
            let params = query([("calendarDate", json!(range.start))]);
            get_json(client, base, Some(&params)).await?
        }
    };
    show(&data, output, &format!("{title} ({})", range.start)).await
}

pub async fn handle_metrics_command<T: ConnectApi + ?Sized>(
    args: MetricsArgs,
    client: &T,
) -> Result<()> {
    match args.command {
        MetricsCommand::Vo2max { day, output } => {
            let date = single_day(&day)?;
            let path = format!("{MAX_METRICS_PATH}/{date}/{date}");
            let data = get_json(client, &path, None).await?;
            show(&data, &output, &format!("VO2 Max ({date})")).await
        }
        MetricsCommand::Hrv { day, output } => {
            let date = single_day(&day)?;
            let data = get_json(client, &format!("{HRV_PATH}/{date}"), None).await?;
            show(&data, &output, &format!("HRV ({date})")).await
        }
        MetricsCommand::TrainingReadiness { day, output } => {
            let date = single_day(&day)?;
            let path = format!("{TRAINING_READINESS_PATH}/{date}");
            let data = get_json(client, &path, None).await?;
            show(&data, &output, &format!("Training Readiness ({date})")).await
        }
        MetricsCommand::MorningReadiness { day, output } => {
            let date = single_day(&day)?;
            let path = format!("{TRAINING_READINESS_PATH}/{date}");
            let data = morning_entry(get_json(client, &path, None).await?);
            show(&data, &output, &format!("Morning Readiness ({date})")).await
        }
        MetricsCommand::TrainingStatus { day, output } => {
            let date = single_day(&day)?;
            let path = format!("{TRAINING_STATUS_PATH}/{date}");
            let data = get_json(client, &path, None).await?;
            show(&data, &output, &format!("Training Status ({date})")).await
        }
        MetricsCommand::FitnessAge { day, output } => {
            let date = single_day(&day)?;
            let data = get_json(client, &format!("{FITNESS_AGE_PATH}/{date}"), None).await?;
            show(&data, &output, &format!("Fitness Age ({date})")).await
        }
        MetricsCommand::RacePredictions {
            start,
            end,
            prediction_type,
            output,
        } => {
            let name = display_name(client).await?;
            let data = match (start, end) {
                (Some(start), Some(end)) => {
                    let params = query([
                        ("fromCalendarDate", json!(parse_date(&start)?.to_string())),
                        ("toCalendarDate", json!(parse_date(&end)?.to_string())),
                    ]);
                    let kind = prediction_key(prediction_type);
                    let path = format!("{RACE_PREDICTIONS_PATH}/{kind}/{name}");
                    get_json(client, &path, Some(&params)).await?
                }
                _ => {
                    let path = format!("{RACE_PREDICTIONS_PATH}/latest/{name}");
                    get_json(client, &path, None).await?
                }
            };
            show(&data, &output, "Race Predictions").await
        }
        MetricsCommand::EnduranceScore { span, output } => {
            score(client, ENDURANCE_SCORE_PATH, &span, "weekly", &output, "Endurance Score").await
        }
        MetricsCommand::HillScore { span, output } => {
            score(client, HILL_SCORE_PATH, &span, "daily", &output, "Hill Score").await
        }
        MetricsCommand::LactateThreshold {
            start,
            end,
            aggregation,
            output,
        } => {
            let data = match (start, end) {
                (Some(start), Some(end)) => {
                    let start = parse_date(&start)?;
                    let end = parse_date(&end)?;
                    let params = query([
                        ("aggregation", json!(aggregation_key(aggregation))),
                        ("sport", json!("RUNNING")),
                    ]);
                    let mut ranges = serde_json::Map::new();
                    for (key, stat) in [
                        ("speed", "lactateThresholdSpeed"),
                        ("heartRate", "lactateThresholdHeartRate"),
                    ] {
                        let path = format!("{LACTATE_STATS_PATH}/{stat}/range/{start}/{end}");
                        let stats = get_json(client, &path, Some(&params)).await?;
                        ranges.insert(key.to_string(), stats);
                    }
                    Value::Object(ranges)
                }
                _ => get_json(client, LATEST_LACTATE_PATH, None).await?,
            };
            show(&data, &output, "Lactate Threshold").await
        }
        MetricsCommand::CyclingFtp { output } => {
            let data = get_json(client, CYCLING_FTP_PATH, None).await?;
            show(&data, &output, "Cycling FTP").await
        }
    }
}
