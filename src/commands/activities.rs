use crate::api::traits::ConnectApi;
use crate::api::types::ActivityCount;
use crate::cli::{ActivitiesCommand, DownloadFormat, ProgressMetric};
use crate::commands::common::{get_json, query, show, show_columns};
use crate::dates::{DateRange, parse_date, resolve_date};
use crate::error::AppError;
use crate::output::{OutputFormat, print_success, render};
use anyhow::{Context, Result};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

const SEARCH_PATH: &str = "/activitylist-service/activities/search/activities";
const COUNT_PATH: &str = "/activitylist-service/activities/count";
const GEAR_PATH: &str = "/gear-service/gear/filterGear";
const PROGRESS_PATH: &str = "/fitnessstats-service/activity";
const UPLOAD_PATH: &str = "/upload-service/upload";

/// Columns shown by `activities list` in table form.
pub const ACTIVITY_LIST_COLUMNS: &[&str] = &[
    "activityId",
    "activityName",
    "activityType",
    "startTimeLocal",
    "distance",
    "duration",
    "averageHR",
];

/// File extensions the upload endpoint accepts.
const UPLOAD_EXTENSIONS: &[&str] = &["fit", "gpx", "tcx"];

fn activity_path(id: u64) -> String {
    format!("/activity-service/activity/{id}")
}

/// Query parameters for the activity search endpoint.
fn search_params(
    range: Option<&DateRange>,
    offset: u32,
    limit: u32,
    activity_type: Option<&str>,
) -> Map<String, Value> {
    let mut params = Map::new();
    if let Some(range) = range {
        params.insert("startDate".into(), json!(range.start));
        params.insert("endDate".into(), json!(range.last()));
    }
    params.insert("start".into(), json!(offset));
    params.insert("limit".into(), json!(limit));
    if let Some(activity_type) = activity_type {
        params.insert("activityType".into(), json!(activity_type));
    }
    params
}

/// The count endpoint answers with either a bare number or an object.
fn parse_count(data: Value) -> Result<ActivityCount> {
    match data {
        Value::Number(total) => Ok(ActivityCount {
            total_count: total.as_u64().unwrap_or_default(),
        }),
        other => serde_json::from_value(other).context("Unexpected activity count response"),
    }
}

/// Download path and default file extension. Original uploads come zipped.
fn download_target(id: u64, format: DownloadFormat) -> (String, &'static str) {
    let kind = match format {
        DownloadFormat::Fit => return (format!("/download-service/files/activity/{id}"), "zip"),
        DownloadFormat::Tcx => "tcx",
        DownloadFormat::Gpx => "gpx",
        DownloadFormat::Kml => "kml",
        DownloadFormat::Csv => "csv",
    };
    (format!("/download-service/export/{kind}/activity/{id}"), kind)
}

fn metric_key(metric: ProgressMetric) -> &'static str {
    match metric {
        ProgressMetric::Distance => "distance",
        ProgressMetric::Duration => "duration",
        ProgressMetric::Elevation => "elevationGain",
    }
}

/// Lower-cased extension of an uploadable file.
fn upload_extension(file: &Path) -> Result<String, AppError> {
    let extension = file
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if UPLOAD_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(AppError::validation(format!(
            "Cannot upload {}: expected a .fit, .gpx or .tcx file",
            file.display()
        )))
    }
}

pub async fn handle_activities_command<T: ConnectApi + ?Sized>(
    command: ActivitiesCommand,
    client: &T,
) -> Result<()> {
    match command {
        ActivitiesCommand::List {
            date,
            start,
            end,
            limit,
            offset,
            activity_type,
            output,
        } => {
            let range = if date.is_some() || start.is_some() || end.is_some() {
                Some(resolve_date(
                    date.as_deref(),
                    start.as_deref(),
                    end.as_deref(),
                )?)
            } else {
                None
            };
            let params = search_params(range.as_ref(), offset, limit, activity_type.as_deref());
            let data = get_json(client, SEARCH_PATH, Some(&params)).await?;
            show_columns(&data, &output, "Activities", ACTIVITY_LIST_COLUMNS).await
        }
        ActivitiesCommand::Last { output } => {
            let params = search_params(None, 0, 1, None);
            let data = get_json(client, SEARCH_PATH, Some(&params)).await?;
            let last = match data {
                Value::Array(mut activities) if !activities.is_empty() => activities.swap_remove(0),
                _ => Value::Null,
            };
            show(&last, &output, "Last Activity").await
        }
        ActivitiesCommand::Get { id, output } => {
            let data = get_json(client, &activity_path(id), None).await?;
            show(&data, &output, &format!("Activity {id}")).await
        }
        ActivitiesCommand::Count { output } => {
            let count = parse_count(get_json(client, COUNT_PATH, None).await?)?;
            match output.format {
                OutputFormat::Json => {
                    render(
                        &serde_json::to_value(&count)?,
                        OutputFormat::Json,
                        None,
                        None,
                        output.output.as_deref(),
                    )
                    .await
                }
                OutputFormat::Table => {
                    println!("Total activities: {}", count.total_count);
                    Ok(())
                }
            }
        }
        ActivitiesCommand::Types { output } => {
            let data = client.list_activity_types().await?;
            show(&data, &output, "Activity Types").await
        }
        ActivitiesCommand::Details { id, output } => {
            let params = query([("maxChartSize", json!(2000)), ("maxPolylineSize", json!(4000))]);
            let path = format!("{}/details", activity_path(id));
            let data = get_json(client, &path, Some(&params)).await?;
            show(&data, &output, &format!("Activity Details {id}")).await
        }
        ActivitiesCommand::Splits { id, output } => {
            let data = get_json(client, &format!("{}/splits", activity_path(id)), None).await?;
            show(&data, &output, &format!("Splits {id}")).await
        }
        ActivitiesCommand::TypedSplits { id, output } => {
            let path = format!("{}/typedsplits", activity_path(id));
            let data = get_json(client, &path, None).await?;
            show(&data, &output, &format!("Typed Splits {id}")).await
        }
        ActivitiesCommand::SplitSummaries { id, output } => {
            let path = format!("{}/split_summaries", activity_path(id));
            let data = get_json(client, &path, None).await?;
            show(&data, &output, &format!("Split Summaries {id}")).await
        }
        ActivitiesCommand::Weather { id, output } => {
            let data = get_json(client, &format!("{}/weather", activity_path(id)), None).await?;
            show(&data, &output, &format!("Weather {id}")).await
        }
        ActivitiesCommand::HrZones { id, output } => {
            let path = format!("{}/hrTimeInZones", activity_path(id));
            let data = get_json(client, &path, None).await?;
            show(&data, &output, &format!("HR Zones {id}")).await
        }
        ActivitiesCommand::PowerZones { id, output } => {
            let path = format!("{}/powerTimeInZones", activity_path(id));
            let data = get_json(client, &path, None).await?;
            show(&data, &output, &format!("Power Zones {id}")).await
        }
        ActivitiesCommand::ExerciseSets { id, output } => {
            let path = format!("{}/exerciseSets", activity_path(id));
            let data = get_json(client, &path, None).await?;
            show(&data, &output, &format!("Exercise Sets {id}")).await
        }
        ActivitiesCommand::Gear { id, output } => {
            let params = query([("activityId", json!(id))]);
            let data = get_json(client, GEAR_PATH, Some(&params)).await?;
            show(&data, &output, &format!("Gear for Activity {id}")).await
        }
        ActivitiesCommand::Download { id, format, output } => {
            let (path, extension) = download_target(id, format);
            let bytes = client
                .download(&path)
                .await
                .with_context(|| format!("Failed to download activity {id}"))?;
            let filename =
                output.unwrap_or_else(|| PathBuf::from(format!("activity_{id}.{extension}")));
            fs::write(&filename, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", filename.display()))?;
            print_success(&format!("Downloaded to {}", filename.display()));
            Ok(())
        }
        ActivitiesCommand::Upload { file, output } => {
            let extension = upload_extension(&file)?;
            let contents = fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("activity.{extension}"));
            info!(file = %file.display(), "uploading activity");
            let result = client
                .upload(&format!("{UPLOAD_PATH}/.{extension}"), &file_name, contents)
                .await
                .with_context(|| format!("Failed to upload {}", file.display()))?;
            print_success(&format!("Uploaded {}", file.display()));
            match result {
                Some(data) => show(&data, &output, "Upload Result").await,
                None => Ok(()),
            }
        }
        ActivitiesCommand::Progress {
            start,
            end,
            metric,
            output,
        } => {
            let start = parse_date(&start)?.to_string();
            let end = parse_date(&end)?.to_string();
            let params = query([
                ("startDate", json!(start)),
                ("endDate", json!(end)),
                ("aggregation", json!("lifetime")),
                ("groupByParentActivityType", json!(true)),
                ("metric", json!(metric_key(metric))),
            ]);
            let data = get_json(client, PROGRESS_PATH, Some(&params)).await?;
            show(&data, &output, &format!("Progress ({start} to {end})")).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::clients::tests::FakeApiClient;
    use crate::cli::OutputArgs;
    use tempfile::tempdir;

    fn quiet() -> OutputArgs {
        OutputArgs {
            format: OutputFormat::Json,
            output: None,
        }
    }

    fn json_to(path: &std::path::Path) -> OutputArgs {
        OutputArgs {
            format: OutputFormat::Json,
            output: Some(path.to_path_buf()),
        }
    }

    #[test]
    fn test_search_params_for_range() {
        let range = DateRange {
            start: "2024-01-01".to_string(),
            end: Some("2024-01-31".to_string()),
        };
        let params = search_params(Some(&range), 5, 10, Some("running"));
        assert_eq!(
            Value::Object(params),
            json!({
                "startDate": "2024-01-01",
                "endDate": "2024-01-31",
                "start": 5,
                "limit": 10,
                "activityType": "running"
            })
        );
    }

    #[test]
    fn test_single_day_uses_same_start_and_end() {
        let range = DateRange {
            start: "2024-03-10".to_string(),
            end: None,
        };
        let params = search_params(Some(&range), 0, 20, None);
        assert_eq!(params["endDate"], json!("2024-03-10"));
        assert!(!params.contains_key("activityType"));
    }

    #[test]
    fn test_parse_count_shapes() {
        assert_eq!(parse_count(json!(42)).unwrap().total_count, 42);
        assert_eq!(parse_count(json!({"totalCount": 7})).unwrap().total_count, 7);
        assert!(parse_count(json!("many")).is_err());
    }

    #[tokio::test]
    async fn test_last_picks_first_activity() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("last.json");
        let client = FakeApiClient::default().with_response(
            SEARCH_PATH,
            json!([{"activityId": 3, "activityName": "Morning Run"}]),
        );

        handle_activities_command(ActivitiesCommand::Last { output: json_to(&path) }, &client)
            .await
            .unwrap();

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!({"activityId": 3, "activityName": "Morning Run"}));
    }

    #[tokio::test]
    async fn test_list_with_invalid_date_fails_before_request() {
        let client = FakeApiClient::default();
        let command = ActivitiesCommand::List {
            date: Some("not-a-date".to_string()),
            start: None,
            end: None,
            limit: 20,
            offset: 0,
            activity_type: None,
            output: OutputArgs::default(),
        };
        assert!(handle_activities_command(command, &client).await.is_err());
        assert!(client.recorded_calls().is_empty());
    }

    #[tokio::test]
    async fn test_get_uses_activity_path() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("activity.json");
        let client = FakeApiClient::default()
            .with_response("/activity-service/activity/77", json!({"activityId": 77}));

        handle_activities_command(
            ActivitiesCommand::Get {
                id: 77,
                output: json_to(&path),
            },
            &client,
        )
        .await
        .unwrap();

        assert_eq!(client.recorded_calls()[0].target, "/activity-service/activity/77");
        assert!(std::fs::read_to_string(&path).unwrap().contains("77"));
    }

    #[tokio::test]
    async fn test_list_table_shows_summary_columns() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("list.txt");
        let client = FakeApiClient::default().with_response(
            SEARCH_PATH,
            json!([{
                "activityId": 3,
                "activityName": "Morning Run",
                "activityType": {"typeKey": "running"},
                "averageHR": 151,
                "calories": 420,
                "distance": 10000.0,
                "duration": 3000.5,
                "startTimeLocal": "2024-03-10 07:00:00"
            }]),
        );
        let command = ActivitiesCommand::List {
            date: None,
            start: None,
            end: None,
            limit: 20,
            offset: 0,
            activity_type: None,
            output: OutputArgs {
                format: OutputFormat::Table,
                output: Some(path.clone()),
            },
        };
        handle_activities_command(command, &client).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let header: Vec<&str> = written.lines().nth(1).unwrap().split_whitespace().collect();
        assert_eq!(header, ACTIVITY_LIST_COLUMNS);
        assert!(!written.contains("calories"));
        assert!(written.contains(r#"{"typeKey":"running"}"#));
    }

    #[tokio::test]
    async fn test_subresource_paths() {
        let client = FakeApiClient::default();
        let commands = [
            (ActivitiesCommand::Splits { id: 5, output: quiet() }, "splits"),
            (ActivitiesCommand::TypedSplits { id: 5, output: quiet() }, "typedsplits"),
            (ActivitiesCommand::SplitSummaries { id: 5, output: quiet() }, "split_summaries"),
            (ActivitiesCommand::Weather { id: 5, output: quiet() }, "weather"),
            (ActivitiesCommand::HrZones { id: 5, output: quiet() }, "hrTimeInZones"),
            (ActivitiesCommand::PowerZones { id: 5, output: quiet() }, "powerTimeInZones"),
            (ActivitiesCommand::ExerciseSets { id: 5, output: quiet() }, "exerciseSets"),
        ];
        for (command, suffix) in commands {
            handle_activities_command(command, &client).await.unwrap();
            assert_eq!(
                client.recorded_calls().last().unwrap().target,
                format!("/activity-service/activity/5/{suffix}")
            );
        }
    }

    #[tokio::test]
    async fn test_details_and_gear_send_params() {
        let client = FakeApiClient::default();
        handle_activities_command(ActivitiesCommand::Details { id: 8, output: quiet() }, &client)
            .await
            .unwrap();
        handle_activities_command(ActivitiesCommand::Gear { id: 8, output: quiet() }, &client)
            .await
            .unwrap();

        let calls = client.recorded_calls();
        assert_eq!(calls[0].target, "/activity-service/activity/8/details");
        assert_eq!(
            calls[0].params,
            Some(json!({"maxChartSize": 2000, "maxPolylineSize": 4000}))
        );
        assert_eq!(calls[1].target, GEAR_PATH);
        assert_eq!(calls[1].params, Some(json!({"activityId": 8})));
    }

    #[tokio::test]
    async fn test_download_defaults_to_zip_for_fit() {
        assert_eq!(
            download_target(4, DownloadFormat::Fit),
            ("/download-service/files/activity/4".to_string(), "zip")
        );
        assert_eq!(
            download_target(4, DownloadFormat::Gpx),
            ("/download-service/export/gpx/activity/4".to_string(), "gpx")
        );

        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("ride.tcx");
        let client = FakeApiClient::default();
        let command = ActivitiesCommand::Download {
            id: 4,
            format: DownloadFormat::Tcx,
            output: Some(path.clone()),
        };
        handle_activities_command(command, &client).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b".FIT");
        assert_eq!(
            client.recorded_calls()[0].target,
            "/download-service/export/tcx/activity/4"
        );
    }

    #[tokio::test]
    async fn test_upload_sends_file_under_its_extension() {
        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("Evening.FIT");
        std::fs::write(&file, b"fit-bytes").unwrap();
        let client = FakeApiClient::default();

        let command = ActivitiesCommand::Upload {
            file,
            output: OutputArgs::default(),
        };
        handle_activities_command(command, &client).await.unwrap();

        let calls = client.recorded_calls();
        assert_eq!(calls[0].transport, "upload");
        assert_eq!(calls[0].target, "/upload-service/upload/.fit");
        assert_eq!(calls[0].body, Some(json!({"fileName": "Evening.FIT", "size": 9})));
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_extension() {
        let client = FakeApiClient::default();
        let command = ActivitiesCommand::Upload {
            file: PathBuf::from("notes.txt"),
            output: OutputArgs::default(),
        };
        let err = handle_activities_command(command, &client).await.unwrap_err();
        assert!(err.to_string().contains(".fit, .gpx or .tcx"));
        assert!(client.recorded_calls().is_empty());
    }

    #[tokio::test]
    async fn test_progress_maps_metric() {
        let client = FakeApiClient::default();
        let command = ActivitiesCommand::Progress {
            start: "2024-01-01".to_string(),
            end: "2024-03-31".to_string(),
            metric: ProgressMetric::Elevation,
            output: OutputArgs::default(),
        };
        handle_activities_command(command, &client).await.unwrap();

        let params = client.recorded_calls()[0].params.clone().unwrap();
        assert_eq!(params["metric"], json!("elevationGain"));
        assert_eq!(params["startDate"], json!("2024-01-01"));
        assert_eq!(params["endDate"], json!("2024-03-31"));
    }
}
