use crate::api::traits::ConnectApi;
use crate::cli::{DevicesArgs, DevicesCommand};
use crate::commands::common::{date_span, get_json, show};
use anyhow::Result;
use serde_json::Value;
use tracing::debug;

const DEVICES_PATH: &str = "/device-service/deviceregistration/devices";
const LAST_USED_PATH: &str = "/device-service/deviceservice/mylastused";
const PRIMARY_DEVICE_PATH: &str = "/web-gateway/device-info/primary-training-device";
const SETTINGS_PATH: &str = "/device-service/deviceservice/device-info/settings";
const SOLAR_PATH: &str = "/web-gateway/solar";

fn device_id(device: &Value) -> Option<String> {
    match device.get("deviceId")? {
        Value::Number(id) => Some(id.to_string()),
        Value::String(id) => Some(id.clone()),
        _ => None,
    }
}

/// Alarms of every registered device, in device order.
async fn collect_alarms<T: ConnectApi + ?Sized>(client: &T) -> Result<Value> {
    let devices = get_json(client, DEVICES_PATH, None).await?;
    let mut alarms = Vec::new();
    for device in devices.as_array().into_iter().flatten() {
        let Some(id) = device_id(device) else {
            continue;
        };
        let settings = get_json(client, &format!("{SETTINGS_PATH}/{id}"), None).await?;
        match settings.get("alarms").and_then(Value::as_array) {
            Some(found) => alarms.extend(found.iter().cloned()),
            None => debug!("Device {id} has no alarms"),
        }
    }
    Ok(Value::Array(alarms))
}

pub async fn handle_devices_command<T: ConnectApi + ?Sized>(
    args: DevicesArgs,
    client: &T,
) -> Result<()> {
    match args.command {
        None => {
            let data = get_json(client, DEVICES_PATH, None).await?;
            show(&data, &args.output, "Devices").await
        }
        Some(DevicesCommand::LastUsed { output }) => {
            let data = get_json(client, LAST_USED_PATH, None).await?;
            show(&data, &output, "Last Used Device").await
        }
        Some(DevicesCommand::Primary { output }) => {
            let data = get_json(client, PRIMARY_DEVICE_PATH, None).await?;
            show(&data, &output, "Primary Training Device").await
        }
        Some(DevicesCommand::Settings { device_id, output }) => {
            let path = format!("{SETTINGS_PATH}/{device_id}");
            let data = get_json(client, &path, None).await?;
            show(&data, &output, &format!("Device Settings ({device_id})")).await
        }
        Some(DevicesCommand::Alarms { output }) => {
            let data = collect_alarms(client).await?;
            show(&data, &output, "Device Alarms").await
        }
        Some(DevicesCommand::Solar {
            device_id,
            span,
            output,
        }) => {
            let range = date_span(&span)?;
            let path = format!("{SOLAR_PATH}/{device_id}/{}/{}", range.start, range.last());
            let data = get_json(client, &path, None).await?;
            show(&data, &output, &format!("Solar ({device_id})")).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::clients::tests::FakeApiClient;
    use crate::cli::{DayArgs, OutputArgs, SpanArgs};
    use crate::output::OutputFormat;
    use serde_json::json;
    use tempfile::tempdir;

    fn quiet() -> OutputArgs {
        OutputArgs {
            format: OutputFormat::Json,
            output: None,
        }
    }

    async fn run(client: &FakeApiClient, command: Option<DevicesCommand>) {
        let args = DevicesArgs {
            command,
            output: quiet(),
        };
        handle_devices_command(args, client).await.unwrap();
    }

    #[tokio::test]
    async fn test_device_paths() {
        let client = FakeApiClient::default();
        run(&client, None).await;
        run(&client, Some(DevicesCommand::LastUsed { output: quiet() })).await;
        run(&client, Some(DevicesCommand::Primary { output: quiet() })).await;
        let settings = DevicesCommand::Settings {
            device_id: "3442".to_string(),
            output: quiet(),
        };
        run(&client, Some(settings)).await;

        let targets: Vec<String> = client
            .recorded_calls()
            .into_iter()
            .map(|call| call.target)
            .collect();
        assert_eq!(
            targets,
            [
                DEVICES_PATH,
                LAST_USED_PATH,
                PRIMARY_DEVICE_PATH,
                "/device-service/deviceservice/device-info/settings/3442",
            ]
        );
    }

    #[tokio::test]
    async fn test_solar_single_day_repeats_date() {
        let client = FakeApiClient::default();
        let span = SpanArgs {
            day: DayArgs {
                when: Some("2024-07-04".to_string()),
                date: None,
            },
            ..SpanArgs::default()
        };
        let solar = DevicesCommand::Solar {
            device_id: "3442".to_string(),
            span,
            output: quiet(),
        };
        run(&client, Some(solar)).await;

        let calls = client.recorded_calls();
        assert_eq!(calls[0].target, "/web-gateway/solar/3442/2024-07-04/2024-07-04");
    }

    #[tokio::test]
    async fn test_alarms_collected_across_devices() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("alarms.json");
        let client = FakeApiClient::default()
            .with_response(
                DEVICES_PATH,
                json!([{"deviceId": 11}, {"displayName": "scale"}, {"deviceId": "22"}]),
            )
            .with_response(
                "/device-service/deviceservice/device-info/settings/11",
                json!({"alarms": [{"alarmTime": 360}]}),
            )
            .with_response(
                "/device-service/deviceservice/device-info/settings/22",
                json!({"alarms": [{"alarmTime": 420}]}),
            );
        let output = OutputArgs {
            format: OutputFormat::Json,
            output: Some(path.clone()),
        };
        run(&client, Some(DevicesCommand::Alarms { output })).await;

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!([{"alarmTime": 360}, {"alarmTime": 420}]));
        assert_eq!(client.recorded_calls().len(), 3);
    }
}
