use crate::api::traits::{ConnectApi, WriteTransport};
use crate::api::types::HttpMethod;
use crate::cli::{OutputArgs, WorkoutPayloadArgs, WorkoutsCommand};
use crate::commands::common::{get_json, show};
use crate::output::print_success;
use crate::workout::builder::{WorkoutInput, prepare_workout_payload};
use crate::workout::dispatch::dispatch_write;
use anyhow::{Context, Result};
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

const WORKOUTS_PATH: &str = "/workout-service/workouts";
const WORKOUT_PATH: &str = "/workout-service/workout";

fn workout_path(id: u64) -> String {
    format!("{WORKOUT_PATH}/{id}")
}

impl From<WorkoutPayloadArgs> for WorkoutInput {
    fn from(args: WorkoutPayloadArgs) -> Self {
        Self {
            file: args.file,
            name: args.name,
            description: args.description,
            steps: args.steps,
            sport_key: args.sport_key,
            sport_id: args.sport_id,
        }
    }
}

/// The update endpoint expects the workout ID inside the document too.
fn with_workout_id(mut payload: Value, id: u64) -> Value {
    if let Value::Object(map) = &mut payload {
        map.entry("workoutId").or_insert_with(|| json!(id));
    }
    payload
}

pub async fn handle_workouts_command<T>(command: WorkoutsCommand, client: &T) -> Result<()>
where
    T: ConnectApi + WriteTransport + ?Sized,
{
    match command {
        WorkoutsCommand::List {
            start,
            limit,
            output,
        } => {
            let mut params = Map::new();
            params.insert("start".into(), json!(start));
            params.insert("limit".into(), json!(limit));
            let data = get_json(client, WORKOUTS_PATH, Some(&params)).await?;
            show(&data, &output, "Workouts").await
        }
        WorkoutsCommand::Get { id, output } => {
            let data = get_json(client, &workout_path(id), None).await?;
            show(&data, &output, &format!("Workout {id}")).await
        }
        WorkoutsCommand::Download { id, output } => {
            let path = format!("{WORKOUT_PATH}/FIT/{id}");
            let bytes = client
                .download(&path)
                .await
                .with_context(|| format!("Failed to download workout {id}"))?;
            let filename = output.unwrap_or_else(|| PathBuf::from(format!("workout_{id}.fit")));
            fs::write(&filename, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", filename.display()))?;
            print_success(&format!("Downloaded to {}", filename.display()));
            Ok(())
        }
        WorkoutsCommand::Scheduled { id, output } => {
            let path = format!("/workout-service/schedule/{id}");
            let data = get_json(client, &path, None).await?;
            show(&data, &output, &format!("Scheduled Workout {id}")).await
        }
        WorkoutsCommand::Create { payload, output } => {
            let body = prepare_workout_payload(client, payload.into()).await?;
            info!("creating workout");
            let created = dispatch_write(client, HttpMethod::Post, WORKOUT_PATH, Some(&body))
                .await
                .context("Failed to create workout")?;
            print_success("Workout created.");
            show_result(created, &output, "Created Workout").await
        }
        WorkoutsCommand::Update {
            id,
            payload,
            output,
        } => {
            let body = with_workout_id(prepare_workout_payload(client, payload.into()).await?, id);
            info!(id, "updating workout");
            let updated = dispatch_write(client, HttpMethod::Put, &workout_path(id), Some(&body))
                .await
                .with_context(|| format!("Failed to update workout {id}"))?;
            print_success(&format!("Workout {id} updated."));
            show_result(updated, &output, "Updated Workout").await
        }
        WorkoutsCommand::Delete { id } => {
            dispatch_write(client, HttpMethod::Delete, &workout_path(id), None)
                .await
                .with_context(|| format!("Failed to delete workout {id}"))?;
            print_success(&format!("Workout {id} deleted."));
            Ok(())
        }
    }
}

/// Writes may answer with an empty body; only render when there is one.
async fn show_result(result: Option<Value>, output: &OutputArgs, title: &str) -> Result<()> {
    match result {
        Some(data) => show(&data, output, title).await,
        None => Ok(()),
    }
}
