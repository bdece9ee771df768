use crate::api::traits::ConnectApi;
use crate::error::AppError;
use crate::workout::sport::{SportType, resolve_sport};
use crate::workout::steps::{NormalizedStep, normalize_steps, parse_steps};
use crate::workout::tables;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSegment {
    pub segment_order: u32,
    pub sport_type: SportType,
    pub workout_steps: Vec<NormalizedStep>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDocument {
    pub workout_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sport_type: SportType,
    pub estimated_duration_in_secs: i64,
    pub workout_segments: Vec<WorkoutSegment>,
}

/// Everything needed to assemble a [`WorkoutDocument`]; any part may still be missing.
#[derive(Debug, Clone, Default)]
pub struct WorkoutDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sport_key: Option<String>,
    pub sport_id: Option<i64>,
    pub steps: Vec<NormalizedStep>,
}

/// Sum of time-bounded step durations, rounded to whole seconds.
pub fn estimated_duration_secs(steps: &[NormalizedStep]) -> i64 {
    let total: f64 = steps
        .iter()
        .filter(|step| step.end_condition.condition_type_key == tables::TIME_CONDITION)
        .filter_map(|step| step.end_condition_value.as_ref())
        .filter_map(|value| value.as_f64())
        .sum();
    total.round() as i64
}

fn required<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::validation(format!("Workout {what} is required")))
}

impl WorkoutDraft {
    pub fn build(self) -> Result<WorkoutDocument, AppError> {
        let name = required(self.name.as_deref(), "name")?.to_string();
        let sport_key = required(self.sport_key.as_deref(), "sport key")?.to_string();
        let sport_id = self
            .sport_id
            .ok_or_else(|| AppError::validation("Workout sport id is required"))?;
        if self.steps.is_empty() {
            return Err(AppError::validation("Workout steps are required"));
        }

        let sport_type = SportType {
            sport_type_key: sport_key,
            sport_type_id: sport_id,
        };
        Ok(WorkoutDocument {
            workout_name: name,
            description: self.description.filter(|d| !d.trim().is_empty()),
            sport_type: sport_type.clone(),
            estimated_duration_in_secs: estimated_duration_secs(&self.steps),
            workout_segments: vec![WorkoutSegment {
                segment_order: 1,
                sport_type,
                workout_steps: self.steps,
            }],
        })
    }
}

/// User input for a create or update.
#[derive(Debug, Clone, Default)]
pub struct WorkoutInput {
    /// A complete document; when set every other field is ignored.
    pub file: Option<PathBuf>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub steps: Option<String>,
    pub sport_key: Option<String>,
    pub sport_id: Option<i64>,
}

/// Reads a full workout document from disk. Only checks that it is a JSON object.
pub async fn load_workout_file(path: &Path) -> Result<Value, AppError> {
    let content = fs::read_to_string(path).await?;
    let document: Value = serde_json::from_str(&content).map_err(|e| {
        AppError::validation(format!("Invalid workout JSON in {}: {e}", path.display()))
    })?;
    if !document.is_object() {
        return Err(AppError::validation(format!(
            "Workout file {} must contain a JSON object",
            path.display()
        )));
    }
    Ok(document)
}

/// Produces the request body for a workout write.
///
/// Local validation runs before the sport lookup so bad input never reaches the API.
pub async fn prepare_workout_payload<T: ConnectApi + ?Sized>(
    client: &T,
    input: WorkoutInput,
) -> Result<Value, AppError> {
    if let Some(path) = &input.file {
        info!(path = %path.display(), "using workout document from file");
        return load_workout_file(path).await;
    }

    let raw_steps = input
        .steps
        .as_deref()
        .ok_or_else(|| AppError::validation("Pass --file or --steps to describe the workout"))?;
    let steps = normalize_steps(parse_steps(raw_steps)?)?;
    required(input.name.as_deref(), "name")?;

    let sport = resolve_sport(client, input.sport_key.as_deref(), input.sport_id).await?;
    let document = WorkoutDraft {
        name: input.name,
        description: input.description,
        sport_key: Some(sport.sport_type_key),
        sport_id: Some(sport.sport_type_id),
        steps,
    }
    .build()?;

    info!(
        name = %document.workout_name,
        steps = document.workout_segments[0].workout_steps.len(),
        estimated_secs = document.estimated_duration_in_secs,
        "built workout document"
    );
    Ok(serde_json::to_value(document)?)
}
