use crate::error::AppError;
use crate::workout::tables::{self, TableEntry};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// A step object exactly as the user supplied it.
pub type RawStep = Map<String, Value>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepType {
    pub step_type_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_type_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EndCondition {
    pub condition_type_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_type_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TargetType {
    pub workout_target_type_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_target_type_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A step in the shape the workout endpoint expects.
///
/// Fields the caller supplied that are not modelled here are kept in `extra`
/// and serialized unchanged.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedStep {
    pub step_order: u64,
    pub step_type: StepType,
    pub end_condition: EndCondition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_condition_value: Option<Number>,
    pub target_type: TargetType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_number: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parsed `target` shorthand.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSpec {
    pub key: &'static str,
    pub value: Option<Number>,
}

/// Lower-cases `key` and fills ID and display order from `lookup` where the caller left them out.
fn fill_from_table(
    key: &mut String,
    id: &mut Option<i64>,
    display_order: &mut Option<i64>,
    lookup: fn(&str) -> Option<&'static TableEntry>,
) {
    *key = key.trim().to_lowercase();
    if let Some(entry) = lookup(key) {
        id.get_or_insert(entry.id);
        display_order.get_or_insert(entry.display_order());
    }
}

impl StepType {
    pub fn from_key(key: &str) -> Self {
        Self {
            step_type_key: key.to_string(),
            step_type_id: None,
            display_order: None,
            extra: Map::new(),
        }
    }

    fn complete(&mut self) {
        fill_from_table(
            &mut self.step_type_key,
            &mut self.step_type_id,
            &mut self.display_order,
            tables::step_type,
        );
    }
}

impl EndCondition {
    pub fn from_key(key: &str) -> Self {
        Self {
            condition_type_key: key.to_string(),
            condition_type_id: None,
            display_order: None,
            extra: Map::new(),
        }
    }

    fn complete(&mut self) {
        fill_from_table(
            &mut self.condition_type_key,
            &mut self.condition_type_id,
            &mut self.display_order,
            tables::end_condition,
        );
    }
}

impl TargetType {
    pub fn from_key(key: &str) -> Self {
        Self {
            workout_target_type_key: key.to_string(),
            workout_target_type_id: None,
            display_order: None,
            extra: Map::new(),
        }
    }

    fn complete(&mut self) {
        fill_from_table(
            &mut self.workout_target_type_key,
            &mut self.workout_target_type_id,
            &mut self.display_order,
            tables::target_type,
        );
    }
}

/// Parses `raw` as a non-empty JSON array of step objects, preserving input order.
pub fn parse_steps(raw: &str) -> Result<Vec<RawStep>, AppError> {
    let parsed: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::validation(format!("Invalid steps JSON: {e}")))?;

    let Value::Array(items) = parsed else {
        return Err(AppError::validation("Steps must be a JSON array"));
    };
    if items.is_empty() {
        return Err(AppError::validation("Steps must contain at least one step"));
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(step) => Ok(step),
            other => Err(AppError::validation(format!(
                "Step {} must be a JSON object, got {other}",
                index + 1
            ))),
        })
        .collect()
}

/// Integer when the text parses as one (signed, then unsigned), float otherwise.
fn parse_numeric_text(text: &str) -> Option<Number> {
    let text = text.trim();
    if let Ok(int) = text.parse::<i64>() {
        return Some(Number::from(int));
    }
    if let Ok(int) = text.parse::<u64>() {
        return Some(Number::from(int));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

fn numeric_field(value: &Value, label: &str) -> Result<Number, AppError> {
    match value {
        Value::Number(number) => Ok(number.clone()),
        Value::String(text) => parse_numeric_text(text).ok_or_else(|| {
            AppError::validation(format!("{label} must be numeric, got '{text}'"))
        }),
        other => Err(AppError::validation(format!(
            "{label} must be numeric, got {other}"
        ))),
    }
}

/// Parses a `target` shorthand: `kind` or `kind:value`. A bare number is a heart-rate zone.
pub fn parse_target(target: Option<&Value>) -> Result<Option<TargetSpec>, AppError> {
    match target {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(zone)) => Ok(Some(TargetSpec {
            key: tables::NUMERIC_TARGET,
            value: Some(zone.clone()),
        })),
        Some(Value::String(text)) => {
            let (kind, value) = match text.split_once(':') {
                Some((kind, value)) => (kind, Some(value)),
                None => (text.as_str(), None),
            };
            let kind = kind.trim().to_lowercase();
            let key = tables::canonical_target(&kind)
                .ok_or_else(|| AppError::validation(format!("Unknown target type '{kind}'")))?;
            let value = value
                .map(|value| {
                    parse_numeric_text(value).ok_or_else(|| {
                        AppError::validation(format!("Invalid target value '{value}' in '{text}'"))
                    })
                })
                .transpose()?;
            Ok(Some(TargetSpec { key, value }))
        }
        Some(other) => Err(AppError::validation(format!(
            "Target must be a string like 'hr_zone:2', got {other}"
        ))),
    }
}

fn from_object<T: DeserializeOwned>(value: Value, label: &str) -> Result<T, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError::validation(format!("{label} is invalid: {e}")))
}

fn not_an_object(label: &str, value: &Value) -> AppError {
    AppError::validation(format!("{label} must be an object or a string, got {value}"))
}

/// Normalizes parsed steps. `stepOrder` defaults to the 1-based position and
/// the resulting orders must be strictly increasing.
pub fn normalize_steps(steps: Vec<RawStep>) -> Result<Vec<NormalizedStep>, AppError> {
    let normalized = steps
        .into_iter()
        .enumerate()
        .map(|(index, step)| normalize_step(index + 1, step))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some((position, pair)) = normalized
        .windows(2)
        .enumerate()
        .find(|(_, pair)| pair[1].step_order <= pair[0].step_order)
    {
        return Err(AppError::validation(format!(
            "Step {}: stepOrder {} must be greater than {} of the previous step",
            position + 2,
            pair[1].step_order,
            pair[0].step_order
        )));
    }
    Ok(normalized)
}

fn normalize_step(position: usize, mut raw: RawStep) -> Result<NormalizedStep, AppError> {
    let label = |field: &str| format!("Step {position}: {field}");

    // A `type` next to a `stepType` object is left alone.
    let mut step_type = match raw.remove("stepType") {
        Some(value @ Value::Object(_)) => from_object::<StepType>(value, &label("stepType"))?,
        Some(Value::String(key)) => StepType::from_key(&key),
        Some(other) => return Err(not_an_object(&label("stepType"), &other)),
        None => match raw.remove("type") {
            Some(Value::String(key)) if !key.trim().is_empty() => StepType::from_key(&key),
            Some(other) => {
                return Err(AppError::validation(format!(
                    "{} must be a non-empty string, got {other}",
                    label("type")
                )));
            }
            None => {
                return Err(AppError::validation(format!(
                    "Step {position} needs a stepType object or a type"
                )));
            }
        },
    };
    step_type.complete();

    let step_order = match raw.remove("stepOrder") {
        None | Some(Value::Null) => position as u64,
        Some(value) => value.as_u64().filter(|order| *order > 0).ok_or_else(|| {
            AppError::validation(format!(
                "{} must be a positive integer, got {value}",
                label("stepOrder")
            ))
        })?,
    };

    let duration = match raw.remove("duration") {
        None | Some(Value::Null) => None,
        Some(value) => Some(numeric_field(&value, &label("duration"))?),
    };

    let mut end_condition = match raw.remove("endCondition") {
        Some(value @ Value::Object(_)) => {
            from_object::<EndCondition>(value, &label("endCondition"))?
        }
        Some(Value::String(key)) => EndCondition::from_key(&key),
        None | Some(Value::Null) if duration.is_some() => {
            EndCondition::from_key(tables::TIME_CONDITION)
        }
        None | Some(Value::Null) => EndCondition::from_key(tables::LAP_BUTTON_CONDITION),
        Some(other) => return Err(not_an_object(&label("endCondition"), &other)),
    };
    end_condition.complete();

    let end_condition_value = match raw.remove("endConditionValue") {
        None | Some(Value::Null) => duration,
        Some(value) => Some(numeric_field(&value, &label("endConditionValue"))?),
    };

    // A `target` next to a `targetType` is left alone.
    let target = match raw.get("targetType") {
        None | Some(Value::Null) => parse_target(raw.remove("target").as_ref())
            .map_err(|e| AppError::validation(format!("{}: {e}", label("target"))))?,
        Some(_) => None,
    };

    let mut target_type = match raw.remove("targetType") {
        Some(value @ Value::Object(_)) => from_object::<TargetType>(value, &label("targetType"))?,
        Some(Value::String(kind)) => {
            let kind = kind.trim().to_lowercase();
            TargetType::from_key(tables::canonical_target(&kind).unwrap_or(kind.as_str()))
        }
        None | Some(Value::Null) => {
            TargetType::from_key(target.as_ref().map_or(tables::NO_TARGET, |target| target.key))
        }
        Some(other) => return Err(not_an_object(&label("targetType"), &other)),
    };
    target_type.complete();

    let target_value = match raw.remove("targetValue") {
        None | Some(Value::Null) => target
            .as_ref()
            .and_then(|target| target.value.clone())
            .map(Value::Number),
        Some(value) => Some(value),
    };

    let zone_number = match raw.remove("zoneNumber") {
        None | Some(Value::Null) => target
            .as_ref()
            .filter(|_| tables::is_zone_target(&target_type.workout_target_type_key))
            .and_then(|target| target.value.as_ref())
            .and_then(Number::as_i64)
            .map(Value::from),
        Some(value) => Some(value),
    };

    Ok(NormalizedStep {
        step_order,
        step_type,
        end_condition,
        end_condition_value,
        target_type,
        target_value,
        zone_number,
        extra: raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(raw: &str) -> Vec<NormalizedStep> {
        normalize_steps(parse_steps(raw).unwrap()).unwrap()
    }

    #[test]
    fn test_parse_steps_simple() {
        let steps = parse_steps(
            r#"[{"stepType":{"stepTypeKey":"warmup"}},{"stepType":{"stepTypeKey":"cooldown"}}]"#,
        )
        .unwrap();
        assert_eq!(
            Value::Array(steps.into_iter().map(Value::Object).collect()),
            json!([
                {"stepType": {"stepTypeKey": "warmup"}},
                {"stepType": {"stepTypeKey": "cooldown"}}
            ])
        );
    }

    #[test]
    fn test_parse_steps_rejects_bad_input() {
        for raw in ["not-json", r#"{"stepType":{"stepTypeKey":"warmup"}}"#, "[1]", "[]"] {
            let err = parse_steps(raw).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{raw} should fail");
        }
    }

    #[test]
    fn test_normalize_shorthand_duration() {
        let steps = normalize(
            r#"[{"type":"warmup","duration":600},{"type":"interval","duration":1200}]"#,
        );

        assert_eq!(steps[0].step_order, 1);
        assert_eq!(steps[1].step_order, 2);
        assert_eq!(steps[0].step_type.step_type_key, "warmup");
        assert_eq!(steps[0].step_type.step_type_id, Some(1));
        assert_eq!(steps[0].end_condition.condition_type_key, "time");
        assert_eq!(steps[0].end_condition.condition_type_id, Some(2));
        assert_eq!(steps[0].end_condition_value, Some(Number::from(600)));
        assert_eq!(steps[0].target_type.workout_target_type_key, "no.target");
        assert_eq!(steps[0].target_type.workout_target_type_id, Some(1));
        assert!(!steps[0].extra.contains_key("type"));
        assert!(!steps[0].extra.contains_key("duration"));
    }

    #[test]
    fn test_step_order_follows_input_order() {
        let steps = normalize(
            r#"[{"type":"warmup"},{"type":"interval"},{"type":"recovery"},{"type":"cooldown"}]"#,
        );
        let orders: Vec<u64> = steps.iter().map(|step| step.step_order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);

        let steps =
            normalize(r#"[{"type":"warmup","stepOrder":1},{"type":"interval","stepOrder":5}]"#);
        let orders: Vec<u64> = steps.iter().map(|step| step.step_order).collect();
        assert_eq!(orders, vec![1, 5]);
    }

    #[test]
    fn test_normalize_target_hr_zone() {
        let steps = normalize(r#"[{"type":"interval","duration":300,"target":"hr_zone:2"}]"#);
        assert_eq!(steps[0].target_type.workout_target_type_key, "heart.rate.zone");
        assert_eq!(steps[0].target_type.workout_target_type_id, Some(4));
        assert_eq!(steps[0].target_value, Some(json!(2)));
        assert_eq!(steps[0].zone_number, Some(json!(2)));
    }

    #[test]
    fn test_target_shorthand_ignored_next_to_target_type() {
        let steps = normalize(
            r#"[{
                "type": "interval",
                "targetType": {"workoutTargetTypeKey": "pace.zone"},
                "target": "hr_zone:3"
            }]"#,
        );
        let step = &steps[0];
        assert_eq!(step.target_type.workout_target_type_key, "pace.zone");
        assert_eq!(step.target_value, None);
        assert_eq!(step.zone_number, None);
        assert_eq!(step.extra.get("target"), Some(&json!("hr_zone:3")));
    }

    #[test]
    fn test_target_type_string_keeps_shorthand_as_extra() {
        let steps = normalize(r#"[{"type":"interval","targetType":"power_zone","target":"7"}]"#);
        assert_eq!(steps[0].target_type.workout_target_type_key, "power.zone");
        assert_eq!(steps[0].zone_number, None);
        assert_eq!(steps[0].extra.get("target"), Some(&json!("7")));
    }

    #[test]
    fn test_large_integer_text_is_accepted() {
        assert_eq!(
            parse_numeric_text("10000000000000000000"),
            Some(Number::from(10_000_000_000_000_000_000_u64))
        );
        assert_eq!(parse_numeric_text("-3"), Some(Number::from(-3)));
        assert_eq!(parse_numeric_text("1e3").and_then(|n| n.as_f64()), Some(1000.0));
        assert_eq!(parse_numeric_text("NaN"), None);

        let steps =
            normalize(r#"[{"type":"interval","endConditionValue":"10000000000000000000"}]"#);
        assert_eq!(
            steps[0].end_condition_value,
            Some(Number::from(10_000_000_000_000_000_000_u64))
        );
    }

    #[test]
    fn test_parse_target_values() {
        let target = parse_target(Some(&json!("pace_zone:4.5"))).unwrap().unwrap();
        assert_eq!(target.key, "pace.zone");
        assert_eq!(target.value.and_then(|v| v.as_f64()), Some(4.5));

        let target = parse_target(Some(&json!("Cadence"))).unwrap().unwrap();
        assert_eq!(target, TargetSpec { key: "cadence.zone", value: None });

        let target = parse_target(Some(&json!(3))).unwrap().unwrap();
        assert_eq!(target.key, "heart.rate.zone");

        assert_eq!(parse_target(None).unwrap(), None);
    }

    #[test]
    fn test_malformed_targets_fail() {
        for target in [json!("hr_zone:abc"), json!("vo2max:3"), json!("hr_zone:"), json!(true)] {
            let err = parse_target(Some(&target)).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{target} should fail");
        }

        let err = normalize_steps(
            parse_steps(r#"[{"type":"interval","target":"hr_zone:abc"}]"#).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_caller_supplied_ids_are_kept() {
        let steps = normalize(
            r#"[{
                "stepOrder": 5,
                "stepType": {"stepTypeKey": "interval", "stepTypeId": 99},
                "endCondition": {"conditionTypeKey": "distance", "conditionTypeId": 42, "displayOrder": 7},
                "endConditionValue": 1000,
                "targetType": {"workoutTargetTypeKey": "pace.zone", "workoutTargetTypeId": 13},
                "targetValue": 4
            }]"#,
        );
        let step = &steps[0];
        assert_eq!(step.step_order, 5);
        assert_eq!(step.step_type.step_type_id, Some(99));
        assert_eq!(step.step_type.display_order, Some(3));
        assert_eq!(step.end_condition.condition_type_id, Some(42));
        assert_eq!(step.end_condition.display_order, Some(7));
        assert_eq!(step.target_type.workout_target_type_id, Some(13));
        assert_eq!(step.target_value, Some(json!(4)));
        assert_eq!(step.zone_number, None);
    }

    #[test]
    fn test_keys_are_lower_cased() {
        let steps = normalize(
            r#"[{"type":"WarmUp","endCondition":"Distance","endConditionValue":"400"}]"#,
        );
        assert_eq!(steps[0].step_type.step_type_key, "warmup");
        assert_eq!(steps[0].end_condition.condition_type_key, "distance");
        assert_eq!(steps[0].end_condition.condition_type_id, Some(3));
        assert_eq!(steps[0].end_condition_value, Some(Number::from(400)));
    }

    #[test]
    fn test_missing_end_condition_defaults_to_lap_button() {
        let steps = normalize(r#"[{"type":"rest"}]"#);
        assert_eq!(steps[0].end_condition.condition_type_key, "lap.button");
        assert_eq!(steps[0].end_condition_value, None);
    }

    #[test]
    fn test_invalid_steps_fail() {
        for raw in [
            r#"[{"duration":600}]"#,
            r#"[{"type":"warmup","duration":"ten minutes"}]"#,
            r#"[{"type":""}]"#,
            r#"[{"stepType":7}]"#,
            r#"[{"type":"warmup","stepOrder":0}]"#,
            r#"[{"type":"warmup","stepOrder":2},{"type":"interval"}]"#,
            r#"[{"type":"warmup","stepOrder":3},{"type":"cooldown","stepOrder":1}]"#,
        ] {
            let err = normalize_steps(parse_steps(raw).unwrap()).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{raw} should fail");
        }
    }

    #[test]
    fn test_native_form_keeps_unknown_fields() {
        let steps = normalize(
            r#"[{"type":"ExecutableStepDTO","stepType":{"stepTypeKey":"cooldown"},"description":"easy"}]"#,
        );
        let value = serde_json::to_value(&steps[0]).unwrap();
        assert_eq!(value["type"], json!("ExecutableStepDTO"));
        assert_eq!(value["description"], json!("easy"));
        assert_eq!(value["stepType"]["stepTypeKey"], json!("cooldown"));
    }

    #[test]
    fn test_serialized_shape() {
        let steps = normalize(r#"[{"type":"warmup","duration":600}]"#);
        assert_eq!(
            serde_json::to_value(&steps[0]).unwrap(),
            json!({
                "stepOrder": 1,
                "stepType": {"stepTypeKey": "warmup", "stepTypeId": 1, "displayOrder": 1},
                "endCondition": {"conditionTypeKey": "time", "conditionTypeId": 2, "displayOrder": 2},
                "endConditionValue": 600,
                "targetType": {"workoutTargetTypeKey": "no.target", "workoutTargetTypeId": 1, "displayOrder": 1}
            })
        );
    }
}
