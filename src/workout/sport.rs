use crate::api::traits::ConnectApi;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Wrapper keys the activity-type listing has been seen under.
const LISTING_KEYS: &[&str] = &["activityTypes", "sportTypes", "types", "items", "data"];
const ENTRY_KEY_FIELDS: &[&str] = &["sportTypeKey", "typeKey", "key"];
const ENTRY_ID_FIELDS: &[&str] = &["sportTypeId", "typeId", "id"];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SportType {
    pub sport_type_key: String,
    pub sport_type_id: i64,
}

/// Resolves a sport from a key, an ID, or both.
///
/// With both given no lookup happens. With one, the activity-type listing is
/// fetched once and searched case-insensitively.
pub async fn resolve_sport<T: ConnectApi + ?Sized>(
    client: &T,
    key: Option<&str>,
    id: Option<i64>,
) -> Result<SportType, AppError> {
    let key = key.map(str::trim).filter(|key| !key.is_empty());

    match (key, id) {
        (Some(key), Some(id)) => Ok(SportType {
            sport_type_key: key.to_string(),
            sport_type_id: id,
        }),
        (None, None) => Err(AppError::validation(
            "A sport is required: pass --sport-key and/or --sport-id",
        )),
        (key, id) => {
            let listing = client.list_activity_types().await?;
            debug!(?key, ?id, "resolving sport from activity types");
            find_sport(&listing, key, id).ok_or_else(|| {
                let wanted = key.map_or_else(|| format!("id {}", id.unwrap_or_default()), |key| {
                    format!("key '{key}'")
                });
                AppError::validation(format!("Unknown sport {wanted}"))
            })
        }
    }
}

/// Searches the listing for an entry matching `key` (case-insensitive) or `id`.
pub fn find_sport(listing: &Value, key: Option<&str>, id: Option<i64>) -> Option<SportType> {
    candidate_entries(listing).iter().find_map(|entry| {
        let entry_key = entry_key(entry)?;
        let entry_id = entry_id(entry)?;
        let matches = match (key, id) {
            (Some(key), _) => entry_key.eq_ignore_ascii_case(key),
            (None, Some(id)) => entry_id == id,
            (None, None) => false,
        };
        matches.then(|| SportType {
            sport_type_key: entry_key.to_string(),
            sport_type_id: entry_id,
        })
    })
}

/// Top-level array, a known wrapper key, or the first array-valued field.
fn candidate_entries(listing: &Value) -> &[Value] {
    match listing {
        Value::Array(entries) => entries.as_slice(),
        Value::Object(map) => LISTING_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .or_else(|| map.values().find_map(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    }
}

fn entry_key(entry: &Value) -> Option<&str> {
    ENTRY_KEY_FIELDS
        .iter()
        .find_map(|field| entry.get(*field).and_then(Value::as_str))
}

fn entry_id(entry: &Value) -> Option<i64> {
    ENTRY_ID_FIELDS.iter().find_map(|field| match entry.get(*field)? {
        Value::Number(id) => id.as_i64(),
        Value::String(id) => id.trim().parse().ok(),
        _ => None,
    })
}
