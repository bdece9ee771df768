use crate::api::traits::ConnectApi;
use crate::api::types::HttpMethod;
use crate::cli::{DayArgs, OutputArgs, SpanArgs};
use crate::dates::{DateRange, resolve_date, resolve_span};
use crate::output::render;
use anyhow::{Context, Result, anyhow};
use serde_json::{Map, Value};

pub const SOCIAL_PROFILE_PATH: &str = "/userprofile-service/socialProfile";

/// GETs `path`. An empty body comes back as `Value::Null`.
pub async fn get_json<T: ConnectApi + ?Sized>(
    client: &T,
    path: &str,
    params: Option<&Map<String, Value>>,
) -> Result<Value> {
    let data = client
        .connectapi(HttpMethod::Get, path, params, None)
        .await
        .with_context(|| format!("Failed to fetch {path}"))?;
    Ok(data.unwrap_or(Value::Null))
}

pub fn query<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

pub async fn show(data: &Value, output: &OutputArgs, title: &str) -> Result<()> {
    render(data, output.format, Some(title), None, output.output.as_deref()).await
}

pub async fn show_columns(
    data: &Value,
    output: &OutputArgs,
    title: &str,
    columns: &[&str],
) -> Result<()> {
    render(
        data,
        output.format,
        Some(title),
        Some(columns),
        output.output.as_deref(),
    )
    .await
}

/// The day a single-date command asks for. Range shortcuts yield their first day.
pub fn single_day(args: &DayArgs) -> Result<String> {
    Ok(resolve_date(args.date(), None, None)?.start)
}

pub fn date_span(args: &SpanArgs) -> Result<DateRange> {
    Ok(resolve_span(
        args.day.date(),
        args.start.as_deref(),
        args.end.as_deref(),
    )?)
}

pub async fn social_profile<T: ConnectApi + ?Sized>(client: &T) -> Result<Value> {
    get_json(client, SOCIAL_PROFILE_PATH, None)
        .await
        .context("Failed to fetch user profile")
}

/// Display name of the logged-in user; several wellness paths are keyed by it.
pub async fn display_name<T: ConnectApi + ?Sized>(client: &T) -> Result<String> {
    social_profile(client)
        .await?
        .get("displayName")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("User profile has no displayName"))
}

pub async fn profile_id<T: ConnectApi + ?Sized>(client: &T) -> Result<u64> {
    social_profile(client)
        .await?
        .get("profileId")
        .and_then(Value::as_u64)
        .ok_or_else(|| anyhow!("User profile has no profileId"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::clients::tests::FakeApiClient;
    use serde_json::json;

    #[tokio::test]
    async fn test_display_name_from_social_profile() {
        let client = FakeApiClient::default().with_response(
            SOCIAL_PROFILE_PATH,
            json!({"displayName": "runner42", "profileId": 8123}),
        );
        assert_eq!(display_name(&client).await.unwrap(), "runner42");
        assert_eq!(profile_id(&client).await.unwrap(), 8123);
    }

    #[tokio::test]
    async fn test_missing_display_name_is_an_error() {
        let client = FakeApiClient::default().with_response(SOCIAL_PROFILE_PATH, json!({}));
        let err = display_name(&client).await.unwrap_err();
        assert!(err.to_string().contains("displayName"));
    }

    #[test]
    fn test_single_day_takes_range_start() {
        let args = DayArgs {
            when: Some("2024-05-02".to_string()),
            date: None,
        };
        assert_eq!(single_day(&args).unwrap(), "2024-05-02");

        let args = DayArgs {
            when: None,
            date: Some("2024-05-03".to_string()),
        };
        assert_eq!(single_day(&args).unwrap(), "2024-05-03");
    }

    #[test]
    fn test_query_keeps_pairs() {
        let params = query([("date", json!("2024-05-02")), ("limit", json!(5))]);
        assert_eq!(Value::Object(params), json!({"date": "2024-05-02", "limit": 5}));
    }
}
