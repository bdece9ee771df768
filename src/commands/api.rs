use crate::api::traits::ConnectApi;
use crate::api::types::HttpMethod;
use crate::cli::ApiArgs;
use crate::error::AppError;
use crate::output::render;
use anyhow::{Context, Result};
use serde_json::{Map, Value};

/// Parses an optional JSON argument. `--params` must be an object.
fn parse_json_arg(
    value: Option<&str>,
    label: &str,
    require_object: bool,
) -> Result<Option<Value>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let parsed: Value = serde_json::from_str(value)
        .map_err(|e| AppError::validation(format!("Invalid {label} JSON: {e}")))?;
    if require_object && !parsed.is_object() {
        return Err(AppError::validation(format!("{label} must be a JSON object.")));
    }
    Ok(Some(parsed))
}

pub async fn handle_api_command<T: ConnectApi + ?Sized>(args: ApiArgs, client: &T) -> Result<()> {
    let method: HttpMethod = args.method.parse()?;
    let params: Option<Map<String, Value>> =
        match parse_json_arg(args.params.as_deref(), "params", true)? {
            Some(Value::Object(params)) => Some(params),
            _ => None,
        };
    let body = parse_json_arg(args.body.as_deref(), "body", false)?;

    let data = client
        .connectapi(method, &args.path, params.as_ref(), body.as_ref())
        .await
        .with_context(|| format!("{method} {} failed", args.path))?
        .unwrap_or(Value::Null);

    let title = format!("{method} {}", args.path);
    render(&data, args.format, Some(&title), None, args.output.as_deref()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::clients::tests::FakeApiClient;
    use crate::output::OutputFormat;
    use serde_json::json;
    use tempfile::tempdir;

    fn args(path: &str) -> ApiArgs {
        ApiArgs {
            path: path.to_string(),
            method: "GET".to_string(),
            params: None,
            body: None,
            format: OutputFormat::Json,
            output: None,
        }
    }

    #[test]
    fn test_parse_json_arg() {
        assert_eq!(parse_json_arg(None, "params", true).unwrap(), None);
        assert_eq!(
            parse_json_arg(Some(r#"{"a": 1}"#), "params", true).unwrap(),
            Some(json!({"a": 1}))
        );
        assert_eq!(
            parse_json_arg(Some("[1]"), "body", false).unwrap(),
            Some(json!([1]))
        );
        assert!(matches!(
            parse_json_arg(Some("[1]"), "params", true),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_json_arg(Some("{oops"), "body", false),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_raw_call_passes_method_and_body() {
        let temp_dir = tempdir().unwrap();
        let out = temp_dir.path().join("out.json");
        let client = FakeApiClient::default().with_response("/custom", json!({"ok": true}));
        let command = ApiArgs {
            method: "patch".to_string(),
            body: Some(r#"{"name": "x"}"#.to_string()),
            output: Some(out.clone()),
            ..args("/custom")
        };
        handle_api_command(command, &client).await.unwrap();

        let calls = client.recorded_calls();
        assert_eq!(calls[0].method, HttpMethod::Patch);
        assert_eq!(calls[0].body, Some(json!({"name": "x"})));
        assert!(std::fs::read_to_string(&out).unwrap().contains("\"ok\": true"));
    }

    #[tokio::test]
    async fn test_unsupported_method_is_rejected() {
        let client = FakeApiClient::default();
        let command = ApiArgs {
            method: "TRACE".to_string(),
            ..args("/custom")
        };
        let err = handle_api_command(command, &client).await.unwrap_err();
        assert!(err.to_string().contains("Unsupported method"));
        assert!(client.recorded_calls().is_empty());
    }
}
