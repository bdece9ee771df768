use crate::api::clients::{CONNECT_API_HOST, join_url};
use crate::api::traits::WriteTransport;
use crate::api::types::HttpMethod;
use crate::error::AppError;
use serde_json::Value;
use tracing::debug;

/// Sends a workout write through whichever transport the client offers.
///
/// The path call is preferred. When it is missing, or reports that it cannot
/// carry this request, the raw session is used against [`CONNECT_API_HOST`].
/// Every other error from the path call is returned as is.
pub async fn dispatch_write<T: WriteTransport + ?Sized>(
    transport: &T,
    method: HttpMethod,
    path: &str,
    body: Option<&Value>,
) -> Result<Option<Value>, AppError> {
    if transport.supports_path_call() {
        match transport.path_call(method, path, body).await {
            Err(AppError::UnsupportedOperation(reason)) if transport.supports_raw_session() => {
                debug!(%method, path, %reason, "path call rejected request, using raw session");
            }
            result => return result,
        }
    }

    if transport.supports_raw_session() {
        let url = join_url(CONNECT_API_HOST, path);
        debug!(%method, url, "sending write through raw session");
        return transport.raw_request(method, &url, body).await;
    }

    Err(AppError::UnsupportedOperation(format!(
        "client offers no way to send {method} {path}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::clients::tests::FakeApiClient;
    use serde_json::json;

    const WORKOUT_PATH: &str = "/workout-service/workout";

    #[tokio::test]
    async fn test_prefers_path_call() {
        let client = FakeApiClient::with_transport(true, true);
        let body = json!({"workoutName": "Tempo"});
        let result = dispatch_write(&client, HttpMethod::Post, WORKOUT_PATH, Some(&body))
            .await
            .unwrap();

        assert_eq!(result, Some(json!({"workoutId": 1001})));
        let calls = client.recorded_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].transport, "path_call");
        assert_eq!(calls[0].body, Some(body));
    }

    #[tokio::test]
    async fn test_raw_session_when_no_path_call() {
        let client = FakeApiClient::with_transport(false, true);
        let result = dispatch_write(&client, HttpMethod::Delete, "/workout-service/workout/9", None)
            .await
            .unwrap();

        assert_eq!(result, None);
        let calls = client.recorded_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].transport, "raw_request");
        assert_eq!(calls[0].method, HttpMethod::Delete);
        assert_eq!(
            calls[0].target,
            "https://connectapi.garmin.com/workout-service/workout/9"
        );
    }

    #[tokio::test]
    async fn test_falls_back_when_path_call_rejects_shape() {
        let mut client = FakeApiClient::with_transport(true, true);
        client.path_call_rejects_shape = true;
        let body = json!({"workoutId": 9});
        dispatch_write(&client, HttpMethod::Put, "/workout-service/workout/9", Some(&body))
            .await
            .unwrap();

        let calls = client.recorded_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].transport, "raw_request");
        assert_eq!(calls[0].body, Some(body));
    }

    #[tokio::test]
    async fn test_shape_error_without_raw_session_surfaces() {
        let mut client = FakeApiClient::with_transport(true, false);
        client.path_call_rejects_shape = true;
        let err = dispatch_write(&client, HttpMethod::Post, WORKOUT_PATH, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedOperation(_)));
    }

    #[tokio::test]
    async fn test_no_transport() {
        let client = FakeApiClient::with_transport(false, false);
        let err = dispatch_write(&client, HttpMethod::Post, WORKOUT_PATH, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedOperation(_)));
        assert!(client.recorded_calls().is_empty());
    }
}
