use crate::api::types::HttpMethod;
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::{Map, Value};

pub const ACTIVITY_TYPES_PATH: &str = "/activity-service/activity/activityTypes";

/// Read access to the Connect API.
#[async_trait]
pub trait ConnectApi: Send + Sync {
    /// Issues `method` against `path` (relative to the API base URL).
    /// Returns `None` when the response carries no body.
    async fn connectapi(
        &self,
        method: HttpMethod,
        path: &str,
        params: Option<&Map<String, Value>>,
        body: Option<&Value>,
    ) -> Result<Option<Value>, AppError>;

    /// Fetches raw bytes, e.g. FIT files.
    async fn download(&self, path: &str) -> Result<Vec<u8>, AppError>;

    /// Posts `contents` as the multipart `file` field named `file_name`.
    async fn upload(
        &self,
        path: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<Option<Value>, AppError>;

    async fn list_activity_types(&self) -> Result<Value, AppError> {
        let listing = self
            .connectapi(HttpMethod::Get, ACTIVITY_TYPES_PATH, None, None)
            .await?;
        Ok(listing.unwrap_or(Value::Null))
    }
}

/// Write capabilities a client adapter exposes.
///
/// The write dispatcher checks `supports_path_call` first and falls back to the
/// raw session when the path call is absent or reports an
/// [`AppError::UnsupportedOperation`].
#[async_trait]
pub trait WriteTransport: Send + Sync {
    fn supports_path_call(&self) -> bool;

    fn supports_raw_session(&self) -> bool;

    async fn path_call(
        &self,
        method: HttpMethod,
        path: &str,
        _body: Option<&Value>,
    ) -> Result<Option<Value>, AppError> {
        Err(AppError::UnsupportedOperation(format!(
            "path call not available for {method} {path}"
        )))
    }

    /// `url` is always absolute.
    async fn raw_request(
        &self,
        method: HttpMethod,
        url: &str,
        _body: Option<&Value>,
    ) -> Result<Option<Value>, AppError> {
        Err(AppError::UnsupportedOperation(format!(
            "raw session not available for {method} {url}"
        )))
    }
}
