use crate::api::traits::{ConnectApi, WriteTransport};
use crate::api::types::HttpMethod;
use crate::config::OAuth2Token;
use crate::error::{AppError, RequestFailure};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};
use tracing::debug;

/// Host used when a write has to go through the raw session with a relative path.
pub const CONNECT_API_HOST: &str = "https://connectapi.garmin.com";

const HTTP_USER_AGENT: &str = "GCM-iOS-5.7.2.1";

/// Joins a relative API path onto `base`. Absolute URLs are returned unchanged.
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Whether a request reads data or writes it. Decides how failures and
/// non-JSON bodies are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Read,
    Write,
}

/// A client for the live Garmin Connect API, authenticated with a stored OAuth2 token.
#[derive(Debug)]
pub struct LiveApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl LiveApiClient {
    /// Maps a failed read status to the matching error kind.
    fn status_error(status: StatusCode, body: String, operation: &str) -> AppError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Authentication(format!(
                "{operation} returned {status}. Refresh the stored tokens and try again"
            )),
            StatusCode::TOO_MANY_REQUESTS => {
                AppError::RateLimit(format!("{operation} returned {status}"))
            }
            _ => Self::write_status_error(status, body, operation),
        }
    }

    /// Writes report every failed status as a request error carrying the body.
    fn write_status_error(status: StatusCode, body: String, operation: &str) -> AppError {
        AppError::request(operation, RequestFailure::Status { status, body })
    }

    async fn handle_response(
        response: reqwest::Response,
        operation: &str,
        kind: RequestKind,
    ) -> Result<Option<Value>, AppError> {
        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| AppError::request(operation, e))?;

        if !status.is_success() {
            debug!(%status, response = %response_text, "{operation} failed");
            return Err(match kind {
                RequestKind::Read => Self::status_error(status, response_text, operation),
                RequestKind::Write => Self::write_status_error(status, response_text, operation),
            });
        }

        if response_text.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<Value>(&response_text) {
            Ok(result) => Ok(Some(result)),
            // A successful write may answer with plain text.
            Err(_) if kind == RequestKind::Write => Ok(Some(Value::String(response_text))),
            Err(e) => {
                debug!(%status, response = %response_text, "failed to parse {operation} response");
                Err(AppError::JsonParse(e))
            }
        }
    }

    /// Creates a new API client for `base_url` with the given token.
    pub fn new(token: &OAuth2Token, base_url: &str) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&token.auth_header())
                .map_err(|_| AppError::Config("Invalid authentication token".to_string()))?,
        );
        headers.insert(header::USER_AGENT, HeaderValue::from_static(HTTP_USER_AGENT));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::request("Build HTTP client", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        params: Option<&Map<String, Value>>,
        body: Option<&Value>,
        kind: RequestKind,
    ) -> Result<Option<Value>, AppError> {
        let operation = format!("{method} {url}");
        let mut request = self.client.request(method.into(), url);
        if let Some(params) = params {
            request = request.query(&query_pairs(params));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, url, "sending request");
        let response = request
            .send()
            .await
            .map_err(|e| AppError::request(&operation, e))?;
        Self::handle_response(response, &operation, kind).await
    }
}

#[async_trait]
impl ConnectApi for LiveApiClient {
    async fn connectapi(
        &self,
        method: HttpMethod,
        path: &str,
        params: Option<&Map<String, Value>>,
        body: Option<&Value>,
    ) -> Result<Option<Value>, AppError> {
        let url = join_url(&self.base_url, path);
        self.send(method, &url, params, body, RequestKind::Read)
            .await
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>, AppError> {
        let url = join_url(&self.base_url, path);
        let operation = format!("Download {url}");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::request(&operation, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, error_body, &operation));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::request(&operation, e))?;
        Ok(bytes.to_vec())
    }

    async fn upload(
        &self,
        path: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<Option<Value>, AppError> {
        let url = join_url(&self.base_url, path);
        let operation = format!("Upload {file_name} to {url}");
        let part = Part::bytes(contents).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        debug!(url, file_name, "uploading file");
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::request(&operation, e))?;
        Self::handle_response(response, &operation, RequestKind::Write).await
    }
}

#[async_trait]
impl WriteTransport for LiveApiClient {
    fn supports_path_call(&self) -> bool {
        true
    }

    fn supports_raw_session(&self) -> bool {
        true
    }

    async fn path_call(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>, AppError> {
        let url = join_url(&self.base_url, path);
        self.send(method, &url, None, body, RequestKind::Write)
            .await
    }

    async fn raw_request(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>, AppError> {
        self.send(method, url, None, body, RequestKind::Write)
            .await
    }
}
