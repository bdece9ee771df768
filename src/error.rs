use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("{operation} failed: {source}")]
    Request {
        operation: String,
        #[source]
        source: RequestFailure,
    },

    #[error("Authentication failed. Token may be missing or expired. ({0})")]
    Authentication(String),

    #[error("Rate limit exceeded. Wait a moment and try again. ({0})")]
    RateLimit(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Underlying cause of a failed request.
#[derive(Error, Debug)]
pub enum RequestFailure {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("status {status}, response: {body}")]
    Status { status: StatusCode, body: String },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn request(operation: impl Into<String>, source: impl Into<RequestFailure>) -> Self {
        Self::Request {
            operation: operation.into(),
            source: source.into(),
        }
    }
}
