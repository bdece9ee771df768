use crate::error::AppError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Environment variable overriding the token storage directory.
pub const TOKEN_DIR_ENV: &str = "GARMINTOKENS";
/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "GARMIN_API_URL";
pub const DEFAULT_API_URL: &str = "https://connectapi.garmin.com";

const OAUTH2_TOKEN_FILE: &str = "oauth2_token.json";

/// Runtime settings resolved from flags, environment and defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the session token files.
    pub token_dir: PathBuf,
    /// Base URL for all Connect API calls.
    pub api_url: String,
}

impl AppConfig {
    /// Resolves the configuration. Flags win over environment variables.
    pub fn resolve(tokenstore: Option<&str>, api_url: Option<&str>) -> Result<Self> {
        let token_dir = resolve_token_dir(tokenstore, std::env::var(TOKEN_DIR_ENV).ok())?;
        let api_url = api_url
            .map(str::to_string)
            .or_else(|| std::env::var(API_URL_ENV).ok())
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Ok(Self { token_dir, api_url })
    }
}

/// OAuth2 session token as stored on disk by the login flow.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OAuth2Token {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds).
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub refresh_token_expires_at: Option<i64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl OAuth2Token {
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
    }

    pub fn expired(&self) -> bool {
        self.expires_at
            .is_some_and(|ts| ts < Utc::now().timestamp())
    }

    /// `Authorization` header value, e.g. `Bearer abc`.
    pub fn auth_header(&self) -> String {
        let mut chars = self.token_type.chars();
        let token_type = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
            None => default_token_type(),
        };
        format!("{token_type} {}", self.access_token)
    }
}

/// Trait for token storage operations to enable dependency injection
#[async_trait]
pub trait TokenStore: Send + Sync {
    fn location(&self) -> &Path;
    async fn load_token(&self) -> Result<OAuth2Token, AppError>;
    /// Removes stored tokens. Returns `false` when nothing was stored.
    async fn clear(&self) -> Result<bool, AppError>;
}

/// Token files in a directory on disk.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    fn location(&self) -> &Path {
        &self.dir
    }

    async fn load_token(&self) -> Result<OAuth2Token, AppError> {
        if !self.dir.exists() {
            return Err(AppError::Authentication(
                "Not logged in. No token directory found".to_string(),
            ));
        }

        let token_path = self.dir.join(OAUTH2_TOKEN_FILE);
        let content = match fs::read_to_string(&token_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::Authentication(format!(
                    "Token files not found in {}",
                    self.dir.display()
                )));
            }
            Err(e) => return Err(AppError::Io(e)),
        };

        serde_json::from_str(&content).map_err(|e| {
            AppError::Authentication(format!("Failed to load session from {token_path:?}: {e}"))
        })
    }

    async fn clear(&self) -> Result<bool, AppError> {
        if !self.dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&self.dir).await?;
        Ok(true)
    }
}

/// Returns the default token directory, `~/.garmin-cli/tokens`.
fn default_token_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().context("Failed to find home directory")?;
    Ok(home_dir.join(".garmin-cli").join("tokens"))
}

fn expand_home(path: &str) -> Result<PathBuf> {
    if path == "~" {
        return dirs::home_dir().context("Failed to find home directory");
    }
    if let Some(rest) = path.strip_prefix("~/") {
        let home_dir = dirs::home_dir().context("Failed to find home directory")?;
        return Ok(home_dir.join(rest));
    }
    Ok(PathBuf::from(path))
}

/// Token directory precedence: explicit flag, then the environment value, then the default.
fn resolve_token_dir(explicit: Option<&str>, env_value: Option<String>) -> Result<PathBuf> {
    if let Some(dir) = explicit.filter(|dir| !dir.trim().is_empty()) {
        return expand_home(dir);
    }
    if let Some(dir) = env_value.filter(|dir| !dir.trim().is_empty()) {
        return expand_home(&dir);
    }
    default_token_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_token_dir_precedence() {
        let dir = resolve_token_dir(Some("/tmp/flag"), Some("/tmp/env".to_string())).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/flag"));

        let dir = resolve_token_dir(None, Some("/tmp/env".to_string())).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/env"));

        let dir = resolve_token_dir(None, None).unwrap();
        assert!(dir.ends_with(".garmin-cli/tokens"));
    }

    #[test]
    fn test_token_dir_expands_home() {
        let dir = resolve_token_dir(Some("~/tokens"), None).unwrap();
        assert_eq!(dir, dirs::home_dir().unwrap().join("tokens"));
    }

    #[test]
    fn test_auth_header_title_cases_token_type() {
        let token: OAuth2Token =
            serde_json::from_str(r#"{"access_token": "abc", "token_type": "bearer"}"#).unwrap();
        assert_eq!(token.auth_header(), "Bearer abc");
        assert!(!token.expired());
    }

    #[test]
    fn test_expired_token() {
        let token: OAuth2Token =
            serde_json::from_str(r#"{"access_token": "abc", "expires_at": 1000}"#).unwrap();
        assert!(token.expired());
        assert_eq!(token.expires_at_utc().unwrap().timestamp(), 1000);
    }

    #[tokio::test]
    async fn test_load_token_from_store() {
        let temp_dir = tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join(OAUTH2_TOKEN_FILE),
            r#"{"access_token": "abc", "token_type": "Bearer", "refresh_token": "def", "expires_at": 4102444800}"#,
        )
        .unwrap();

        let store = FileTokenStore::new(temp_dir.path());
        let token = store.load_token().await.unwrap();
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.refresh_token.as_deref(), Some("def"));
        assert!(!token.expired());
    }

    #[tokio::test]
    async fn test_load_token_missing() {
        let temp_dir = tempdir().unwrap();

        let store = FileTokenStore::new(temp_dir.path().join("missing"));
        let err = store.load_token().await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));

        let store = FileTokenStore::new(temp_dir.path());
        let err = store.load_token().await.unwrap_err();
        assert!(err.to_string().contains("Token files not found"));
    }

    #[tokio::test]
    async fn test_load_token_malformed() {
        let temp_dir = tempdir().unwrap();
        std::fs::write(temp_dir.path().join(OAUTH2_TOKEN_FILE), "not-json").unwrap();

        let store = FileTokenStore::new(temp_dir.path());
        let err = store.load_token().await.unwrap_err();
        assert!(err.to_string().contains("Failed to load session"));
    }

    #[tokio::test]
    async fn test_clear_removes_directory() {
        let temp_dir = tempdir().unwrap();
        let token_dir = temp_dir.path().join("tokens");
        std::fs::create_dir_all(&token_dir).unwrap();
        std::fs::write(token_dir.join(OAUTH2_TOKEN_FILE), "{}").unwrap();

        let store = FileTokenStore::new(&token_dir);
        assert!(store.clear().await.unwrap());
        assert!(!token_dir.exists());
        assert!(!store.clear().await.unwrap());
    }
}
