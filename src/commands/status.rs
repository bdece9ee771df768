use crate::api::traits::ConnectApi;
use crate::cli::StatusArgs;
use crate::commands::common::social_profile;
use crate::config::TokenStore;
use crate::output::render;
use anyhow::Result;
use serde_json::{Map, Value, json};

/// Login status rows built from the stored token.
pub async fn session_summary<S: TokenStore + ?Sized>(store: &S) -> Result<Value> {
    let token = store.load_token().await?;

    let mut info = Map::new();
    let state = if token.expired() {
        "Token expired"
    } else {
        "Logged in"
    };
    info.insert("Status".into(), json!(state));
    info.insert(
        "Expires".into(),
        token
            .expires_at_utc()
            .map_or(Value::Null, |at| json!(at.to_rfc3339())),
    );
    info.insert("Token Store".into(), json!(store.location().display().to_string()));
    Ok(Value::Object(info))
}

pub async fn handle_status_command<S, T>(
    args: StatusArgs,
    store: &S,
    client: Option<&T>,
) -> Result<()>
where
    S: TokenStore + ?Sized,
    T: ConnectApi + ?Sized,
{
    let output = args.output.output.as_deref();

    match client {
        Some(client) if args.profile => {
            let profile = social_profile(client).await?;
            render(&profile, args.output.format, Some("User Profile"), None, output).await
        }
        _ => {
            let summary = session_summary(store).await?;
            render(&summary, args.output.format, Some("Login Status"), None, output).await
        }
    }
}
