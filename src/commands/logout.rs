use crate::config::TokenStore;
use crate::output::{print_success, print_warning};
use anyhow::{Context, Result};

/// Handles the `logout` command.
pub async fn logout<S: TokenStore + ?Sized>(store: &S) -> Result<()> {
    let removed = store
        .clear()
        .await
        .with_context(|| format!("Failed to remove tokens in {}", store.location().display()))?;

    if removed {
        print_success("Logged out.");
    } else {
        print_warning(&format!(
            "No stored session found in {}.",
            store.location().display()
        ));
    }
    Ok(())
}
