use std::sync::Arc;

use anyhow::Context;
use latch_client::{ApiClient, AuthSession, FileStore, config::ClientConfig};

pub mod session;

/// Build the session for this invocation from the config's API URL and the
/// session file under its data directory.
pub fn open_session(config: &ClientConfig) -> anyhow::Result<Arc<AuthSession>> {
    let api = ApiClient::new(config.api_url.clone()).context("Failed to create API client")?;
    let store = FileStore::new(config.session_store_path());

    let session = AuthSession::new(Arc::new(api), Arc::new(store)).with_context(|| {
        format!(
            "Failed to read session from {}",
            config.session_store_path().display()
        )
    })?;

    Ok(Arc::new(session))
}
