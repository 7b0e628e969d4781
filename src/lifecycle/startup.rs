//! Startup orchestration.
//!
//! Orchestrators sometimes start a node before its sidecar proxy is ready;
//! `init_sleep_secs` holds the listener back until then.

use std::time::Duration;

use crate::config::StartupConfig;

/// Sleep for the configured startup delay, if any.
pub async fn init_delay(config: &StartupConfig) {
    if config.init_sleep_secs == 0 {
        return;
    }
    tracing::info!(
        seconds = config.init_sleep_secs,
        "Sleeping before starting server"
    );
    tokio::time::sleep(Duration::from_secs(config.init_sleep_secs)).await;
}
