// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tutorlink serve` command implementation.
//!
//! Opens SQLite storage, builds the session manager and signaling relay, and
//! runs the HTTP gateway until SIGINT or SIGTERM.

use std::sync::Arc;

use tracing::{error, info, warn};

use tutorlink_config::model::TutorlinkConfig;
use tutorlink_core::clock::{Clock, SystemClock};
use tutorlink_core::{PluginAdapter, SessionStore, TutorlinkError};
use tutorlink_gateway::Gateway;
use tutorlink_lifecycle::SessionManager;
use tutorlink_relay::SignalRelay;
use tutorlink_storage::SqliteStorage;

use crate::shutdown;

/// Runs the `tutorlink serve` command.
pub async fn run_serve(config: TutorlinkConfig) -> Result<(), TutorlinkError> {
    init_tracing(&config.service.log_level);

    info!(name = %config.service.name, "starting tutorlink serve");

    let storage = open_storage(&config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let manager = Arc::new(SessionManager::new(
        storage.clone(),
        storage.clone(),
        clock.clone(),
        config.lifecycle.clone(),
    ));
    let relay = Arc::new(SignalRelay::in_memory(clock, &config.relay));
    info!(
        in_progress_timeout_minutes = config.lifecycle.in_progress_timeout_minutes,
        scheduling_timeout_minutes = config.lifecycle.scheduling_timeout_minutes,
        max_signals_per_session = config.relay.max_signals_per_session,
        "session manager and relay ready"
    );

    let cancel = shutdown::install_signal_handler();

    let gateway = Gateway::new(
        config.gateway.clone(),
        manager,
        relay.clone(),
        cancel.child_token(),
    );
    gateway.start().await?;

    let outcome = tokio::select! {
        _ = cancel.cancelled() => Ok(()),
        _ = gateway.exited() => {
            error!("gateway stopped without a shutdown request");
            cancel.cancel();
            Err(TutorlinkError::Internal("gateway stopped unexpectedly".into()))
        }
    };

    if let Err(e) = gateway.shutdown().await {
        warn!(error = %e, "gateway shutdown failed");
    }
    if let Err(e) = relay.backend().shutdown().await {
        warn!(error = %e, "signal backend shutdown failed");
    }
    storage.close().await?;

    info!("tutorlink serve shutdown complete");
    outcome
}

/// Opens and migrates the configured SQLite database.
pub async fn open_storage(config: &TutorlinkConfig) -> Result<Arc<SqliteStorage>, TutorlinkError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(Arc::new(storage))
}

/// Initialize the tracing subscriber with an env filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tutorlink={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutorlink_config::model::StorageConfig;

    #[tokio::test]
    async fn open_storage_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("serve.db");
        let config = TutorlinkConfig {
            storage: StorageConfig {
                database_path: path.to_string_lossy().into_owned(),
                wal_mode: true,
            },
            ..TutorlinkConfig::default()
        };

        let storage = open_storage(&config).await.unwrap();
        assert!(path.exists());
        storage.close().await.unwrap();
    }
}
