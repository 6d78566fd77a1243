// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Tutorlink.
//!
//! Exposes the session lifecycle and the signaling relay over a small REST
//! API. Callers are authenticated upstream; the gateway checks the shared
//! bearer token and reads the forwarded identity headers.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod server;
pub mod summary;

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use tutorlink_config::model::GatewayConfig;
use tutorlink_core::types::{AdapterType, HealthStatus};
use tutorlink_core::{PluginAdapter, TutorlinkError};
use tutorlink_lifecycle::SessionManager;
use tutorlink_relay::SignalRelay;

use crate::auth::AuthConfig;
use crate::server::{GatewayState, HealthState, ServerConfig};

pub use server::build_router;

/// The HTTP gateway as a managed adapter.
///
/// [`Gateway::start`] binds the port, then runs the axum server as a
/// background task that stops when the shared cancellation token fires or
/// [`PluginAdapter::shutdown`] is called.
pub struct Gateway {
    config: GatewayConfig,
    state: GatewayState,
    shutdown: CancellationToken,
    /// Cancelled once the server task returns, for whatever reason.
    exited: CancellationToken,
    local_addr: std::sync::OnceLock<SocketAddr>,
    server_handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl Gateway {
    /// Create a new gateway. `shutdown` is usually a child of the process token.
    pub fn new(
        config: GatewayConfig,
        manager: Arc<SessionManager>,
        relay: Arc<SignalRelay>,
        shutdown: CancellationToken,
    ) -> Self {
        let state = GatewayState {
            manager,
            relay,
            auth: AuthConfig {
                bearer_token: config.bearer_token.clone(),
            },
            health: HealthState {
                start_time: std::time::Instant::now(),
            },
        };
        Self {
            config,
            state,
            shutdown,
            exited: CancellationToken::new(),
            local_addr: std::sync::OnceLock::new(),
            server_handle: Mutex::new(None),
        }
    }

    /// Binds the configured address and spawns the server task.
    ///
    /// Bind errors are returned here rather than from the task.
    pub async fn start(&self) -> Result<(), TutorlinkError> {
        let mut server_handle = self.server_handle.lock().await;
        if server_handle.is_some() {
            return Err(TutorlinkError::Internal("gateway already started".into()));
        }
        if self.config.bearer_token.is_none() {
            tracing::warn!("gateway.bearer_token is not set; every /v1 request will be rejected");
        }

        let listener = server::bind(&ServerConfig {
            host: self.config.host.clone(),
            port: self.config.port,
        })
        .await?;
        if let Ok(addr) = listener.local_addr() {
            let _ = self.local_addr.set(addr);
        }

        let state = self.state.clone();
        let token = self.shutdown.clone();
        let exited = self.exited.clone();
        *server_handle = Some(tokio::spawn(async move {
            let _exited = exited.drop_guard();
            if let Err(e) = server::serve(listener, state, token).await {
                tracing::error!(error = %e, "gateway server failed");
            }
        }));
        Ok(())
    }

    /// The bound address once [`Gateway::start`] succeeded.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    /// Resolves when the server task has returned, including after a
    /// requested shutdown.
    pub async fn exited(&self) {
        self.exited.cancelled().await;
    }

    /// Wait for the server task to finish.
    pub async fn join(&self) {
        let handle = self.server_handle.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!("gateway task failed: {e}");
            }
        }
    }
}

#[async_trait]
impl PluginAdapter for Gateway {
    fn name(&self) -> &str {
        "gateway"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Gateway
    }

    async fn health_check(&self) -> Result<HealthStatus, TutorlinkError> {
        let handle = self.server_handle.lock().await;
        match handle.as_ref() {
            Some(h) if !h.is_finished() => Ok(HealthStatus::Healthy),
            Some(_) => Ok(HealthStatus::Unhealthy("server task exited".to_string())),
            None => Ok(HealthStatus::Unhealthy("server not started".to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), TutorlinkError> {
        self.shutdown.cancel();
        self.join().await;
        Ok(())
    }
}
