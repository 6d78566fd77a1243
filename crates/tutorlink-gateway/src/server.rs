// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router assembly and the listening loop.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use tutorlink_core::TutorlinkError;
use tutorlink_lifecycle::SessionManager;
use tutorlink_relay::SignalRelay;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Backs the uptime figure on `/health`.
#[derive(Clone)]
pub struct HealthState {
    pub start_time: std::time::Instant,
}

/// Cloned into every handler.
#[derive(Clone)]
pub struct GatewayState {
    pub manager: Arc<SessionManager>,
    pub relay: Arc<SignalRelay>,
    pub auth: AuthConfig,
    pub health: HealthState,
}

/// Listen address for [`start_server`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Assembles the HTTP surface.
///
/// `/health` is public. Everything under `/v1` passes the bearer check and
/// then resolves the caller's identity inside each handler.
pub fn build_router(state: GatewayState) -> Router {
    let guard = axum_middleware::from_fn_with_state(state.auth.clone(), auth_middleware);

    let v1 = Router::new()
        .route(
            "/v1/sessions",
            post(handlers::create_session).get(handlers::list_sessions),
        )
        .route("/v1/sessions/{id}", get(handlers::get_session))
        .route(
            "/v1/sessions/{id}/transition",
            post(handlers::transition_session),
        )
        .route(
            "/v1/sessions/{id}/signals",
            post(handlers::publish_signal).get(handlers::poll_signals),
        )
        .route("/v1/sweep", post(handlers::sweep))
        .route_layer(guard);

    Router::new()
        .route("/health", get(handlers::get_public_health))
        .merge(v1)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Binds the listening socket. Failing here is a startup error.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, TutorlinkError> {
    let addr = config.addr();
    TcpListener::bind(&addr)
        .await
        .map_err(|e| TutorlinkError::Internal(format!("cannot listen on {addr}: {e}")))
}

/// Serves the router on an already bound `listener` until `shutdown`
/// fires, then drains in-flight requests.
pub async fn serve(
    listener: TcpListener,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), TutorlinkError> {
    let local = listener
        .local_addr()
        .map_err(|e| TutorlinkError::Internal(format!("listener has no address: {e}")))?;
    info!(addr = %local, "gateway listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| TutorlinkError::Internal(format!("gateway on {local} failed: {e}")))?;

    info!(addr = %local, "gateway stopped");
    Ok(())
}

/// [`bind`] then [`serve`].
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), TutorlinkError> {
    let listener = bind(config).await?;
    serve(listener, state, shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_joins_host_and_port() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8088,
        };
        assert_eq!(config.addr(), "0.0.0.0:8088");
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let harness = tutorlink_test_utils::TestHarness::builder().build().await.unwrap();
        let state = GatewayState {
            manager: harness.manager.clone(),
            relay: harness.relay.clone(),
            auth: AuthConfig { bearer_token: None },
            health: HealthState {
                start_time: std::time::Instant::now(),
            },
        };
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port,
        };
        let err = start_server(&config, state, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cannot listen"));
    }
}
