// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tutorlink_core::TutorlinkError;
use tutorlink_core::types::{Role, SessionId, SessionStatus, TransitionAction, UserId};
use tutorlink_lifecycle::{NewSession, SessionFilter, SessionOrder, SessionScope, SweepReport};
use tutorlink_relay::{Signal, SignalDraft};

use crate::error::ApiError;
use crate::identity::Caller;
use crate::server::GatewayState;
use crate::summary::{SessionDetail, SessionSummary, Summarizer};

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Seconds since the gateway started.
    pub uptime_secs: u64,
}

/// Request body for POST /v1/sessions.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSessionRequest {
    pub topic: String,
    #[serde(default)]
    pub helper_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

/// Response body for POST /v1/sessions.
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub id: String,
    pub session: SessionSummary,
}

/// Query string of GET /v1/sessions.
#[derive(Debug, Default, Deserialize)]
pub struct ListSessionsParams {
    /// Comma-separated statuses.
    pub status: Option<String>,
    /// RFC 3339 lower bound on creation time (exclusive).
    pub since: Option<String>,
    /// `created_at` (default) or `scheduled_at`.
    pub order: Option<String>,
    pub limit: Option<usize>,
}

/// Response body for GET /v1/sessions.
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionSummary>,
    /// Some timeout transitions could not be saved; states shown are projected.
    pub possibly_stale: bool,
}

/// Request body for POST /v1/sessions/{id}/transition.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionRequest {
    pub action: TransitionAction,
    #[serde(default)]
    pub note: Option<String>,
}

/// Response body for POST /v1/sweep.
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub examined: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub failed: usize,
}

impl From<SweepReport> for SweepResponse {
    fn from(report: SweepReport) -> Self {
        Self {
            examined: report.examined,
            completed: report.completed,
            cancelled: report.cancelled,
            failed: report.failed,
        }
    }
}

/// Response body for POST /v1/sessions/{id}/signals.
#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub received_at: DateTime<Utc>,
}

/// Query string of GET /v1/sessions/{id}/signals.
#[derive(Debug, Default, Deserialize)]
pub struct PollParams {
    pub since: Option<String>,
}

/// Response body for GET /v1/sessions/{id}/signals.
#[derive(Debug, Serialize)]
pub struct PollResponse {
    pub signals: Vec<Signal>,
}

fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, TutorlinkError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| TutorlinkError::Validation(format!("{field}: invalid timestamp '{raw}': {e}")))
}

fn parse_statuses(raw: &str) -> Result<Vec<SessionStatus>, TutorlinkError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            SessionStatus::from_str(s)
                .map_err(|_| TutorlinkError::Validation(format!("status: unknown value '{s}'")))
        })
        .collect()
}

fn parse_order(raw: &str) -> Result<SessionOrder, TutorlinkError> {
    match raw {
        "created_at" => Ok(SessionOrder::CreatedAt),
        "scheduled_at" => Ok(SessionOrder::ScheduledAt),
        other => Err(TutorlinkError::Validation(format!(
            "order: expected created_at or scheduled_at, got '{other}'"
        ))),
    }
}

/// GET /health
///
/// Unauthenticated liveness probe.
pub async fn get_public_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}

/// POST /v1/sessions
pub async fn create_session(
    State(state): State<GatewayState>,
    Caller(actor): Caller,
    Json(body): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ApiError> {
    if !matches!(actor.role, Role::Senior | Role::Admin) {
        return Err(TutorlinkError::unauthorized("only seniors can request sessions").into());
    }
    let request = NewSession {
        helper_id: body.helper_id.map(UserId),
        topic: body.topic,
        description: body.description,
        duration_minutes: body.duration_minutes,
    };
    let session = state.manager.create_session(&actor, request).await?;
    let summary = Summarizer::new(state.manager.profiles().as_ref())
        .summarize(&session, &actor.id)
        .await;
    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            id: session.id.0,
            session: summary,
        }),
    ))
}

/// GET /v1/sessions
///
/// Lists the caller's sessions; admins see every session.
pub async fn list_sessions(
    State(state): State<GatewayState>,
    Caller(actor): Caller,
    Query(params): Query<ListSessionsParams>,
) -> Result<Json<SessionListResponse>, ApiError> {
    let filter = SessionFilter {
        participant: (!actor.is_admin()).then(|| actor.id.clone()),
        statuses: params.status.as_deref().map(parse_statuses).transpose()?,
        created_after: params
            .since
            .as_deref()
            .map(|raw| parse_timestamp("since", raw))
            .transpose()?,
        order_by: params
            .order
            .as_deref()
            .map(parse_order)
            .transpose()?
            .unwrap_or_default(),
        limit: params.limit,
    };
    let listing = state.manager.list_sessions(filter).await?;

    let mut summarizer = Summarizer::new(state.manager.profiles().as_ref());
    let mut sessions = Vec::with_capacity(listing.len());
    for session in &listing {
        sessions.push(summarizer.summarize(session, &actor.id).await);
    }
    Ok(Json(SessionListResponse {
        sessions,
        possibly_stale: listing.possibly_stale(),
    }))
}

/// GET /v1/sessions/{id}
pub async fn get_session(
    State(state): State<GatewayState>,
    Caller(actor): Caller,
    Path(id): Path<String>,
) -> Result<Json<SessionDetail>, ApiError> {
    let view = state.manager.get_session(&SessionId(id), &actor).await?;
    let summary = Summarizer::new(state.manager.profiles().as_ref())
        .summarize(&view.session, &actor.id)
        .await;
    Ok(Json(SessionDetail {
        summary,
        possibly_stale: view.possibly_stale,
    }))
}

/// POST /v1/sessions/{id}/transition
pub async fn transition_session(
    State(state): State<GatewayState>,
    Caller(actor): Caller,
    Path(id): Path<String>,
    Json(body): Json<TransitionRequest>,
) -> Result<Json<SessionSummary>, ApiError> {
    let session = state
        .manager
        .transition(&SessionId(id), &actor, body.action, body.note)
        .await?;
    let summary = Summarizer::new(state.manager.profiles().as_ref())
        .summarize(&session, &actor.id)
        .await;
    Ok(Json(summary))
}

/// POST /v1/sweep
///
/// Explicit timeout-policy pass over every session. Admin only.
pub async fn sweep(
    State(state): State<GatewayState>,
    Caller(actor): Caller,
) -> Result<Json<SweepResponse>, ApiError> {
    if !actor.is_admin() {
        return Err(TutorlinkError::unauthorized("sweep requires the admin role").into());
    }
    let report = state.manager.apply_timeout_policy(SessionScope::All).await?;
    Ok(Json(report.into()))
}

/// POST /v1/sessions/{id}/signals
///
/// Participants of the session and admins only. Ids with no session record
/// are accepted.
pub async fn publish_signal(
    State(state): State<GatewayState>,
    Caller(actor): Caller,
    Path(id): Path<String>,
    Json(draft): Json<SignalDraft>,
) -> Result<(StatusCode, Json<PublishResponse>), ApiError> {
    let id = SessionId(id);
    state.manager.authorize_signaling(&id, &actor).await?;
    let signal = state.relay.publish(&id, draft).await?;
    tracing::debug!(sender = %actor.id, session_id = %signal.session_id, "signal accepted");
    Ok((
        StatusCode::ACCEPTED,
        Json(PublishResponse {
            received_at: signal.received_at,
        }),
    ))
}

/// GET /v1/sessions/{id}/signals
///
/// Same access rule as [`publish_signal`].
pub async fn poll_signals(
    State(state): State<GatewayState>,
    Caller(actor): Caller,
    Path(id): Path<String>,
    Query(params): Query<PollParams>,
) -> Result<Json<PollResponse>, ApiError> {
    let id = SessionId(id);
    state.manager.authorize_signaling(&id, &actor).await?;
    let since = params
        .since
        .as_deref()
        .map(|raw| parse_timestamp("since", raw))
        .transpose()?;
    let batch = state.relay.poll(&id, since).await?;
    Ok(Json(PollResponse {
        signals: batch.into_signals(),
    }))
}
