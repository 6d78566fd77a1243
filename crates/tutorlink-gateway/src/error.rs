// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of domain errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use tutorlink_core::{ErrorKind, TutorlinkError};

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
    /// Stable machine-readable category.
    pub kind: String,
}

/// An error on its way to the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    /// The caller identity is missing or malformed.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            body: ErrorResponse {
                error: message.into(),
                kind: "unauthenticated".to_string(),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// HTTP status for each boundary category.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidTransition => StatusCode::CONFLICT,
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Internal => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl From<TutorlinkError> for ApiError {
    fn from(err: TutorlinkError) -> Self {
        let kind = err.kind();
        if kind == ErrorKind::Internal {
            tracing::error!(error = %err, "request failed");
        }
        Self {
            status: status_for(kind),
            body: ErrorResponse {
                error: err.to_string(),
                kind: kind.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use tutorlink_core::types::{SessionId, SessionStatus, TransitionAction};

    use super::*;

    #[test]
    fn each_kind_maps_to_its_status() {
        let cases = [
            (TutorlinkError::unauthorized("no"), StatusCode::FORBIDDEN),
            (
                TutorlinkError::session_not_found(&SessionId::from("s")),
                StatusCode::NOT_FOUND,
            ),
            (
                TutorlinkError::InvalidTransition {
                    session_id: SessionId::from("s"),
                    from: SessionStatus::Completed,
                    action: TransitionAction::Cancel,
                },
                StatusCode::CONFLICT,
            ),
            (
                TutorlinkError::Validation("bad".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                TutorlinkError::Storage {
                    source: "disk".into(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn error_body_carries_kind() {
        let err = ApiError::from(TutorlinkError::Validation("topic is required".into()));
        let json = serde_json::to_value(&err.body).unwrap();
        assert_eq!(json["kind"], "validation");
        assert_eq!(json["error"], "validation error: topic is required");
    }
}
