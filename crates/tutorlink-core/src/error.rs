// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Tutorlink.

use serde::Serialize;
use strum::{Display, EnumString};
use thiserror::Error;

use crate::types::{SessionId, SessionStatus, TransitionAction};

/// The primary error type used across the lifecycle manager, relay, storage,
/// and gateway.
#[derive(Debug, Error)]
pub enum TutorlinkError {
    /// Caller lacks the required role, or the session does not belong to the caller.
    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    /// A session or profile identifier does not resolve.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The requested state change is not reachable from the current state.
    #[error("cannot {action} session {session_id} in state {from}")]
    InvalidTransition {
        session_id: SessionId,
        from: SessionStatus,
        action: TransitionAction,
    },

    /// Missing or malformed required input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Stable error category exposed at the boundary.
///
/// Clients use it to tell "try again" (`Internal`) apart from "not possible
/// now" (`InvalidTransition`) and "not allowed" (`Unauthorized`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    InvalidTransition,
    Validation,
    Internal,
}

impl TutorlinkError {
    /// Returns the boundary category for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TutorlinkError::Unauthorized { .. } => ErrorKind::Unauthorized,
            TutorlinkError::NotFound { .. } => ErrorKind::NotFound,
            TutorlinkError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            TutorlinkError::Validation(_) => ErrorKind::Validation,
            TutorlinkError::Storage { .. }
            | TutorlinkError::Config(_)
            | TutorlinkError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Shorthand for an [`TutorlinkError::Unauthorized`] error.
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        TutorlinkError::Unauthorized {
            reason: reason.into(),
        }
    }

    /// Shorthand for a missing session.
    pub fn session_not_found(id: &SessionId) -> Self {
        TutorlinkError::NotFound {
            entity: "session",
            id: id.to_string(),
        }
    }

    /// Shorthand for a missing profile.
    pub fn profile_not_found(id: impl Into<String>) -> Self {
        TutorlinkError::NotFound {
            entity: "profile",
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_config_and_internal_collapse_to_internal() {
        let storage = TutorlinkError::Storage {
            source: Box::new(std::io::Error::other("disk gone")),
        };
        assert_eq!(storage.kind(), ErrorKind::Internal);
        assert_eq!(TutorlinkError::Config("x".into()).kind(), ErrorKind::Internal);
        assert_eq!(TutorlinkError::Internal("x".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn each_caller_facing_error_has_its_own_kind() {
        let kinds = [
            TutorlinkError::unauthorized("nope").kind(),
            TutorlinkError::session_not_found(&SessionId::from("s1")).kind(),
            TutorlinkError::InvalidTransition {
                session_id: SessionId::from("s1"),
                from: SessionStatus::Completed,
                action: TransitionAction::Start,
            }
            .kind(),
            TutorlinkError::Validation("bad".into()).kind(),
            TutorlinkError::Internal("boom".into()).kind(),
        ];
        let unique: std::collections::HashSet<_> = kinds.iter().collect();
        assert_eq!(unique.len(), kinds.len());
    }

    #[test]
    fn invalid_transition_message_names_state_and_action() {
        let err = TutorlinkError::InvalidTransition {
            session_id: SessionId::from("s-9"),
            from: SessionStatus::InProgress,
            action: TransitionAction::Start,
        };
        assert_eq!(err.to_string(), "cannot start session s-9 in state in_progress");
    }

    #[test]
    fn error_kind_renders_snake_case() {
        assert_eq!(ErrorKind::InvalidTransition.to_string(), "invalid_transition");
        assert_eq!(
            serde_json::to_string(&ErrorKind::NotFound).unwrap(),
            "\"not_found\""
        );
    }
}
