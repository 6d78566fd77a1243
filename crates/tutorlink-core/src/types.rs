// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the lifecycle manager, relay, storage, and gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a tutoring session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        SessionId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        SessionId(value.to_string())
    }
}

/// Identifier of a user as resolved by the upstream identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        UserId(value.to_string())
    }
}

/// Role tag attached to a resolved caller identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Requests help; creates sessions.
    Senior,
    /// Helps; joins sessions.
    Volunteer,
    /// Operator with access to every session.
    Admin,
}

/// An authenticated caller. The core trusts this to have been verified upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId(id.into()),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A user profile as exposed by the profile directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub role: Role,
    pub display_name: String,
}

/// Lifecycle state of a session.
///
/// `Scheduled` is initial; `Completed` and `Cancelled` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub const ALL: [SessionStatus; 4] = [
        SessionStatus::Scheduled,
        SessionStatus::InProgress,
        SessionStatus::Completed,
        SessionStatus::Cancelled,
    ];

    /// Terminal states never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }

    /// Whether `self -> next` is an edge of the lifecycle graph.
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Scheduled, InProgress)
                | (Scheduled, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }
}

/// A caller-initiated transition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAction {
    Start,
    Complete,
    Cancel,
}

impl TransitionAction {
    /// The status this action moves a session into.
    pub fn target(self) -> SessionStatus {
        match self {
            TransitionAction::Start => SessionStatus::InProgress,
            TransitionAction::Complete => SessionStatus::Completed,
            TransitionAction::Cancel => SessionStatus::Cancelled,
        }
    }
}

/// System-authored reason for the most recent transition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransitionReason {
    Started,
    CompletedByParticipant,
    CancelledByParticipant,
    /// In progress for longer than the in-progress timeout.
    AutoCompletedTimeout,
    /// Nobody started the session within the scheduling timeout.
    AutoCancelledNoHelper,
}

impl TransitionReason {
    pub fn is_automatic(self) -> bool {
        matches!(
            self,
            TransitionReason::AutoCompletedTimeout | TransitionReason::AutoCancelledNoHelper
        )
    }
}

/// A tutoring session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub status: SessionStatus,
    pub requester_id: UserId,
    /// `None` while the session is open for auto-match.
    pub helper_id: Option<UserId>,
    pub topic: String,
    /// User-authored description.
    pub description: Option<String>,
    pub duration_minutes: u32,
    pub created_at: DateTime<Utc>,
    pub scheduled_at: DateTime<Utc>,
    pub last_transition_at: DateTime<Utc>,
    pub transition_reason: Option<TransitionReason>,
    /// Free-text note supplied by the caller with `complete` or `cancel`.
    pub transition_note: Option<String>,
}

impl Session {
    /// True iff the session can be joined right now.
    pub fn can_join(&self) -> bool {
        self.status == SessionStatus::InProgress
    }

    pub fn is_participant(&self, user: &UserId) -> bool {
        &self.requester_id == user || self.helper_id.as_ref() == Some(user)
    }

    /// The other participant from `viewer`'s point of view.
    ///
    /// Non-participants (admins) see the requester.
    pub fn counterpart_of(&self, viewer: &UserId) -> Option<&UserId> {
        if &self.requester_id == viewer {
            self.helper_id.as_ref()
        } else {
            Some(&self.requester_id)
        }
    }

    /// Applies a transition in memory, mirroring what the store persists.
    pub fn apply(&mut self, transition: &SessionTransition) {
        self.status = transition.status;
        self.last_transition_at = transition.at;
        self.transition_reason = Some(transition.reason);
        self.transition_note = transition.note.clone();
        if let Some(helper) = &transition.helper_id {
            self.helper_id = Some(helper.clone());
        }
    }
}

/// A compare-and-set status change.
///
/// The store applies it only while the session is still in `expected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTransition {
    pub session_id: SessionId,
    pub expected: SessionStatus,
    pub status: SessionStatus,
    pub at: DateTime<Utc>,
    pub reason: TransitionReason,
    pub note: Option<String>,
    /// Claims the helper slot when set.
    pub helper_id: Option<UserId>,
}

/// Store-level query over session records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionQuery {
    /// Sessions where this user is requester or helper.
    pub participant: Option<UserId>,
    /// Restrict to these statuses. `None` means any.
    pub statuses: Option<Vec<SessionStatus>>,
    /// Only sessions created strictly after this instant.
    pub created_after: Option<DateTime<Utc>>,
}

impl SessionQuery {
    /// Non-terminal sessions, the candidates of the timeout policy.
    pub fn open() -> Self {
        Self {
            statuses: Some(vec![SessionStatus::Scheduled, SessionStatus::InProgress]),
            ..Self::default()
        }
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    SignalBackend,
    Gateway,
}
