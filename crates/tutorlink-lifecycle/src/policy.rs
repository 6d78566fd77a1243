// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-based auto-transitions.
//!
//! Two rules, each with a single configured threshold:
//!
//! - an `in_progress` session whose last transition is older than the
//!   in-progress timeout is completed;
//! - a `scheduled` session whose scheduled start is older than the
//!   scheduling timeout is cancelled.
//!
//! Both trigger only on strictly greater elapsed time.

use chrono::{DateTime, Duration, Utc};

use tutorlink_config::model::LifecycleConfig;
use tutorlink_core::types::{Session, SessionStatus, SessionTransition, TransitionReason};

/// Thresholds of the timeout policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    pub in_progress_timeout: Duration,
    pub scheduling_timeout: Duration,
}

impl TimeoutPolicy {
    pub fn new(in_progress_timeout: Duration, scheduling_timeout: Duration) -> Self {
        Self {
            in_progress_timeout,
            scheduling_timeout,
        }
    }

    pub fn from_config(config: &LifecycleConfig) -> Self {
        Self::new(
            Duration::minutes(i64::from(config.in_progress_timeout_minutes)),
            Duration::minutes(i64::from(config.scheduling_timeout_minutes)),
        )
    }

    /// Returns the transition the policy forces on `session` at `now`, if any.
    ///
    /// Pure: nothing is written. The returned transition is guarded on the
    /// session's current status so it can be persisted with a compare-and-set.
    pub fn evaluate(&self, session: &Session, now: DateTime<Utc>) -> Option<SessionTransition> {
        let (status, reason) = match session.status {
            SessionStatus::InProgress
                if now - session.last_transition_at > self.in_progress_timeout =>
            {
                (SessionStatus::Completed, TransitionReason::AutoCompletedTimeout)
            }
            SessionStatus::Scheduled if now - session.scheduled_at > self.scheduling_timeout => {
                (SessionStatus::Cancelled, TransitionReason::AutoCancelledNoHelper)
            }
            _ => return None,
        };
        Some(SessionTransition {
            session_id: session.id.clone(),
            expected: session.status,
            status,
            at: now.max(session.last_transition_at),
            reason,
            note: None,
            helper_id: None,
        })
    }
}

impl From<&LifecycleConfig> for TimeoutPolicy {
    fn from(config: &LifecycleConfig) -> Self {
        Self::from_config(config)
    }
}
