// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query and result types for reads and sweeps.

use chrono::{DateTime, Utc};

use tutorlink_core::types::{Session, SessionStatus, UserId};

/// Sort key of a listing. Listings are always newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionOrder {
    #[default]
    CreatedAt,
    ScheduledAt,
}

impl SessionOrder {
    fn key(self, session: &Session) -> DateTime<Utc> {
        match self {
            SessionOrder::CreatedAt => session.created_at,
            SessionOrder::ScheduledAt => session.scheduled_at,
        }
    }
}

/// Filter for [`crate::SessionManager::list_sessions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFilter {
    /// Sessions where this user is requester or helper. `None` lists all.
    pub participant: Option<UserId>,
    /// Statuses to keep, matched after the timeout policy has run.
    pub statuses: Option<Vec<SessionStatus>>,
    /// Only sessions created strictly after this instant.
    pub created_after: Option<DateTime<Utc>>,
    pub order_by: SessionOrder,
    /// Capped at `lifecycle.max_list_limit`.
    pub limit: Option<usize>,
}

impl SessionFilter {
    /// All sessions of one participant.
    pub fn for_participant(user: UserId) -> Self {
        Self {
            participant: Some(user),
            ..Self::default()
        }
    }

    pub(crate) fn keeps(&self, session: &Session) -> bool {
        self.statuses
            .as_ref()
            .is_none_or(|wanted| wanted.contains(&session.status))
    }

    pub(crate) fn sort(&self, sessions: &mut [Session]) {
        let order = self.order_by;
        sessions.sort_by(|a, b| {
            order
                .key(b)
                .cmp(&order.key(a))
                .then_with(|| b.id.cmp(&a.id))
        });
    }
}

/// One session as a read path saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub session: Session,
    /// Set when a timeout transition was applied in memory but could not be
    /// written back.
    pub possibly_stale: bool,
}

/// A finite, ordered listing. Iterate it as often as needed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionListing {
    sessions: Vec<Session>,
    possibly_stale: bool,
}

impl SessionListing {
    pub(crate) fn new(sessions: Vec<Session>, possibly_stale: bool) -> Self {
        Self {
            sessions,
            possibly_stale,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Session> {
        self.sessions.iter()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// True when at least one timeout transition could not be persisted.
    ///
    /// The listed states are still the post-policy ones; only the store may
    /// lag behind until the next read or sweep.
    pub fn possibly_stale(&self) -> bool {
        self.possibly_stale
    }

    pub fn into_sessions(self) -> Vec<Session> {
        self.sessions
    }
}

impl IntoIterator for SessionListing {
    type Item = Session;
    type IntoIter = std::vec::IntoIter<Session>;

    fn into_iter(self) -> Self::IntoIter {
        self.sessions.into_iter()
    }
}

impl<'a> IntoIterator for &'a SessionListing {
    type Item = &'a Session;
    type IntoIter = std::slice::Iter<'a, Session>;

    fn into_iter(self) -> Self::IntoIter {
        self.sessions.iter()
    }
}

/// Which sessions an explicit timeout-policy pass covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionScope {
    All,
    Participant(UserId),
}

/// Outcome of one timeout-policy pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Non-terminal sessions loaded.
    pub examined: usize,
    pub completed: usize,
    pub cancelled: usize,
    /// Transitions the store failed to persist.
    pub failed: usize,
}

impl SweepReport {
    pub fn changed(&self) -> usize {
        self.completed + self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use tutorlink_core::types::SessionId;

    use super::*;

    fn at(id: &str, created_min: i64, scheduled_min: i64) -> Session {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        Session {
            id: SessionId::from(id),
            status: SessionStatus::Scheduled,
            requester_id: UserId::from("r1"),
            helper_id: None,
            topic: "t".to_string(),
            description: None,
            duration_minutes: 30,
            created_at: base + Duration::minutes(created_min),
            scheduled_at: base + Duration::minutes(scheduled_min),
            last_transition_at: base,
            transition_reason: None,
            transition_note: None,
        }
    }

    #[test]
    fn sort_is_descending_by_chosen_key() {
        let mut sessions = vec![at("a", 0, 50), at("b", 10, 20), at("c", 5, 90)];

        let by_created = SessionFilter::default();
        by_created.sort(&mut sessions);
        let ids: Vec<_> = sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);

        let by_scheduled = SessionFilter {
            order_by: SessionOrder::ScheduledAt,
            ..SessionFilter::default()
        };
        by_scheduled.sort(&mut sessions);
        let ids: Vec<_> = sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn listing_can_be_iterated_repeatedly() {
        let listing = SessionListing::new(vec![at("a", 0, 0), at("b", 1, 1)], false);
        assert_eq!(listing.iter().count(), 2);
        assert_eq!((&listing).into_iter().count(), 2);
        let ids: Vec<_> = listing.into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![SessionId::from("a"), SessionId::from("b")]);
    }

    #[test]
    fn status_filter_keeps_everything_when_unset() {
        let s = at("a", 0, 0);
        assert!(SessionFilter::default().keeps(&s));
        let only_done = SessionFilter {
            statuses: Some(vec![SessionStatus::Completed]),
            ..SessionFilter::default()
        };
        assert!(!only_done.keeps(&s));
    }
}
