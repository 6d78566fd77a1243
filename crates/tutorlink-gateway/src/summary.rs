// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller-relative session summaries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use tutorlink_core::ProfileDirectory;
use tutorlink_core::types::{Session, SessionStatus, TransitionReason, UserId};

/// A session as seen by one participant.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub topic: String,
    /// The other participant; `None` while no helper is assigned.
    pub counterpart_id: Option<String>,
    pub counterpart_name: Option<String>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub scheduled_at: DateTime<Utc>,
    pub last_transition_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub transition_reason: Option<TransitionReason>,
    pub can_join: bool,
}

/// Single-session read: the summary plus the degraded-cleanup marker.
#[derive(Debug, Clone, Serialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub summary: SessionSummary,
    pub possibly_stale: bool,
}

/// Builds summaries, resolving each counterpart name once.
pub struct Summarizer<'a> {
    profiles: &'a dyn ProfileDirectory,
    names: HashMap<UserId, Option<String>>,
}

impl<'a> Summarizer<'a> {
    pub fn new(profiles: &'a dyn ProfileDirectory) -> Self {
        Self {
            profiles,
            names: HashMap::new(),
        }
    }

    pub async fn summarize(&mut self, session: &Session, viewer: &UserId) -> SessionSummary {
        let counterpart = session.counterpart_of(viewer).cloned();
        let counterpart_name = match &counterpart {
            Some(id) => self.name_of(id).await,
            None => None,
        };
        SessionSummary {
            id: session.id.to_string(),
            topic: session.topic.clone(),
            counterpart_id: counterpart.map(|id| id.0),
            counterpart_name,
            status: session.status,
            created_at: session.created_at,
            scheduled_at: session.scheduled_at,
            last_transition_at: session.last_transition_at,
            duration_minutes: session.duration_minutes,
            transition_reason: session.transition_reason,
            can_join: session.can_join(),
        }
    }

    /// Display name of `id`. Lookup failures degrade to `None`.
    async fn name_of(&mut self, id: &UserId) -> Option<String> {
        if let Some(cached) = self.names.get(id) {
            return cached.clone();
        }
        let name = match self.profiles.get_profile(id).await {
            Ok(profile) => profile.map(|p| p.display_name),
            Err(e) => {
                tracing::warn!(user = %id, error = %e, "profile lookup failed");
                None
            }
        };
        self.names.insert(id.clone(), name.clone());
        name
    }
}
