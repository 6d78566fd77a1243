// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage seam behind the relay.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tutorlink_core::types::SessionId;
use tutorlink_core::{PluginAdapter, TutorlinkError};

use crate::signal::{Signal, SignalDraft};

/// Per-session bounded signal queues.
///
/// Implementations assign `received_at` and append atomically with respect
/// to other appends and reads of the same session, so `received_at` is
/// strictly increasing per session and readers see whole snapshots.
#[async_trait]
pub trait SignalBackend: PluginAdapter {
    /// Appends `draft`, stamping it no earlier than `now`, and evicts the
    /// oldest signals beyond the queue capacity.
    async fn append(
        &self,
        session_id: &SessionId,
        draft: SignalDraft,
        now: DateTime<Utc>,
    ) -> Result<Signal, TutorlinkError>;

    /// Retained signals with `received_at > since`, oldest first.
    async fn read_since(
        &self,
        session_id: &SessionId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Signal>, TutorlinkError>;

    /// Number of signals currently retained for the session.
    async fn retained(&self, session_id: &SessionId) -> Result<usize, TutorlinkError>;

    /// Drops every queue whose newest signal is older than `idle_before`.
    /// Returns how many queues were dropped.
    async fn prune_idle(&self, idle_before: DateTime<Utc>) -> Result<usize, TutorlinkError>;
}
