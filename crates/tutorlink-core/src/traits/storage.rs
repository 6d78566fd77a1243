// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable store for session records.

use async_trait::async_trait;

use crate::error::TutorlinkError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Session, SessionId, SessionQuery, SessionTransition};

/// Durable store exposing session records by identifier.
///
/// Every status change goes through [`SessionStore::transition_session`],
/// a single atomic compare-and-set, so two racing writers can never both
/// move the same session.
#[async_trait]
pub trait SessionStore: PluginAdapter {
    /// Initializes the backend (migrations, connections).
    async fn initialize(&self) -> Result<(), TutorlinkError>;

    /// Closes the backend, flushing pending writes.
    async fn close(&self) -> Result<(), TutorlinkError>;

    /// Inserts a new session record.
    async fn insert_session(&self, session: &Session) -> Result<(), TutorlinkError>;

    /// Fetches one session, `None` when the id does not resolve.
    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>, TutorlinkError>;

    /// Returns the sessions matching `query`, newest first by creation time.
    async fn query_sessions(&self, query: &SessionQuery) -> Result<Vec<Session>, TutorlinkError>;

    /// Applies `transition` iff the session is still in `transition.expected`.
    ///
    /// Returns `false` when the session was not in the expected state (or
    /// does not exist); nothing is written in that case.
    async fn transition_session(
        &self,
        transition: &SessionTransition,
    ) -> Result<bool, TutorlinkError>;
}
