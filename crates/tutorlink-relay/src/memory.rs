// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-local signal backend.
//!
//! One `Mutex<VecDeque>` per session inside a `DashMap`, so sessions never
//! contend with each other beyond shard locking. A queue lives until
//! [`SignalBackend::prune_idle`] finds it idle or the backend shuts down.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use tutorlink_core::types::{AdapterType, HealthStatus, SessionId};
use tutorlink_core::{PluginAdapter, TutorlinkError};

use crate::backend::SignalBackend;
use crate::signal::{Signal, SignalDraft};

/// In-memory [`SignalBackend`]. Signals are lost on restart.
pub struct InMemorySignalBackend {
    queues: DashMap<SessionId, Mutex<VecDeque<Signal>>>,
    capacity: usize,
}

impl InMemorySignalBackend {
    /// Creates a backend retaining at most `capacity` signals per session.
    pub fn new(capacity: usize) -> Self {
        Self {
            queues: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Number of sessions with a queue.
    pub fn session_count(&self) -> usize {
        self.queues.len()
    }
}

fn lock(queue: &Mutex<VecDeque<Signal>>) -> MutexGuard<'_, VecDeque<Signal>> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl PluginAdapter for InMemorySignalBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::SignalBackend
    }

    async fn health_check(&self) -> Result<HealthStatus, TutorlinkError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TutorlinkError> {
        let sessions = self.queues.len();
        self.queues.clear();
        debug!(sessions, "signal queues dropped");
        Ok(())
    }
}

#[async_trait]
impl SignalBackend for InMemorySignalBackend {
    async fn append(
        &self,
        session_id: &SessionId,
        draft: SignalDraft,
        now: DateTime<Utc>,
    ) -> Result<Signal, TutorlinkError> {
        let entry = self.queues.entry(session_id.clone()).or_default();
        let mut queue = lock(entry.value());

        let received_at = match queue.back() {
            Some(last) if last.received_at >= now => last.received_at + Duration::microseconds(1),
            _ => now,
        };
        let signal = Signal {
            session_id: session_id.clone(),
            kind: draft.kind,
            payload: draft.payload,
            received_at,
        };
        queue.push_back(signal.clone());
        while queue.len() > self.capacity {
            if let Some(evicted) = queue.pop_front() {
                debug!(session_id = %session_id, kind = %evicted.kind, "evicted oldest signal");
            }
        }
        Ok(signal)
    }

    async fn read_since(
        &self,
        session_id: &SessionId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Signal>, TutorlinkError> {
        let Some(entry) = self.queues.get(session_id) else {
            return Ok(Vec::new());
        };
        let queue = lock(entry.value());
        Ok(queue
            .iter()
            .filter(|s| since.is_none_or(|cursor| s.received_at > cursor))
            .cloned()
            .collect())
    }

    async fn retained(&self, session_id: &SessionId) -> Result<usize, TutorlinkError> {
        let Some(entry) = self.queues.get(session_id) else {
            return Ok(0);
        };
        let len = lock(entry.value()).len();
        Ok(len)
    }

    async fn prune_idle(&self, idle_before: DateTime<Utc>) -> Result<usize, TutorlinkError> {
        let before = self.queues.len();
        self.queues.retain(|_, queue| {
            lock(queue)
                .back()
                .is_some_and(|newest| newest.received_at >= idle_before)
        });
        let dropped = before.saturating_sub(self.queues.len());
        if dropped > 0 {
            debug!(dropped, "idle signal queues dropped");
        }
        Ok(dropped)
    }
}
