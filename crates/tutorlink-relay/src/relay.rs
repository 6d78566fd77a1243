// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publish and poll front of the signaling relay.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use tutorlink_config::model::RelayConfig;
use tutorlink_core::types::SessionId;
use tutorlink_core::{Clock, TutorlinkError};

use crate::backend::SignalBackend;
use crate::memory::InMemorySignalBackend;
use crate::signal::{Signal, SignalBatch, SignalDraft};

/// Minimum seconds between idle-queue passes triggered by `publish`.
const PRUNE_INTERVAL_SECS: i64 = 60;

/// Ordered, bounded, per-session message channel between two peers.
///
/// The relay never consults the session store: any session id is accepted.
/// Queues idle for longer than `relay.idle_queue_ttl_minutes` are dropped
/// by a pass that `publish` runs at most once a minute.
pub struct SignalRelay {
    backend: Arc<dyn SignalBackend>,
    clock: Arc<dyn Clock>,
    max_payload_bytes: usize,
    idle_ttl: Duration,
    last_prune: Mutex<Option<DateTime<Utc>>>,
}

impl SignalRelay {
    pub fn new(backend: Arc<dyn SignalBackend>, clock: Arc<dyn Clock>, config: &RelayConfig) -> Self {
        Self {
            backend,
            clock,
            max_payload_bytes: config.max_payload_bytes,
            idle_ttl: Duration::minutes(i64::from(config.idle_queue_ttl_minutes)),
            last_prune: Mutex::new(None),
        }
    }

    /// Relay backed by process-local queues sized from `config`.
    pub fn in_memory(clock: Arc<dyn Clock>, config: &RelayConfig) -> Self {
        let backend = Arc::new(InMemorySignalBackend::new(config.max_signals_per_session));
        Self::new(backend, clock, config)
    }

    pub fn backend(&self) -> &Arc<dyn SignalBackend> {
        &self.backend
    }

    /// Appends a signal and returns it with its assigned `received_at`.
    pub async fn publish(
        &self,
        session_id: &SessionId,
        draft: SignalDraft,
    ) -> Result<Signal, TutorlinkError> {
        if session_id.as_str().trim().is_empty() {
            return Err(TutorlinkError::Validation("session id is required".into()));
        }
        if draft.kind.is_empty() {
            return Err(TutorlinkError::Validation("signal kind is required".into()));
        }
        let size = serde_json::to_vec(&draft.payload)
            .map_err(|e| TutorlinkError::Internal(format!("payload serialization failed: {e}")))?
            .len();
        if size > self.max_payload_bytes {
            return Err(TutorlinkError::Validation(format!(
                "payload is {size} bytes; the limit is {}",
                self.max_payload_bytes
            )));
        }

        let now = self.clock.now();
        self.prune_if_due(now).await;
        let signal = self.backend.append(session_id, draft, now).await?;
        debug!(
            session_id = %session_id,
            kind = %signal.kind,
            bytes = size,
            "signal published"
        );
        Ok(signal)
    }

    /// Signals received strictly after `since`, or the whole retained window.
    pub async fn poll(
        &self,
        session_id: &SessionId,
        since: Option<DateTime<Utc>>,
    ) -> Result<SignalBatch, TutorlinkError> {
        let signals = self.backend.read_since(session_id, since).await?;
        debug!(session_id = %session_id, count = signals.len(), "signals polled");
        Ok(SignalBatch::new(signals))
    }

    /// Current queue length for `session_id`.
    pub async fn retained(&self, session_id: &SessionId) -> Result<usize, TutorlinkError> {
        self.backend.retained(session_id).await
    }

    /// Drops queues idle for longer than the configured TTL.
    pub async fn prune_idle(&self) -> Result<usize, TutorlinkError> {
        let now = self.clock.now();
        *self.last_prune.lock().unwrap_or_else(PoisonError::into_inner) = Some(now);
        self.backend.prune_idle(now - self.idle_ttl).await
    }

    /// A failed pass is logged and retried on a later publish.
    async fn prune_if_due(&self, now: DateTime<Utc>) {
        let due = {
            let mut last = self.last_prune.lock().unwrap_or_else(PoisonError::into_inner);
            match *last {
                Some(at) if now - at < Duration::seconds(PRUNE_INTERVAL_SECS) => false,
                _ => {
                    *last = Some(now);
                    true
                }
            }
        };
        if due {
            if let Err(e) = self.backend.prune_idle(now - self.idle_ttl).await {
                warn!(error = %e, "idle signal queue pass failed");
            }
        }
    }
}
