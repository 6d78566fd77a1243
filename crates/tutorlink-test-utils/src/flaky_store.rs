// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session store wrapper that fails writes on demand.
//!
//! `FlakyStore` forwards every call to an inner [`SessionStore`]. While
//! writes are switched off, `insert_session` and `transition_session` fail
//! with a storage error and are counted; reads keep working.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use tutorlink_core::types::{
    AdapterType, HealthStatus, Session, SessionId, SessionQuery, SessionTransition,
};
use tutorlink_core::{PluginAdapter, SessionStore, TutorlinkError};

/// A store whose writes can be made to fail.
pub struct FlakyStore {
    inner: Arc<dyn SessionStore>,
    fail_writes: AtomicBool,
    failed_writes: AtomicUsize,
}

impl FlakyStore {
    /// Wrap `inner` with writes initially enabled.
    pub fn new(inner: Arc<dyn SessionStore>) -> Self {
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
            failed_writes: AtomicUsize::new(0),
        }
    }

    /// Make subsequent writes fail (`true`) or succeed (`false`).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of writes rejected so far.
    pub fn failed_writes(&self) -> usize {
        self.failed_writes.load(Ordering::SeqCst)
    }

    fn check_write(&self) -> Result<(), TutorlinkError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            self.failed_writes.fetch_add(1, Ordering::SeqCst);
            return Err(TutorlinkError::Storage {
                source: "injected write failure".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for FlakyStore {
    fn name(&self) -> &str {
        "flaky-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, TutorlinkError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Ok(HealthStatus::Degraded("writes failing".into()));
        }
        self.inner.health_check().await
    }

    async fn shutdown(&self) -> Result<(), TutorlinkError> {
        self.inner.shutdown().await
    }
}

#[async_trait]
impl SessionStore for FlakyStore {
    async fn initialize(&self) -> Result<(), TutorlinkError> {
        self.inner.initialize().await
    }

    async fn close(&self) -> Result<(), TutorlinkError> {
        self.inner.close().await
    }

    async fn insert_session(&self, session: &Session) -> Result<(), TutorlinkError> {
        self.check_write()?;
        self.inner.insert_session(session).await
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>, TutorlinkError> {
        self.inner.get_session(id).await
    }

    async fn query_sessions(&self, query: &SessionQuery) -> Result<Vec<Session>, TutorlinkError> {
        self.inner.query_sessions(query).await
    }

    async fn transition_session(
        &self,
        transition: &SessionTransition,
    ) -> Result<bool, TutorlinkError> {
        self.check_write()?;
        self.inner.transition_session(transition).await
    }
}
