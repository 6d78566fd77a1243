// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`SqliteStorage`]: the durable session store and profile directory.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use tutorlink_config::model::StorageConfig;
use tutorlink_core::types::{Profile, Session, SessionId, SessionQuery, SessionTransition, UserId};
use tutorlink_core::{
    AdapterType, HealthStatus, PluginAdapter, ProfileDirectory, SessionStore, TutorlinkError,
};

use crate::database::Database;
use crate::queries::{profiles, sessions};

/// Session and profile persistence over one SQLite file.
///
/// Constructing the value touches nothing on disk; the file is opened and
/// migrated by [`SessionStore::initialize`], which may run once.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn opened(&self) -> Result<&Database, TutorlinkError> {
        self.db.get().ok_or_else(|| TutorlinkError::Storage {
            source: format!("{} is not open yet", self.config.database_path).into(),
        })
    }

    /// Registers a profile, or replaces the role and name of an existing one.
    pub async fn upsert_profile(&self, profile: &Profile) -> Result<(), TutorlinkError> {
        profiles::upsert_profile(self.opened()?, profile).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, TutorlinkError> {
        let Some(db) = self.db.get() else {
            return Ok(HealthStatus::Unhealthy("not initialized".into()));
        };
        let mode = match db.journal_mode().await {
            Ok(mode) => mode,
            Err(e) => return Ok(HealthStatus::Unhealthy(e.to_string())),
        };
        if self.config.wal_mode && mode != "wal" {
            return Ok(HealthStatus::Degraded(format!(
                "expected wal journal, found {mode}"
            )));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TutorlinkError> {
        match self.db.get() {
            Some(db) => db.checkpoint().await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SessionStore for SqliteStorage {
    async fn initialize(&self) -> Result<(), TutorlinkError> {
        let db = Database::open_with_options(&self.config.database_path, self.config.wal_mode)
            .await?;
        if self.db.set(db).is_err() {
            return Err(TutorlinkError::Storage {
                source: "initialize called twice".into(),
            });
        }
        info!(path = %self.config.database_path, "session store ready");
        Ok(())
    }

    async fn close(&self) -> Result<(), TutorlinkError> {
        self.opened()?.checkpoint().await?;
        debug!(path = %self.config.database_path, "session store flushed");
        Ok(())
    }

    async fn insert_session(&self, session: &Session) -> Result<(), TutorlinkError> {
        sessions::insert_session(self.opened()?, session).await
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>, TutorlinkError> {
        sessions::get_session(self.opened()?, id).await
    }

    async fn query_sessions(&self, query: &SessionQuery) -> Result<Vec<Session>, TutorlinkError> {
        sessions::query_sessions(self.opened()?, query).await
    }

    async fn transition_session(
        &self,
        transition: &SessionTransition,
    ) -> Result<bool, TutorlinkError> {
        sessions::transition_session(self.opened()?, transition).await
    }
}

#[async_trait]
impl ProfileDirectory for SqliteStorage {
    async fn get_profile(&self, id: &UserId) -> Result<Option<Profile>, TutorlinkError> {
        profiles::get_profile(self.opened()?, id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use tutorlink_core::types::{Role, SessionStatus, TransitionReason};

    use super::*;
    use tempfile::{TempDir, tempdir};

    fn storage_in(dir: &TempDir, file: &str, wal_mode: bool) -> SqliteStorage {
        SqliteStorage::new(StorageConfig {
            database_path: dir.path().join(file).to_string_lossy().into_owned(),
            wal_mode,
        })
    }

    #[test]
    fn adapter_identity() {
        let dir = tempdir().unwrap();
        let storage = storage_in(&dir, "id.db", true);
        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
        assert!(!dir.path().join("id.db").exists(), "new() must not touch disk");
    }

    #[tokio::test]
    async fn second_initialize_is_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage_in(&dir, "twice.db", true);
        storage.initialize().await.unwrap();
        assert!(dir.path().join("twice.db").exists());
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn operations_before_initialize_fail() {
        let dir = tempdir().unwrap();
        let storage = storage_in(&dir, "early.db", true);
        assert!(storage.get_session(&SessionId::from("s")).await.is_err());
        assert!(storage.close().await.is_err());
        storage.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn health_follows_lifecycle_and_journal_mode() {
        let dir = tempdir().unwrap();
        let storage = storage_in(&dir, "health.db", true);
        assert!(matches!(
            storage.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
        storage.initialize().await.unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);

        let rollback = storage_in(&dir, "rollback.db", false);
        rollback.initialize().await.unwrap();
        assert_eq!(rollback.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn session_and_profile_flow_through_adapter() {
        let dir = tempdir().unwrap();
        let storage = storage_in(&dir, "flow.db", true);
        storage.initialize().await.unwrap();

        storage
            .upsert_profile(&Profile {
                id: UserId::from("v1"),
                role: Role::Volunteer,
                display_name: "Ana".to_string(),
            })
            .await
            .unwrap();
        let helper = storage.get_profile(&UserId::from("v1")).await.unwrap().unwrap();
        assert_eq!(helper.role, Role::Volunteer);

        let now = Utc::now();
        let session = Session {
            id: SessionId::from("sess-adapter-1"),
            status: SessionStatus::Scheduled,
            requester_id: UserId::from("r1"),
            helper_id: Some(helper.id.clone()),
            topic: "photos".to_string(),
            description: None,
            duration_minutes: 45,
            created_at: now,
            scheduled_at: now + Duration::hours(2),
            last_transition_at: now,
            transition_reason: None,
            transition_note: None,
        };
        storage.insert_session(&session).await.unwrap();

        let applied = storage
            .transition_session(&SessionTransition {
                session_id: session.id.clone(),
                expected: SessionStatus::Scheduled,
                status: SessionStatus::InProgress,
                at: now + Duration::minutes(5),
                reason: TransitionReason::Started,
                note: None,
                helper_id: None,
            })
            .await
            .unwrap();
        assert!(applied);

        let open = storage.query_sessions(&SessionQuery::open()).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].status, SessionStatus::InProgress);

        storage.close().await.unwrap();
        storage.shutdown().await.unwrap();
    }
}
