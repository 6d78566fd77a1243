// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full stack over a temp SQLite database: a
//! seeded profile directory, a [`FlakyStore`] in front of the session table,
//! a [`ManualClock`], the session manager, and an in-memory relay.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use tutorlink_config::TutorlinkConfig;
use tutorlink_config::model::{LifecycleConfig, RelayConfig, StorageConfig};
use tutorlink_core::types::{Actor, Profile, Role, UserId};
use tutorlink_core::{ManualClock, SessionStore, TutorlinkError};
use tutorlink_lifecycle::SessionManager;
use tutorlink_relay::SignalRelay;
use tutorlink_storage::SqliteStorage;

use crate::flaky_store::FlakyStore;

/// Profiles every harness starts with.
pub const DEFAULT_PROFILES: [(&str, Role, &str); 5] = [
    ("r1", Role::Senior, "Rosa"),
    ("r2", Role::Senior, "Ray"),
    ("v1", Role::Volunteer, "Vera"),
    ("v2", Role::Volunteer, "Vik"),
    ("a1", Role::Admin, "Ada"),
];

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    lifecycle: LifecycleConfig,
    relay: RelayConfig,
    extra_profiles: Vec<Profile>,
    start: DateTime<Utc>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            lifecycle: LifecycleConfig::default(),
            relay: RelayConfig::default(),
            extra_profiles: Vec::new(),
            start: Utc
                .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
        }
    }

    /// Override lifecycle settings (timeouts, helper policy, limits).
    pub fn with_lifecycle(mut self, lifecycle: LifecycleConfig) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Override relay settings.
    pub fn with_relay(mut self, relay: RelayConfig) -> Self {
        self.relay = relay;
        self
    }

    /// Seed an additional profile.
    pub fn with_profile(mut self, id: &str, role: Role, display_name: &str) -> Self {
        self.extra_profiles.push(Profile {
            id: UserId::from(id),
            role,
            display_name: display_name.to_string(),
        });
        self
    }

    /// Start the manual clock at `start` instead of 2026-03-01T09:00:00Z.
    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, TutorlinkError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| TutorlinkError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let storage_config = StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        };
        let storage = Arc::new(SqliteStorage::new(storage_config.clone()));
        storage.initialize().await?;

        let seeded = DEFAULT_PROFILES
            .iter()
            .map(|(id, role, name)| Profile {
                id: UserId::from(*id),
                role: *role,
                display_name: name.to_string(),
            })
            .chain(self.extra_profiles);
        for profile in seeded {
            storage.upsert_profile(&profile).await?;
        }

        let store = Arc::new(FlakyStore::new(storage.clone()));
        let clock = Arc::new(ManualClock::new(self.start));
        let manager = Arc::new(SessionManager::new(
            store.clone(),
            storage.clone(),
            clock.clone(),
            self.lifecycle.clone(),
        ));
        let relay = Arc::new(SignalRelay::in_memory(clock.clone(), &self.relay));

        let config = TutorlinkConfig {
            storage: storage_config,
            lifecycle: self.lifecycle,
            relay: self.relay,
            ..TutorlinkConfig::default()
        };

        Ok(TestHarness {
            storage,
            store,
            clock,
            manager,
            relay,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment over temp storage.
pub struct TestHarness {
    /// SQLite storage (temp DB, cleaned up on drop); also the profile directory.
    pub storage: Arc<SqliteStorage>,
    /// The store the manager writes through.
    pub store: Arc<FlakyStore>,
    /// Clock shared by the manager and the relay.
    pub clock: Arc<ManualClock>,
    pub manager: Arc<SessionManager>,
    pub relay: Arc<SignalRelay>,
    /// Configuration the subsystems were built from.
    pub config: TutorlinkConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Move the shared clock forward.
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }
}

/// Actor with the senior role.
pub fn senior(id: &str) -> Actor {
    Actor::new(id, Role::Senior)
}

/// Actor with the volunteer role.
pub fn volunteer(id: &str) -> Actor {
    Actor::new(id, Role::Volunteer)
}

/// Actor with the admin role.
pub fn admin(id: &str) -> Actor {
    Actor::new(id, Role::Admin)
}
