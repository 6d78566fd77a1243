// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot maintenance commands: `tutorlink sweep` and `tutorlink profile add`.

use std::sync::Arc;

use tutorlink_config::model::TutorlinkConfig;
use tutorlink_core::clock::SystemClock;
use tutorlink_core::types::{Profile, Role, UserId};
use tutorlink_core::{SessionStore, TutorlinkError};
use tutorlink_lifecycle::{SessionManager, SessionScope, SweepReport};

use crate::serve::open_storage;

/// Run the timeout policy once and print the report.
pub async fn run_sweep(
    config: &TutorlinkConfig,
    participant: Option<String>,
) -> Result<(), TutorlinkError> {
    let storage = open_storage(config).await?;
    let manager = SessionManager::new(
        storage.clone(),
        storage.clone(),
        Arc::new(SystemClock),
        config.lifecycle.clone(),
    );

    let scope = match participant {
        Some(id) => SessionScope::Participant(UserId(id)),
        None => SessionScope::All,
    };
    let report = manager.apply_timeout_policy(scope).await;
    storage.close().await?;

    println!("{}", format_report(&report?));
    Ok(())
}

/// Insert or update one profile in the directory.
pub async fn run_profile_add(
    config: &TutorlinkConfig,
    id: String,
    role: Role,
    name: String,
) -> Result<(), TutorlinkError> {
    let id = id.trim().to_string();
    let name = name.trim().to_string();
    if id.is_empty() {
        return Err(TutorlinkError::Validation("profile id must not be empty".into()));
    }
    if name.is_empty() {
        return Err(TutorlinkError::Validation("display name must not be empty".into()));
    }

    let storage = open_storage(config).await?;
    let profile = Profile {
        id: UserId(id),
        role,
        display_name: name,
    };
    let result = storage.upsert_profile(&profile).await;
    storage.close().await?;
    result?;

    println!("profile {} saved as {}", profile.id, profile.role);
    Ok(())
}

fn format_report(report: &SweepReport) -> String {
    format!(
        "examined {} open session(s): {} completed, {} cancelled, {} failed",
        report.examined, report.completed, report.cancelled, report.failed
    )
}
