// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Profile lookups and upserts.

use rusqlite::params;
use tutorlink_core::TutorlinkError;
use tutorlink_core::types::{Profile, UserId};

use crate::database::Database;
use crate::models::profile_from_row;

/// Get a profile by user ID.
pub async fn get_profile(db: &Database, id: &UserId) -> Result<Option<Profile>, TutorlinkError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id, role, display_name FROM profiles WHERE id = ?1")?;
            match stmt.query_row(params![id], profile_from_row) {
                Ok(profile) => Ok(Some(profile)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a profile, or replace the role and name of an existing one.
pub async fn upsert_profile(db: &Database, profile: &Profile) -> Result<(), TutorlinkError> {
    let profile = profile.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO profiles (id, role, display_name) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                     role = excluded.role,
                     display_name = excluded.display_name",
                params![profile.id.0, profile.role.to_string(), profile.display_name],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use tutorlink_core::types::Role;

    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn upsert_then_get_returns_latest_values() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("p.db").to_str().unwrap())
            .await
            .unwrap();

        let mut profile = Profile {
            id: UserId::from("v1"),
            role: Role::Volunteer,
            display_name: "Ana".to_string(),
        };
        upsert_profile(&db, &profile).await.unwrap();
        assert_eq!(get_profile(&db, &profile.id).await.unwrap(), Some(profile.clone()));

        profile.display_name = "Ana B.".to_string();
        profile.role = Role::Admin;
        upsert_profile(&db, &profile).await.unwrap();
        assert_eq!(get_profile(&db, &profile.id).await.unwrap(), Some(profile));

        assert!(get_profile(&db, &UserId::from("nobody")).await.unwrap().is_none());
        db.close().await.unwrap();
    }
}
