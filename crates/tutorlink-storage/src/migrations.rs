// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema migrations for the `sessions` and `profiles` tables.
//!
//! The SQL under `migrations/` is embedded at build time and applied before
//! the async connection opens.

use tracing::info;
use tutorlink_core::TutorlinkError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Brings the schema up to date. Returns the migrations applied by this call,
/// as `V<version>__<name>`; empty when the schema was already current.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<Vec<String>, TutorlinkError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(|e| TutorlinkError::Storage {
            source: Box::new(e),
        })?;

    let applied: Vec<String> = report
        .applied_migrations()
        .iter()
        .map(ToString::to_string)
        .collect();
    for migration in &applied {
        info!(%migration, "schema migration applied");
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_run_applies_nothing() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        let first = run_migrations(&mut conn).unwrap();
        assert_eq!(first, vec!["V1__sessions_and_profiles".to_string()]);
        assert!(run_migrations(&mut conn).unwrap().is_empty());
    }
}
