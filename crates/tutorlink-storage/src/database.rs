// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! The `Database` struct is the single writer; query modules accept `&Database`
//! and go through [`Database::connection`]. Do NOT create additional
//! `Connection` instances for writes.

use std::path::Path;

use tracing::debug;
use tutorlink_core::TutorlinkError;

/// Busy timeout applied to every connection, in milliseconds.
const BUSY_TIMEOUT_MS: u32 = 5000;

/// Handle to the session database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` in WAL mode and
    /// applies pending migrations.
    pub async fn open(path: &str) -> Result<Self, TutorlinkError> {
        Self::open_with_options(path, true).await
    }

    /// Like [`Database::open`] with an explicit journal mode choice.
    pub async fn open_with_options(path: &str, wal_mode: bool) -> Result<Self, TutorlinkError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| TutorlinkError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        // Migrations need a blocking `&mut Connection`; run them before the
        // async writer thread takes ownership of the file.
        let migrate_path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), TutorlinkError> {
            let mut conn = rusqlite::Connection::open(&migrate_path).map_err(storage_err)?;
            apply_pragmas(&conn, wal_mode).map_err(storage_err)?;
            crate::migrations::run_migrations(&mut conn).map(|_| ())
        })
        .await
        .map_err(|e| TutorlinkError::Internal(format!("migration task failed: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(storage_err)?;
        conn.call(move |conn| apply_pragmas(conn, wal_mode))
            .await
            .map_err(map_tr_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The serialized async connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Folds the write-ahead log back into the main database file.
    pub async fn checkpoint(&self) -> Result<(), TutorlinkError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// The active journal mode, lowercased. Also serves as a liveness probe.
    pub async fn journal_mode(&self) -> Result<String, TutorlinkError> {
        self.conn
            .call(|conn| {
                conn.query_row("PRAGMA journal_mode;", [], |row| row.get::<_, String>(0))
            })
            .await
            .map(|mode| mode.to_lowercase())
            .map_err(map_tr_err)
    }

    /// Checkpoints the WAL and closes the connection.
    pub async fn close(self) -> Result<(), TutorlinkError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(map_tr_err)
    }
}

fn apply_pragmas(conn: &rusqlite::Connection, wal_mode: bool) -> Result<(), rusqlite::Error> {
    let journal = if wal_mode { "WAL" } else { "DELETE" };
    conn.execute_batch(&format!(
        "PRAGMA journal_mode = {journal};
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = {BUSY_TIMEOUT_MS};"
    ))
}

fn storage_err(e: rusqlite::Error) -> TutorlinkError {
    TutorlinkError::Storage {
        source: Box::new(e),
    }
}

/// Maps a tokio-rusqlite error into the crate error type.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> TutorlinkError {
    TutorlinkError::Storage {
        source: Box::new(e),
    }
}
