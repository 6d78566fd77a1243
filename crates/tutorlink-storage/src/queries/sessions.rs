// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session CRUD operations.

use rusqlite::params;
use tutorlink_core::TutorlinkError;
use tutorlink_core::types::{Session, SessionId, SessionQuery, SessionTransition};

use crate::database::Database;
use crate::models::{SESSION_COLUMNS, encode_ts, session_from_row};

/// Insert a new session.
pub async fn insert_session(db: &Database, session: &Session) -> Result<(), TutorlinkError> {
    let session = session.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO sessions (id, status, requester_id, helper_id, topic, description,
                     duration_minutes, created_at, scheduled_at, last_transition_at,
                     transition_reason, transition_note)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    session.id.0,
                    session.status.to_string(),
                    session.requester_id.0,
                    session.helper_id.map(|h| h.0),
                    session.topic,
                    session.description,
                    session.duration_minutes,
                    encode_ts(&session.created_at),
                    encode_ts(&session.scheduled_at),
                    encode_ts(&session.last_transition_at),
                    session.transition_reason.map(|r| r.to_string()),
                    session.transition_note,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a session by ID.
pub async fn get_session(db: &Database, id: &SessionId) -> Result<Option<Session>, TutorlinkError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"))?;
            match stmt.query_row(params![id], session_from_row) {
                Ok(session) => Ok(Some(session)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Sessions matching `query`, newest first by creation time.
pub async fn query_sessions(
    db: &Database,
    query: &SessionQuery,
) -> Result<Vec<Session>, TutorlinkError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut args: Vec<String> = Vec::new();

    if let Some(participant) = &query.participant {
        clauses.push("(requester_id = ? OR helper_id = ?)".to_string());
        args.push(participant.0.clone());
        args.push(participant.0.clone());
    }
    if let Some(statuses) = &query.statuses {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; statuses.len()].join(", ");
        clauses.push(format!("status IN ({placeholders})"));
        args.extend(statuses.iter().map(|s| s.to_string()));
    }
    if let Some(after) = &query.created_after {
        clauses.push("created_at > ?".to_string());
        args.push(encode_ts(after));
    }

    let mut sql = format!("SELECT {SESSION_COLUMNS} FROM sessions");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at DESC, id DESC");

    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), session_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Apply `transition` iff the row is still in `transition.expected`.
///
/// Returns whether a row changed. The status guard in the WHERE clause makes
/// concurrent writers race safely: exactly one of them observes `true`.
pub async fn transition_session(
    db: &Database,
    transition: &SessionTransition,
) -> Result<bool, TutorlinkError> {
    let t = transition.clone();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE sessions
                 SET status = ?1, last_transition_at = ?2, transition_reason = ?3,
                     transition_note = ?4, helper_id = COALESCE(?5, helper_id)
                 WHERE id = ?6 AND status = ?7",
                params![
                    t.status.to_string(),
                    encode_ts(&t.at),
                    t.reason.to_string(),
                    t.note,
                    t.helper_id.map(|h| h.0),
                    t.session_id.0,
                    t.expected.to_string(),
                ],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
