// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Column codecs between domain types and SQLite rows.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings with
//! microsecond precision, so lexicographic order matches time order.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

use tutorlink_core::types::{
    Profile, Role, Session, SessionId, SessionStatus, TransitionReason, UserId,
};

/// Column list shared by every session SELECT, in [`session_from_row`] order.
pub(crate) const SESSION_COLUMNS: &str = "id, status, requester_id, helper_id, topic, description, \
     duration_minutes, created_at, scheduled_at, last_transition_at, transition_reason, \
     transition_note";

pub(crate) fn encode_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_err(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn ts_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| conversion_err(idx, e))
}

fn parsed_at<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = strum::ParseError>,
{
    let raw: String = row.get(idx)?;
    T::from_str(&raw).map_err(|e| conversion_err(idx, e))
}

pub(crate) fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    let reason: Option<String> = row.get(10)?;
    let transition_reason = reason
        .map(|r| TransitionReason::from_str(&r).map_err(|e| conversion_err(10, e)))
        .transpose()?;
    Ok(Session {
        id: SessionId(row.get(0)?),
        status: parsed_at::<SessionStatus>(row, 1)?,
        requester_id: UserId(row.get(2)?),
        helper_id: row.get::<_, Option<String>>(3)?.map(UserId),
        topic: row.get(4)?,
        description: row.get(5)?,
        duration_minutes: row.get(6)?,
        created_at: ts_at(row, 7)?,
        scheduled_at: ts_at(row, 8)?,
        last_transition_at: ts_at(row, 9)?,
        transition_reason,
        transition_note: row.get(11)?,
    })
}

pub(crate) fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: UserId(row.get(0)?),
        role: parsed_at::<Role>(row, 1)?,
        display_name: row.get(2)?,
    })
}
