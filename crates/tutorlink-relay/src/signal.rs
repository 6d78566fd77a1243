// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signal types exchanged between the two peers of a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tutorlink_core::types::SessionId;

/// Connection-negotiation message kind.
///
/// Serialized as a plain string; anything other than the three well-known
/// kinds is carried through as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignalKind {
    Offer,
    Answer,
    Candidate,
    Custom(String),
}

impl SignalKind {
    pub fn as_str(&self) -> &str {
        match self {
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
            SignalKind::Candidate => "candidate",
            SignalKind::Custom(tag) => tag,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().trim().is_empty()
    }
}

impl From<String> for SignalKind {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "offer" => SignalKind::Offer,
            "answer" => SignalKind::Answer,
            "candidate" => SignalKind::Candidate,
            _ => SignalKind::Custom(value),
        }
    }
}

impl From<&str> for SignalKind {
    fn from(value: &str) -> Self {
        SignalKind::from(value.to_string())
    }
}

impl From<SignalKind> for String {
    fn from(kind: SignalKind) -> Self {
        match kind {
            SignalKind::Custom(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a peer submits to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDraft {
    pub kind: SignalKind,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl SignalDraft {
    pub fn new(kind: impl Into<SignalKind>, payload: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }
}

/// A signal as retained by the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub session_id: SessionId,
    pub kind: SignalKind,
    pub payload: serde_json::Value,
    /// Relay-assigned; strictly increasing within a session.
    pub received_at: DateTime<Utc>,
}

/// Result of a poll, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalBatch {
    signals: Vec<Signal>,
}

impl SignalBatch {
    pub fn new(signals: Vec<Signal>) -> Self {
        Self { signals }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Signal> {
        self.signals.iter()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Cursor for the next poll: the newest `received_at` in the batch.
    pub fn cursor(&self) -> Option<DateTime<Utc>> {
        self.signals.last().map(|s| s.received_at)
    }

    pub fn into_signals(self) -> Vec<Signal> {
        self.signals
    }
}

impl IntoIterator for SignalBatch {
    type Item = Signal;
    type IntoIter = std::vec::IntoIter<Signal>;

    fn into_iter(self) -> Self::IntoIter {
        self.signals.into_iter()
    }
}

impl<'a> IntoIterator for &'a SignalBatch {
    type Item = &'a Signal;
    type IntoIter = std::slice::Iter<'a, Signal>;

    fn into_iter(self) -> Self::IntoIter {
        self.signals.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_kinds_parse_case_insensitively() {
        assert_eq!(SignalKind::from("Offer"), SignalKind::Offer);
        assert_eq!(SignalKind::from("candidate"), SignalKind::Candidate);
        assert_eq!(
            SignalKind::from("bye"),
            SignalKind::Custom("bye".to_string())
        );
    }

    #[test]
    fn kind_serializes_as_plain_string() {
        let draft = SignalDraft::new("answer", serde_json::json!({"sdp": "v=0"}));
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["kind"], "answer");

        let custom: SignalDraft =
            serde_json::from_str(r#"{"kind":"renegotiate","payload":null}"#).unwrap();
        assert_eq!(custom.kind, SignalKind::Custom("renegotiate".into()));
    }

    #[test]
    fn blank_custom_kind_is_empty() {
        assert!(SignalKind::from("  ").is_empty());
        assert!(!SignalKind::Offer.is_empty());
    }
}
