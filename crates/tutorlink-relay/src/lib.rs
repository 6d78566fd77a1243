// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signaling relay for Tutorlink.
//!
//! Buffers connection-negotiation messages per session for asynchronous
//! pickup by polling. Each session keeps a bounded FIFO window; the oldest
//! signal is evicted when a new one would exceed it. Nothing is persisted.

pub mod backend;
pub mod memory;
pub mod relay;
pub mod signal;

pub use backend::SignalBackend;
pub use memory::InMemorySignalBackend;
pub use relay::SignalRelay;
pub use signal::{Signal, SignalBatch, SignalDraft, SignalKind};
