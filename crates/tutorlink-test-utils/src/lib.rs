// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Tutorlink integration tests.
//!
//! Provides a fault-injecting store and test harness infrastructure for
//! fast, deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`TestHarness`] - Temp SQLite stack with a manual clock and seeded profiles
//! - [`FlakyStore`] - Session store wrapper that fails writes on demand

pub mod flaky_store;
pub mod harness;

pub use flaky_store::FlakyStore;
pub use harness::{TestHarness, TestHarnessBuilder, admin, senior, volunteer};
