// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tutoring session lifecycle for Tutorlink.
//!
//! Sessions move `scheduled -> in_progress -> completed | cancelled`, or
//! straight from `scheduled` to `cancelled`. Time-based rules are evaluated
//! lazily whenever sessions are read or mutated, and on demand through
//! [`SessionManager::apply_timeout_policy`]; there is no background timer.

pub mod listing;
pub mod manager;
pub mod policy;

pub use listing::{
    SessionFilter, SessionListing, SessionOrder, SessionScope, SessionView,
    SweepReport,
};
pub use manager::{NewSession, SessionManager};
pub use policy::TimeoutPolicy;
