// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Backends extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod profiles;
pub mod storage;

pub use adapter::PluginAdapter;
pub use profiles::ProfileDirectory;
pub use storage::SessionStore;
