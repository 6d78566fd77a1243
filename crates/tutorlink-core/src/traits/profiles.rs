// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only view of the external profile directory.

use async_trait::async_trait;

use crate::error::TutorlinkError;
use crate::types::{Profile, UserId};

/// Resolves user identifiers to profiles.
#[async_trait]
pub trait ProfileDirectory: Send + Sync + 'static {
    async fn get_profile(&self, id: &UserId) -> Result<Option<Profile>, TutorlinkError>;
}
