// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the session and profile tables.

pub mod profiles;
pub mod sessions;
