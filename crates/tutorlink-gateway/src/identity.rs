// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller identity forwarded by the upstream identity provider.
//!
//! Requests past the bearer check carry `X-Actor-Id` and `X-Actor-Role`.
//! The gateway trusts them as-is.

use std::str::FromStr;

use axum::{extract::FromRequestParts, http::request::Parts};

use tutorlink_core::types::{Actor, Role};

use crate::error::ApiError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// The resolved caller of a request.
#[derive(Debug, Clone)]
pub struct Caller(pub Actor);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let id = header(ACTOR_ID_HEADER)
            .ok_or_else(|| ApiError::unauthenticated("missing X-Actor-Id header"))?;
        let role = header(ACTOR_ROLE_HEADER)
            .ok_or_else(|| ApiError::unauthenticated("missing X-Actor-Role header"))?;
        let role = Role::from_str(role)
            .map_err(|_| ApiError::unauthenticated(format!("unknown role '{role}'")))?;

        Ok(Caller(Actor::new(id, role)))
    }
}
