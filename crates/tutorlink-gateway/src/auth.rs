// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared-secret check between the upstream identity provider and the gateway.
//!
//! Every `/v1` request must carry `Authorization: Bearer <token>`. With no
//! token configured, every such request is rejected.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Authentication configuration for the gateway.
#[derive(Clone)]
pub struct AuthConfig {
    /// Expected bearer token. `None` rejects every authenticated route.
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// The token from an `Authorization` header using the Bearer scheme.
///
/// The scheme name is case-insensitive.
fn presented_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|token| !token.is_empty())
}

/// Compares without short-circuiting on the first differing byte.
fn tokens_match(presented: &str, expected: &str) -> bool {
    presented.len() == expected.len()
        && presented
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

fn reject(message: &str) -> Response {
    let mut response = ApiError::unauthenticated(message).into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    response
}

/// Middleware that validates the bearer token before any `/v1` handler runs.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = auth.bearer_token.as_deref() else {
        tracing::error!("gateway has no bearer token configured; rejecting request");
        return reject("gateway is not accepting requests");
    };

    let verdict = match presented_token(request.headers()) {
        Some(token) if tokens_match(token, expected) => Ok(()),
        Some(_) => Err("invalid bearer token"),
        None => Err("missing bearer token"),
    };
    match verdict {
        Ok(()) => next.run(request).await,
        Err(reason) => {
            tracing::debug!(path = %request.uri().path(), reason, "request rejected");
            reject(reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(authorization: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::AUTHORIZATION, HeaderValue::from_str(authorization).unwrap());
        map
    }

    #[test]
    fn auth_config_debug_redacts_token() {
        let config = AuthConfig {
            bearer_token: Some("secret-token".to_string()),
        };
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("secret-token"));
        assert!(debug_output.contains("[redacted]"));
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(presented_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(presented_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(presented_token(&headers("Basic abc")), None);
        assert_eq!(presented_token(&headers("Bearer ")), None);
        assert_eq!(presented_token(&HeaderMap::new()), None);
    }

    #[test]
    fn token_comparison_needs_exact_match() {
        assert!(tokens_match("abc", "abc"));
        assert!(!tokens_match("abd", "abc"));
        assert!(!tokens_match("ab", "abc"));
    }

    #[test]
    fn rejection_advertises_bearer_scheme() {
        let response = reject("missing bearer token");
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}
