// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Tutorlink.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Tutorlink configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TutorlinkConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Session lifecycle and timeout policy settings.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Signaling relay settings.
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service instance.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "tutorlink".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP gateway configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bearer token shared with the upstream identity provider.
    /// `None` rejects every authenticated route.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            bearer_token: None,
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    3000
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("tutorlink").join("tutorlink.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("tutorlink.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// What `create_session` does when the requested helper does not resolve
/// to a volunteer profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownHelperPolicy {
    /// Fail the request with `NotFound`.
    #[default]
    Reject,
    /// Create the session unmatched and log a warning.
    Unassigned,
}

/// Session lifecycle configuration.
///
/// The two timeouts are the only thresholds the timeout policy uses; every
/// read path shares them.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LifecycleConfig {
    /// Minutes a session may stay in progress before it is auto-completed.
    #[serde(default = "default_in_progress_timeout_minutes")]
    pub in_progress_timeout_minutes: u32,

    /// Minutes a session may wait for a helper before it is auto-cancelled.
    #[serde(default = "default_scheduling_timeout_minutes")]
    pub scheduling_timeout_minutes: u32,

    /// Duration assigned when the requester does not give one.
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: u32,

    /// Upper bound on a requested duration.
    #[serde(default = "default_max_duration_minutes")]
    pub max_duration_minutes: u32,

    /// Behavior for helper ids that do not resolve.
    #[serde(default)]
    pub unknown_helper: UnknownHelperPolicy,

    /// Maximum number of sessions a single listing returns.
    #[serde(default = "default_max_list_limit")]
    pub max_list_limit: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            in_progress_timeout_minutes: default_in_progress_timeout_minutes(),
            scheduling_timeout_minutes: default_scheduling_timeout_minutes(),
            default_duration_minutes: default_duration_minutes(),
            max_duration_minutes: default_max_duration_minutes(),
            unknown_helper: UnknownHelperPolicy::default(),
            max_list_limit: default_max_list_limit(),
        }
    }
}

fn default_in_progress_timeout_minutes() -> u32 {
    120
}

fn default_scheduling_timeout_minutes() -> u32 {
    180
}

fn default_duration_minutes() -> u32 {
    60
}

fn default_max_duration_minutes() -> u32 {
    480
}

fn default_max_list_limit() -> usize {
    200
}

/// Signaling relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Signals retained per session; the oldest is evicted beyond this.
    #[serde(default = "default_max_signals_per_session")]
    pub max_signals_per_session: usize,

    /// Largest accepted serialized payload, in bytes.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,

    /// Minutes after its newest signal that a session's queue is dropped.
    #[serde(default = "default_idle_queue_ttl_minutes")]
    pub idle_queue_ttl_minutes: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_signals_per_session: default_max_signals_per_session(),
            max_payload_bytes: default_max_payload_bytes(),
            idle_queue_ttl_minutes: default_idle_queue_ttl_minutes(),
        }
    }
}

fn default_max_signals_per_session() -> usize {
    50
}

fn default_max_payload_bytes() -> usize {
    64 * 1024
}

fn default_idle_queue_ttl_minutes() -> u32 {
    240
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = TutorlinkConfig::default();
        assert_eq!(config.service.name, "tutorlink");
        assert_eq!(config.gateway.port, 3000);
        assert_eq!(config.lifecycle.in_progress_timeout_minutes, 120);
        assert_eq!(config.lifecycle.scheduling_timeout_minutes, 180);
        assert_eq!(config.lifecycle.unknown_helper, UnknownHelperPolicy::Reject);
        assert_eq!(config.relay.max_signals_per_session, 50);
        assert_eq!(config.relay.idle_queue_ttl_minutes, 240);
    }

    #[test]
    fn gateway_debug_redacts_token() {
        let config = GatewayConfig {
            bearer_token: Some("secret-token".to_string()),
            ..GatewayConfig::default()
        };
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("secret-token"));
        assert!(debug_output.contains("[redacted]"));
    }

    #[test]
    fn unknown_helper_policy_parses_snake_case() {
        let config: TutorlinkConfig = toml::from_str(
            r#"
[lifecycle]
unknown_helper = "unassigned"
"#,
        )
        .unwrap();
        assert_eq!(config.lifecycle.unknown_helper, UnknownHelperPolicy::Unassigned);
    }
}
