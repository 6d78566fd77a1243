// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as positive timeouts, non-empty paths, and consistent duration bounds.

use crate::diagnostic::ConfigError;
use crate::model::TutorlinkConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &TutorlinkConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config
        .gateway
        .bearer_token
        .as_deref()
        .is_some_and(|token| token.trim().is_empty())
    {
        fail("gateway.bearer_token must not be blank when set".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let lifecycle = &config.lifecycle;
    if lifecycle.in_progress_timeout_minutes == 0 {
        fail("lifecycle.in_progress_timeout_minutes must be positive".to_string());
    }
    if lifecycle.scheduling_timeout_minutes == 0 {
        fail("lifecycle.scheduling_timeout_minutes must be positive".to_string());
    }
    if lifecycle.default_duration_minutes == 0 {
        fail("lifecycle.default_duration_minutes must be positive".to_string());
    }
    if lifecycle.default_duration_minutes > lifecycle.max_duration_minutes {
        fail(format!(
            "lifecycle.default_duration_minutes ({}) exceeds lifecycle.max_duration_minutes ({})",
            lifecycle.default_duration_minutes, lifecycle.max_duration_minutes
        ));
    }
    if lifecycle.max_list_limit == 0 {
        fail("lifecycle.max_list_limit must be positive".to_string());
    }

    if config.relay.max_signals_per_session == 0 {
        fail("relay.max_signals_per_session must be positive".to_string());
    }
    if config.relay.max_payload_bytes == 0 {
        fail("relay.max_payload_bytes must be positive".to_string());
    }
    if config.relay.idle_queue_ttl_minutes == 0 {
        fail("relay.idle_queue_ttl_minutes must be positive".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(errors: &[ConfigError]) -> Vec<String> {
        errors
            .iter()
            .filter_map(|e| match e {
                ConfigError::Validation { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn default_config_validates() {
        let config = TutorlinkConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = TutorlinkConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors).iter().any(|m| m.contains("database_path")));
    }

    #[test]
    fn zero_timeouts_fail_validation() {
        let mut config = TutorlinkConfig::default();
        config.lifecycle.in_progress_timeout_minutes = 0;
        config.lifecycle.scheduling_timeout_minutes = 0;
        let errors = validate_config(&config).unwrap_err();
        let messages = messages(&errors);
        assert_eq!(messages.len(), 2, "both timeouts reported: {messages:?}");
    }

    #[test]
    fn default_duration_above_max_fails_validation() {
        let mut config = TutorlinkConfig::default();
        config.lifecycle.default_duration_minutes = 600;
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors).iter().any(|m| m.contains("exceeds")));
    }

    #[test]
    fn zero_relay_capacity_fails_validation() {
        let mut config = TutorlinkConfig::default();
        config.relay.max_signals_per_session = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors).iter().any(|m| m.contains("max_signals_per_session")));
    }

    #[test]
    fn zero_idle_queue_ttl_fails_validation() {
        let mut config = TutorlinkConfig::default();
        config.relay.idle_queue_ttl_minutes = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors).iter().any(|m| m.contains("idle_queue_ttl_minutes")));
    }

    #[test]
    fn blank_bearer_token_fails_validation() {
        let mut config = TutorlinkConfig::default();
        config.gateway.bearer_token = Some("   ".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn bad_host_fails_validation() {
        let mut config = TutorlinkConfig::default();
        config.gateway.host = "not a host!".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors).iter().any(|m| m.contains("gateway.host")));
    }
}
