// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./tutorlink.toml` > `~/.config/tutorlink/tutorlink.toml` >
//! `/etc/tutorlink/tutorlink.toml` with environment variable overrides via `TUTORLINK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::TutorlinkConfig;

/// Section names recognised in `TUTORLINK_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &["service", "gateway", "storage", "lifecycle", "relay"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tutorlink/tutorlink.toml` (system-wide)
/// 3. `~/.config/tutorlink/tutorlink.toml` (user XDG config)
/// 4. `./tutorlink.toml` (local directory)
/// 5. `TUTORLINK_*` environment variables
pub fn load_config() -> Result<TutorlinkConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<TutorlinkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TutorlinkConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TutorlinkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TutorlinkConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Config files in merge order, lowest precedence first.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/tutorlink/tutorlink.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("tutorlink").join("tutorlink.toml"));
    }
    paths.push(PathBuf::from("tutorlink.toml"));
    paths
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    search_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(TutorlinkConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Create the environment variable provider with explicit section-to-dot mapping.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `TUTORLINK_LIFECYCLE_IN_PROGRESS_TIMEOUT_MINUTES` maps to
/// `lifecycle.in_progress_timeout_minutes`.
fn env_provider() -> Env {
    Env::prefixed("TUTORLINK_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_only_the_section_separator() {
        assert_eq!(
            map_env_key("lifecycle_in_progress_timeout_minutes"),
            "lifecycle.in_progress_timeout_minutes"
        );
        assert_eq!(map_env_key("gateway_bearer_token"), "gateway.bearer_token");
        assert_eq!(map_env_key("unrelated_key"), "unrelated_key");
    }

    #[test]
    fn env_override_wins_over_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("tutorlink.toml", "[relay]\nmax_signals_per_session = 10\n")?;
            jail.set_env("TUTORLINK_RELAY_MAX_SIGNALS_PER_SESSION", "25");
            let config = load_config_from_path(Path::new("tutorlink.toml"))?;
            assert_eq!(config.relay.max_signals_per_session, 25);
            Ok(())
        });
    }
}
