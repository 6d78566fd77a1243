// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for Tutorlink.
//!
//! Layered TOML files and `TUTORLINK_*` environment variables are merged by
//! figment into [`TutorlinkConfig`]. Every section rejects unknown keys, and
//! semantic rules (positive timeouts, duration bounds) are checked after
//! deserialization. All problems are reported at once as [`ConfigError`]s.
//!
//! ```no_run
//! let config = tutorlink_config::load_and_validate().expect("config errors");
//! println!("in-progress timeout: {} min", config.lifecycle.in_progress_timeout_minutes);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::TutorlinkConfig;

/// Loads the standard hierarchy (see [`loader::load_config`]) and validates it.
pub fn load_and_validate() -> Result<TutorlinkConfig, Vec<ConfigError>> {
    finish(loader::load_config(), || {
        loader::search_paths()
            .into_iter()
            .filter_map(|path| read_source(&path))
            .collect()
    })
}

/// Loads a TOML string on top of the defaults and validates it.
pub fn load_and_validate_str(toml_content: &str) -> Result<TutorlinkConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Loads one explicit file (plus env overrides) and validates it.
pub fn load_and_validate_path(path: &Path) -> Result<TutorlinkConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Validates a loaded config, or turns the load failure into diagnostics.
/// `sources` is only read on failure.
fn finish(
    loaded: Result<TutorlinkConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<TutorlinkConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

fn read_source(path: &Path) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    let name = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| PathBuf::from(path))
    };
    Some((name.display().to_string(), content))
}
