// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment failures into miette diagnostics.
//!
//! Unknown keys get a Jaro-Winkler "did you mean" suggestion, and when the
//! offending TOML text is at hand, a labelled span pointing at the key.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Similarity a known key needs before it is offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// One problem with the loaded configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key no section declares. `key` is the dotted path, e.g. `relay.max_signal`.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(tutorlink::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Comma-separated keys the section accepts.
        valid_keys: String,
        #[label("not a known key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that does not deserialize into the field's type.
    #[error("invalid value for `{key}`: found {found}")]
    #[diagnostic(code(tutorlink::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
        #[label("expected {expected}")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(tutorlink::config::missing_key),
        help("add `{key} = <value>` to tutorlink.toml")
    )]
    MissingKey { key: String },

    /// A well-typed value that breaks a semantic rule.
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(tutorlink::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(tutorlink::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Converts every error figment collected into a [`ConfigError`].
///
/// `sources` pairs a file name with its TOML text and is used to attach
/// spans. When the failing provider is not a file (an inline string), the
/// single available source is assumed.
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.clone();
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let (span, src) = span_for(&error, &path, field, sources);
                    ConfigError::UnknownKey {
                        key: dotted(&path, field),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: dotted(&path, field),
                },
                Kind::InvalidType(found, expected) => {
                    let (section, field) = match path.split_last() {
                        Some((last, section)) => (section.to_vec(), last.clone()),
                        None => (Vec::new(), String::new()),
                    };
                    let (span, src) = span_for(&error, &section, &field, sources);
                    ConfigError::InvalidType {
                        key: path.join("."),
                        found: found.to_string(),
                        expected: expected.to_string(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn dotted(section: &[String], field: &str) -> String {
    if section.is_empty() {
        field.to_string()
    } else {
        format!("{}.{field}", section.join("."))
    }
}

fn span_for(
    error: &figment::error::Error,
    section: &[String],
    field: &str,
    sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    if field.is_empty() {
        return (None, None);
    }
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });
    let source = match file {
        Some(file) => sources.iter().find(|(name, _)| *name == file),
        None if sources.len() == 1 => sources.first(),
        None => None,
    };

    source
        .and_then(|(name, content)| {
            let offset = locate_key(content, section, field)?;
            Some((
                Some(SourceSpan::new(offset.into(), field.len())),
                Some(NamedSource::new(name, content.clone())),
            ))
        })
        .unwrap_or((None, None))
}

/// Byte offset of `key` inside the `[section]` table of `content`.
///
/// Tracks table headers while scanning, so a key of the same name in
/// another table is never matched. An empty `section` means the root table.
pub fn locate_key(content: &str, section: &[String], key: &str) -> Option<usize> {
    let wanted = section.join(".");
    let mut table = String::new();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        if let Some(header) = trimmed.strip_prefix('[') {
            if let Some(end) = header.find(']') {
                table = header[..end].trim().to_string();
            }
        } else if table == wanted {
            let is_key = trimmed
                .strip_prefix(key)
                .is_some_and(|rest| rest.trim_start().starts_with('='));
            if is_key {
                return Some(offset + indent);
            }
        }
        offset += line.len();
    }
    None
}

/// The known key most similar to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Renders each error to stderr with miette's graphical handler, then a count.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
    eprintln!("tutorlink: {} configuration error(s)", errors.len());
}
