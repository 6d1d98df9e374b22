//! mailwright CLI library

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::Path;

use anyhow::{bail, Context, Result};
use mailwright::config::MailSettings;
use mailwright::email::EmailContext;
use serde_json::Value;

/// Parse a `key=value` template variable
///
/// Values that parse as JSON keep their type (`count=3`, `vip=true`,
/// `tags=["a","b"]`); anything else is a string.
///
/// # Errors
///
/// Returns an error if there is no `=` or the key is empty.
pub fn parse_var(raw: &str) -> Result<(String, Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("expected key=value, got `{raw}`");
    };

    let key = key.trim();
    if key.is_empty() {
        bail!("empty variable name in `{raw}`");
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Build a template context from `key=value` arguments; later keys win
///
/// # Errors
///
/// Returns an error if any argument is malformed.
pub fn context_from_vars<S: AsRef<str>>(vars: &[S]) -> Result<EmailContext> {
    vars.iter()
        .map(|raw| parse_var(raw.as_ref()))
        .collect::<Result<Vec<_>>>()
        .map(|pairs| pairs.into_iter().collect())
}

/// Load settings from `path`, or from the standard locations
///
/// # Errors
///
/// Returns an error if configuration cannot be read or parsed.
pub fn load_settings(path: Option<&Path>) -> Result<MailSettings> {
    match path {
        Some(path) => MailSettings::load_from(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => MailSettings::load().context("Failed to load configuration"),
    }
}
