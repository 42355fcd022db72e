//! Checks run on a loaded [`AppConfig`] before any request is made.

use std::ops::RangeInclusive;
use std::path::Path;

use crate::config::AppConfig;
use thiserror::Error;

/// Accepted request timeout, in milliseconds.
pub const TIMEOUT_MS: RangeInclusive<u64> = 100..=300_000;

/// Accepted response size cap, in bytes.
pub const MAX_BYTES: RangeInclusive<usize> = 1..=50 * 1024 * 1024;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.host_url()?;

        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be blank"));
        }
        if !TIMEOUT_MS.contains(&self.timeout_ms) {
            return Err(invalid("timeout_ms", format!("must be within {TIMEOUT_MS:?} ms")));
        }
        if !MAX_BYTES.contains(&self.max_bytes) {
            return Err(invalid("max_bytes", format!("must be within {MAX_BYTES:?} bytes")));
        }

        if let Some(key) = &self.login_key {
            check_login_key("login_key", key)?;
        }
        if let Some(key) = &self.plus_login_key {
            check_login_key("plus_login_key", key)?;
        }

        check_markdown_dir(&self.markdown_dir)
    }
}

/// Login keys are sent verbatim as a `LOGINKEY` cookie value.
fn check_login_key(field: &str, key: &str) -> Result<(), ConfigError> {
    if key.is_empty() {
        return Err(invalid(field, "must not be blank; unset it to browse anonymously"));
    }
    match key.chars().find(|&c| !c.is_ascii_graphic() || matches!(c, ';' | ',' | '"' | '\\')) {
        Some(c) => Err(invalid(field, format!("{c:?} is not allowed in a cookie value"))),
        None => Ok(()),
    }
}

/// The notes directory must exist, or its nearest existing ancestor must be a
/// directory it can be created under.
fn check_markdown_dir(dir: &Path) -> Result<(), ConfigError> {
    if dir.as_os_str().is_empty() {
        return Err(invalid("markdown_dir", "must not be empty"));
    }

    let nearest = dir.ancestors().find(|p| p.as_os_str().is_empty() || p.exists());
    match nearest {
        Some(p) if !p.as_os_str().is_empty() && !p.is_dir() => {
            Err(invalid("markdown_dir", format!("{} exists and is not a directory", p.display())))
        }
        _ => Ok(()),
    }
}
