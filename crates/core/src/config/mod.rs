//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PIANOTE_*)
//! 2. TOML config file (if PIANOTE_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The loaded value is immutable and handed to every pipeline run.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

/// Desktop Chrome user agent; the platform serves the PC layout to it.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PIANOTE_*)
/// 2. TOML config file (if PIANOTE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin of the platform, e.g. `https://novelpia.com`.
    ///
    /// Set via PIANOTE_HOST environment variable.
    #[serde(default = "default_host")]
    pub host: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via PIANOTE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via PIANOTE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to read per response.
    ///
    /// Set via PIANOTE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Value of the `LOGINKEY` cookie.
    ///
    /// Set via PIANOTE_LOGIN_KEY environment variable. Without it, episode
    /// lists are requested anonymously and the library is unavailable.
    #[serde(default)]
    pub login_key: Option<String>,

    /// `LOGINKEY` of a subscribed account, used for episode bodies.
    ///
    /// Set via PIANOTE_PLUS_LOGIN_KEY environment variable. Falls back to
    /// `login_key` when unset.
    #[serde(default)]
    pub plus_login_key: Option<String>,

    /// Directory the Markdown notes are written to.
    ///
    /// Set via PIANOTE_MARKDOWN_DIR environment variable.
    #[serde(default = "default_markdown_dir")]
    pub markdown_dir: PathBuf,
}

fn default_host() -> String {
    "https://novelpia.com".into()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_markdown_dir() -> PathBuf {
    PathBuf::from("./novel/markdown")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            login_key: None,
            plus_login_key: None,
            markdown_dir: default_markdown_dir(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The configured host as a parsed URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `host` is not an http(s) URL.
    pub fn host_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.host)
            .map_err(|e| ConfigError::Invalid { field: "host".into(), reason: e.to_string() })?;

        match url.scheme() {
            "http" | "https" if url.host_str().is_some() => Ok(url),
            _ => Err(ConfigError::Invalid { field: "host".into(), reason: "must be an http(s) URL".into() }),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PIANOTE_`
    /// 2. TOML file from `PIANOTE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PIANOTE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PIANOTE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into()),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// The login key, required for the personal library page.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no login key is configured or it is blank.
    pub fn require_login_key(&self) -> Result<&str, ConfigError> {
        self.login_key.as_deref().map(str::trim).filter(|key| !key.is_empty()).ok_or_else(|| {
            ConfigError::Missing {
                field: "login_key".into(),
                hint: "Set PIANOTE_LOGIN_KEY environment variable".into(),
            }
        })
    }

    /// Key for episode body requests: the subscribed account's, else the reader's.
    pub fn viewer_login_key(&self) -> Option<&str> {
        self.plus_login_key.as_deref().or(self.login_key.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.host, "https://novelpia.com");
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.max_bytes, 5_242_880);
        assert!(config.login_key.is_none());
        assert_eq!(config.markdown_dir, PathBuf::from("./novel/markdown"));
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_host_url() {
        let config = AppConfig::default();
        let url = config.host_url().unwrap();
        assert_eq!(url.host_str(), Some("novelpia.com"));
    }

    #[test]
    fn test_host_url_rejects_other_schemes() {
        let config = AppConfig { host: "ftp://novelpia.com".into(), ..Default::default() };
        assert!(matches!(config.host_url(), Err(ConfigError::Invalid { field, .. }) if field == "host"));
    }

    #[test]
    fn test_load_env_override() {
        let original = std::env::var("PIANOTE_TIMEOUT_MS").ok();
        unsafe {
            std::env::set_var("PIANOTE_TIMEOUT_MS", "1500");
        }

        let config = AppConfig::load().unwrap();
        assert_eq!(config.timeout_ms, 1500);

        unsafe {
            match original {
                Some(value) => std::env::set_var("PIANOTE_TIMEOUT_MS", value),
                None => std::env::remove_var("PIANOTE_TIMEOUT_MS"),
            }
        }
    }

    #[test]
    fn test_require_login_key_missing() {
        let config = AppConfig::default();
        let result = config.require_login_key();
        assert!(matches!(result, Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_require_login_key_present() {
        let config = AppConfig { login_key: Some("abc".into()), ..Default::default() };
        assert_eq!(config.require_login_key().unwrap(), "abc");

        let config = AppConfig { login_key: Some("  ".into()), ..Default::default() };
        assert!(matches!(config.require_login_key(), Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_viewer_login_key_prefers_plus_account() {
        let config = AppConfig { login_key: Some("reader".into()), ..Default::default() };
        assert_eq!(config.viewer_login_key(), Some("reader"));

        let config = AppConfig { plus_login_key: Some("plus".into()), ..config };
        assert_eq!(config.viewer_login_key(), Some("plus"));
    }
}
