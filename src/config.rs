//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.
//!
//! The REST base URL can also be baked in at build time: when
//! `INVOICEDESK_API_URL` is set while compiling, it becomes the default.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the REST API base URL
pub const API_URL_ENV: &str = "INVOICEDESK_API_URL";

const FALLBACK_API_URL: &str = "http://localhost:8000";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// REST API client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// Per-request timeout. Unset means requests wait indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_api_url() -> String {
    option_env!("INVOICEDESK_API_URL")
        .unwrap_or(FALLBACK_API_URL)
        .to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            request_timeout_secs: None,
        }
    }
}

/// Chat channel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_url")]
    pub url: String,
}

fn default_chat_url() -> String {
    "ws://localhost:8000/ws/chat/".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            url: default_chat_url(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let (config, failures) = Self::discover();
        for e in failures {
            tracing::warn!(error = %e, "Ignoring config file");
        }
        config
    }

    /// Default config file locations, in search order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("invoicedesk").join("config.toml")),
            Some(PathBuf::from("./invoicedesk.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Like [`Config::load_default`], but hands back the files that exist and
    /// failed to load instead of logging them.
    ///
    /// Use this before the tracing subscriber is installed.
    pub fn discover() -> (Self, Vec<ConfigError>) {
        Self::load_first(&Self::default_paths())
    }

    /// Load the first existing file in `paths` that parses
    fn load_first(paths: &[PathBuf]) -> (Self, Vec<ConfigError>) {
        let mut failures = Vec::new();

        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => {
                    tracing::info!("Loaded config from {:?}", path);
                    return (config, failures);
                }
                Err(e) => failures.push(e),
            }
        }

        tracing::debug!("Using default config with environment overrides");
        (Self::from_env(), failures)
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV) {
            self.api.base_url = url;
        }
        if let Some(secs) = lookup("INVOICEDESK_REQUEST_TIMEOUT_SECS") {
            match secs.parse() {
                Ok(s) => self.api.request_timeout_secs = Some(s),
                Err(_) => tracing::warn!(value = %secs, "Ignoring invalid request timeout"),
            }
        }

        if let Some(url) = lookup("INVOICEDESK_CHAT_URL") {
            self.chat.url = url;
        }

        if let Some(level) = lookup("INVOICEDESK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("INVOICEDESK_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    format!(
        r#"# Invoicedesk Configuration
#
# Environment variables override these settings:
# - INVOICEDESK_API_URL
# - INVOICEDESK_REQUEST_TIMEOUT_SECS
# - INVOICEDESK_CHAT_URL
# - INVOICEDESK_LOG_LEVEL
# - INVOICEDESK_LOG_FORMAT

[api]
# Base URL of the REST API serving /products/ and /invoices/
base_url = "{api_url}"

# Request timeout in seconds (unset: no timeout)
# request_timeout_secs = 30

[chat]
# WebSocket endpoint of the chat assistant
url = "{chat_url}"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#,
        api_url = default_api_url(),
        chat_url = default_chat_url(),
    )
}
