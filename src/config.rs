//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::gateway::http::HttpGatewayConfig;
use crate::live::BoostConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub stream: StreamConfig,

    #[serde(default)]
    pub live: LiveConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// REST API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://ponyracer.ninja-squad.com".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl From<&ApiConfig> for HttpGatewayConfig {
    fn from(config: &ApiConfig) -> Self {
        HttpGatewayConfig {
            base_url: config.base_url.clone(),
            request_timeout_secs: config.request_timeout_secs,
        }
    }
}

/// Live channel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    #[serde(default = "default_ws_url")]
    pub url: String,
}

fn default_ws_url() -> String {
    "wss://ponyracer.ninja-squad.com/ws".to_string()
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: default_ws_url(),
        }
    }
}

/// Boost gesture thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct LiveConfig {
    #[serde(default = "default_boost_clicks")]
    pub boost_clicks: usize,

    #[serde(default = "default_boost_window")]
    pub boost_window_ms: i64,
}

fn default_boost_clicks() -> usize {
    5
}

fn default_boost_window() -> i64 {
    1000
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            boost_clicks: default_boost_clicks(),
            boost_window_ms: default_boost_window(),
        }
    }
}

impl LiveConfig {
    pub fn boost(&self) -> BoostConfig {
        BoostConfig {
            clicks: self.boost_clicks,
            window_ms: self.boost_window_ms,
        }
    }
}

/// Remembered session configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// Where the logged-in user is remembered
    pub file: Option<String>,
}

impl SessionConfig {
    /// Configured file, or `<data dir>/ponyracer/remember_me.json`
    pub fn path(&self) -> PathBuf {
        match &self.file {
            Some(file) => PathBuf::from(file),
            None => dirs::data_local_dir()
                .map(|p| p.join("ponyracer"))
                .unwrap_or_else(|| PathBuf::from("./ponyracer_data"))
                .join("remember_me.json"),
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
    "info".to_string()
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

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
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
        let config_paths = [
            dirs::config_dir().map(|p| p.join("ponyracer").join("config.toml")),
            Some(PathBuf::from("./ponyracer.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("PONYRACER_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(url) = std::env::var("PONYRACER_WS_URL") {
            self.stream.url = url;
        }
        if let Ok(file) = std::env::var("PONYRACER_SESSION_FILE") {
            self.session.file = Some(file);
        }
        if let Ok(level) = std::env::var("PONYRACER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("PONYRACER_LOG_FORMAT") {
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
    r#"# Ponyracer Configuration
#
# Environment variables override these settings:
# - PONYRACER_API_URL
# - PONYRACER_WS_URL
# - PONYRACER_SESSION_FILE
# - PONYRACER_LOG_LEVEL
# - PONYRACER_LOG_FORMAT

[api]
# Ponyracer REST API
base_url = "https://ponyracer.ninja-squad.com"

# Request timeout in seconds
request_timeout_secs = 30

[stream]
# STOMP-over-WebSocket endpoint for live races
url = "wss://ponyracer.ninja-squad.com/ws"

[live]
# Clicks on the same pony needed to boost it
boost_clicks = 5

# ...all within this many milliseconds
boost_window_ms = 1000

[session]
# Where the logged-in user is remembered
# file = "~/.local/share/ponyracer/remember_me.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json
format = "pretty"
"#
    .to_string()
}
