use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use anistream_media_providers::megaplay;
use anistream_proxy::{DEFAULT_PROXY_BASE, DEFAULT_REFERER};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub hd4: Hd4Config,
    pub proxy: ProxyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

/// HD-4 (megaplay) extractor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Hd4Config {
    /// Embed host origin, without trailing slash
    pub host: String,
    pub user_agent: String,
    /// Per-request timeout for the embed and sources calls
    pub timeout_seconds: u64,
}

impl Default for Hd4Config {
    fn default() -> Self {
        Self {
            host: megaplay::DEFAULT_HOST.to_string(),
            user_agent: megaplay::DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: megaplay::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Hd4Config {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Stream proxy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Proxy endpoint receiving `url` and `referer` query parameters
    pub base_url: String,
    /// Referer used when a stream URL cannot be parsed
    pub default_referer: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROXY_BASE.to_string(),
            default_referer: DEFAULT_REFERER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        // Load config file if provided
        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // Override with environment variables (ANISTREAM__HD4__HOST, etc.)
        builder = builder.add_source(
            Environment::with_prefix("ANISTREAM")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// Check settings that would make every resolution fail.
    ///
    /// Returns one message per problem.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        match url::Url::parse(&self.hd4.host) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            _ => errors.push(format!("hd4.host is not an http(s) URL: {:?}", self.hd4.host)),
        }
        if self.hd4.timeout_seconds == 0 {
            errors.push("hd4.timeout_seconds must be greater than 0".to_string());
        }
        if self.hd4.user_agent.trim().is_empty() {
            errors.push("hd4.user_agent must not be empty".to_string());
        }

        match url::Url::parse(&self.proxy.base_url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            _ => errors.push(format!(
                "proxy.base_url is not an http(s) URL: {:?}",
                self.proxy.base_url
            )),
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
