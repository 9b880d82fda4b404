//! Configuration for the proxy, the form client and the chat assistant
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::aladhan::{ALADHAN_ENDPOINT, DEFAULT_METHOD};
use crate::geocode::BIGDATACLOUD_ENDPOINT;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 5000 }
    }
}

/// Prayer-times provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// Provider calculation method code
    pub method: u8,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: ALADHAN_ENDPOINT.to_string(),
            method: DEFAULT_METHOD,
        }
    }
}

/// Reverse geocoding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    pub base_url: String,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            base_url: BIGDATACLOUD_ENDPOINT.to_string(),
        }
    }
}

/// Form client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Where the proxy is listening
    pub server_url: String,
    /// Overrides the platform data directory for recent searches
    pub history_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            history_path: None,
        }
    }
}

/// Chat assistant configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub model: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter if no RUST_LOG is set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub geocode: GeocodeConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from `.env`, an optional TOML file named by
    /// `PRAYER_CONFIG`, and `PRAYER_`-prefixed environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(config_path) = std::env::var_os("PRAYER_CONFIG") {
            let path = Path::new(&config_path);
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        Self::from_figment(figment)
    }

    /// Applies the environment layers on top of `figment` and extracts.
    ///
    /// A bare `PORT` is honored for hosting platforms that set it; the
    /// prefixed `PRAYER_SERVER__PORT` wins over it.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Config = figment
            .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()))
            .merge(Env::prefixed("PRAYER_").split("__"))
            .extract()
            .map_err(|e| ConfigError::LoadError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue(
                "server.port must be non-zero".to_string(),
            ));
        }

        for (name, url) in [
            ("upstream.base_url", &self.upstream.base_url),
            ("geocode.base_url", &self.geocode.base_url),
            ("client.server_url", &self.client.server_url),
        ] {
            if url.trim().is_empty() {
                return Err(ConfigError::MissingConfig(format!("{name} is required")));
            }
        }

        Ok(())
    }
}
