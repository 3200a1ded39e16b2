//! Session client configuration

use serde::{Deserialize, Serialize};
use session_api::{ApiConfig, BASE_PATH_ENV};
use sessionsockets::DEFAULT_API_BASE_PATH;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration shared by the session binaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClientConfig {
    /// HTTP(S) base path of the session service
    #[serde(default = "default_api_base_path")]
    pub api_base_path: String,
    /// Sent as `user_id` on the session socket when set
    #[serde(default)]
    pub user_id: Option<String>,
    /// Delay between reconnect attempts
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_base_path() -> String {
    DEFAULT_API_BASE_PATH.to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SessionClientConfig {
    fn default() -> Self {
        Self {
            api_base_path: default_api_base_path(),
            user_id: None,
            reconnect_delay_ms: default_reconnect_delay_ms(),
            log_level: default_log_level(),
        }
    }
}

impl SessionClientConfig {
    /// Load configuration from YAML file, then apply environment overrides
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        dotenv::dotenv().ok(); // Don't fail if .env doesn't exist
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`SessionClientConfig::load`] with a custom variable lookup
    pub fn load_with_env(
        config_path: impl AsRef<Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let config: SessionClientConfig = serde_yaml::from_str(&yaml_content)?;
        config.with_env_overrides(lookup)
    }

    /// Load the YAML file if it exists, else start from defaults
    ///
    /// `.env` and the environment overrides apply either way.
    pub fn from_env_or_default(config_path: impl AsRef<Path>) -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_env_or_default_with(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`SessionClientConfig::from_env_or_default`] with a custom variable lookup
    pub fn from_env_or_default_with(
        config_path: impl AsRef<Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let config_path = config_path.as_ref();
        if config_path.exists() {
            return Self::load_with_env(config_path, lookup);
        }

        info!("No config file at {}, using defaults", config_path.display());
        Self::default().with_env_overrides(lookup)
    }

    fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(base_path) = lookup(BASE_PATH_ENV) {
            info!("Overriding API base path from environment variable");
            self.api_base_path = base_path;
        }

        self.validate()?;

        Ok(self)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.api_base_path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api_base_path must not be empty".to_string(),
            ));
        }

        if self.reconnect_delay_ms == 0 {
            return Err(ConfigError::ValidationError(
                "reconnect_delay_ms must be greater than 0".to_string(),
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(self.api_base_path.trim())
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  API base path: {}", self.api_base_path);
        info!("  User id: {}", self.user_id.as_deref().unwrap_or("-"));
        info!("  Reconnect delay: {} ms", self.reconnect_delay_ms);
        info!("  Log level: {}", self.log_level);
    }
}
