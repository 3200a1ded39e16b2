//! CLI utilities for binaries
//!
//! Handles configuration path lookup and argument parsing.

use std::path::PathBuf;

/// Type of configuration to load
#[derive(Debug, Clone)]
pub enum ConfigType {
    /// Session client configuration (config/session_client.yaml)
    Client,
    /// Custom path
    Custom(String),
}

impl ConfigType {
    /// Get the default path for this config type
    pub fn default_path(&self) -> &str {
        match self {
            ConfigType::Client => "config/session_client.yaml",
            ConfigType::Custom(path) => path,
        }
    }

    /// Get the environment variable name for this config type
    pub fn env_var_name(&self) -> &str {
        match self {
            ConfigType::Client => "SESSION_CONFIG_PATH",
            ConfigType::Custom(_) => "SESSION_CONFIG_PATH",
        }
    }
}

/// Load configuration path from environment or use default
///
/// # Examples
/// ```
/// use session_client::bin_common::{load_config_from_env, ConfigType};
///
/// let path = load_config_from_env(ConfigType::Client);
/// ```
pub fn load_config_from_env(config_type: ConfigType) -> PathBuf {
    std::env::var(config_type.env_var_name())
        .unwrap_or_else(|_| config_type.default_path().to_string())
        .into()
}

/// Command line arguments, excluding the program name
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}
