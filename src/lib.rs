//! Session Client - Main Library
//!
//! Ties the realtime session socket and the session REST API together for
//! the binaries in this package.
//!
//! ## Layout
//!
//! - **sessionsockets**: reconnecting message-queue client (re-exported from workspace)
//! - **session_api**: base path configuration and REST client (re-exported from workspace)
//! - **bin_common**: config loading, logging and runner helpers for binaries
//!
//! ## Usage in Binaries
//!
//! ```rust,no_run
//! use session_client::bin_common::{load_config_from_env, ConfigType, SessionClientConfig};
//!
//! let path = load_config_from_env(ConfigType::Client);
//! let config = SessionClientConfig::load(&path).unwrap();
//! ```

// Re-export workspace libraries for convenience
pub use session_api;
pub use sessionsockets;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod config;
    pub mod logging;
    pub mod runner;

    pub use cli::{load_config_from_env, parse_args, ConfigType};
    pub use config::{ConfigError, SessionClientConfig};
    pub use logging::init_tracing_with_level;
    pub use runner::{BinaryRunner, RunConfig};
}
