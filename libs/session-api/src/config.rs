use sessionsockets::{ws_base_from_http, DEFAULT_API_BASE_PATH};
use tracing::info;

/// Environment variable overriding the API base path
pub const BASE_PATH_ENV: &str = "SESSION_API_BASE_PATH";

/// Process-wide API location
///
/// Build one at startup and pass it to whatever needs the base path; the
/// REST client and the session socket both derive their URLs from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_path: String,
}

impl ApiConfig {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into().trim_end_matches('/').to_string(),
        }
    }

    /// Default base path, overridden by `SESSION_API_BASE_PATH` if set
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ApiConfig::from_env`] with a custom variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(BASE_PATH_ENV).filter(|value| !value.trim().is_empty()) {
            Some(base_path) => {
                info!("Overriding API base path from {}", BASE_PATH_ENV);
                Self::new(base_path.trim())
            }
            None => Self::default(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Realtime base for the session socket (http→ws, https→wss)
    pub fn ws_base(&self) -> sessionsockets::Result<String> {
        ws_base_from_http(&self.base_path)
    }

    /// Absolute URL of a REST endpoint
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_path, path.trim_start_matches('/'))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_PATH)
    }
}
