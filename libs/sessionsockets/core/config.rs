use crate::traits::*;
use url::Url;

/// Base path of the session API when nothing overrides it
pub const DEFAULT_API_BASE_PATH: &str = "https://api.humangpt.dev";

/// Path of the realtime session endpoint, relative to the base URL
pub const SESSION_ENDPOINT_PATH: &str = "/ws/session";

/// Rewrite an HTTP base path to its WebSocket equivalent
///
/// `http` becomes `ws`, `https` becomes `wss`; `ws`/`wss` pass through.
/// The result has no trailing slash.
pub fn ws_base_from_http(base: &str) -> Result<String> {
    let mut url = Url::parse(base)?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(SessionSocketError::Configuration(format!(
                "unsupported scheme '{}' in base path {}",
                other, base
            )))
        }
    };
    url.set_scheme(scheme).map_err(|_| {
        SessionSocketError::Configuration(format!("cannot rewrite scheme of {}", base))
    })?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Immutable identity of a session client
///
/// Fixed at construction: the session to join and where to find it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Session the client joins
    pub(crate) session_id: String,

    /// Realtime base URL (ws:// or wss://), without trailing slash
    pub(crate) base_url: String,

    /// Endpoint path appended to the base URL
    pub(crate) endpoint_path: String,

    /// Extra query parameters sent after `session_id`
    pub(crate) query: Vec<(String, String)>,
}

impl ClientConfig {
    pub fn new(session_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            endpoint_path: SESSION_ENDPOINT_PATH.to_string(),
            query: Vec::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full connection URL: `{base}/ws/session?session_id={id}[&extra]`
    pub fn endpoint_url(&self) -> Result<String> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, self.endpoint_path))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("session_id", &self.session_id);
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url.into())
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.session_id.is_empty() {
            return Err(SessionSocketError::Configuration(
                "session_id cannot be empty".to_string(),
            ));
        }
        match Url::parse(&self.base_url)?.scheme() {
            "ws" | "wss" => Ok(()),
            other => Err(SessionSocketError::Configuration(format!(
                "base URL must use ws or wss, got '{}'",
                other
            ))),
        }
    }
}
