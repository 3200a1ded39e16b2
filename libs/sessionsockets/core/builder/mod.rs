pub mod states;

use crate::client::{SessionClient, SessionMessage};
use crate::config::{ws_base_from_http, ClientConfig, DEFAULT_API_BASE_PATH};
use crate::core::tungstenite::TungsteniteTransport;
use crate::traits::*;
use states::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::debug;

/// Where the realtime base URL comes from
#[derive(Debug, Clone)]
enum BaseUrl {
    /// Default API base path with its scheme rewritten
    Default,
    /// An HTTP API base path, rewritten to ws/wss at build time
    Api(String),
    /// A ws/wss base URL used as-is
    Realtime(String),
}

/// Type-state builder for [`SessionClient`]
///
/// `build()` only exists once both the session id and the inbound sink
/// have been supplied.
///
/// ```ignore
/// let messages = MessageBuffer::new();
/// let client = sessionsockets::builder()
///     .session_id("s1")
///     .sink(messages.clone())
///     .api_base_path("http://localhost:8000")
///     .query_param("user_id", "u1")
///     .build()?;
/// client.connect();
/// ```
pub struct SessionClientBuilder<S, K, M>
where
    S: SessionState,
    K: SinkState,
{
    _state: TypeState<S, K>,
    session_id: Option<String>,
    sink: Option<Arc<dyn MessageSink<M>>>,
    base: BaseUrl,
    query: Vec<(String, String)>,
    transport: Option<Arc<dyn Transport>>,
    reconnect_strategy: Option<Box<dyn ReconnectionStrategy>>,
    runtime: Option<Handle>,
}

impl SessionClientBuilder<NoSession, NoSink, ()> {
    /// Create a new builder instance
    pub fn new() -> Self {
        Self {
            _state: TypeState::new(),
            session_id: None,
            sink: None,
            base: BaseUrl::Default,
            query: Vec::new(),
            transport: None,
            reconnect_strategy: None,
            runtime: None,
        }
    }
}

impl Default for SessionClientBuilder<NoSession, NoSink, ()> {
    fn default() -> Self {
        Self::new()
    }
}

// Session id setting
impl<K, M> SessionClientBuilder<NoSession, K, M>
where
    K: SinkState,
{
    pub fn session_id(self, session_id: impl Into<String>) -> SessionClientBuilder<HasSession, K, M> {
        SessionClientBuilder {
            _state: TypeState::new(),
            session_id: Some(session_id.into()),
            sink: self.sink,
            base: self.base,
            query: self.query,
            transport: self.transport,
            reconnect_strategy: self.reconnect_strategy,
            runtime: self.runtime,
        }
    }
}

// Sink setting (fixes the message type)
impl<S> SessionClientBuilder<S, NoSink, ()>
where
    S: SessionState,
{
    pub fn sink<M, Snk>(self, sink: Snk) -> SessionClientBuilder<S, HasSink, M>
    where
        Snk: MessageSink<M> + 'static,
    {
        SessionClientBuilder {
            _state: TypeState::new(),
            session_id: self.session_id,
            sink: Some(Arc::new(sink)),
            base: self.base,
            query: self.query,
            transport: self.transport,
            reconnect_strategy: self.reconnect_strategy,
            runtime: self.runtime,
        }
    }
}

// Optional configuration methods
impl<S, K, M> SessionClientBuilder<S, K, M>
where
    S: SessionState,
    K: SinkState,
{
    /// Realtime base URL (ws:// or wss://), used as-is
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base = BaseUrl::Realtime(url.into());
        self
    }

    /// HTTP API base path; the realtime URL is derived by rewriting the scheme
    pub fn api_base_path(mut self, path: impl Into<String>) -> Self {
        self.base = BaseUrl::Api(path.into());
        self
    }

    /// Extra query parameter sent with every connection attempt
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn transport(mut self, transport: impl Transport) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn reconnect_strategy(mut self, strategy: impl ReconnectionStrategy + 'static) -> Self {
        self.reconnect_strategy = Some(Box::new(strategy));
        self
    }

    /// Shorthand for an unlimited [`FixedDelay`] strategy
    pub fn reconnect_delay(self, delay: Duration) -> Self {
        self.reconnect_strategy(FixedDelay::new(delay, None))
    }

    /// Runtime for reconnect timers; defaults to the current one at build time
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }
}

// Build method - only available when all required fields are set
impl<M> SessionClientBuilder<HasSession, HasSink, M>
where
    M: SessionMessage,
{
    pub fn build(self) -> Result<SessionClient<M>> {
        let session_id = self
            .session_id
            .ok_or_else(|| SessionSocketError::Configuration("session id must be set".into()))?;
        let sink = self
            .sink
            .ok_or_else(|| SessionSocketError::Configuration("sink must be set".into()))?;

        let base_url = match self.base {
            BaseUrl::Default => ws_base_from_http(DEFAULT_API_BASE_PATH)?,
            BaseUrl::Api(path) => ws_base_from_http(&path)?,
            BaseUrl::Realtime(url) => url,
        };

        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|e| {
                SessionSocketError::Configuration(format!("no tokio runtime: {}", e))
            })?,
        };

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(TungsteniteTransport::with_runtime(runtime.clone())));

        let reconnect_strategy = self
            .reconnect_strategy
            .unwrap_or_else(|| Box::new(FixedDelay::default()));

        let mut config = ClientConfig::new(session_id, base_url);
        config.query = self.query;

        debug!("Building session client for {}", config.session_id());
        SessionClient::new(config, transport, sink, reconnect_strategy, runtime)
    }
}
