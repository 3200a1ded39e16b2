//! Common test utilities for SessionSockets integration tests
//!
//! - [`MockTransport`]: scripted sockets whose lifecycle the test drives by hand
//! - [`MockWsServer`]: a real local WebSocket server for end-to-end tests

#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use sessionsockets::{Result, SessionSocketError, Socket, SocketEvents, Transport, WsMessage};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Notify};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

// ============================================================================
// Scripted transport
// ============================================================================

#[derive(Debug, Default)]
struct SocketState {
    open: bool,
    closed: bool,
    sent: Vec<String>,
    /// Number of further sends that succeed before every send fails
    sends_allowed: Option<usize>,
}

/// Transport that hands out sockets the test opens, feeds and closes
#[derive(Clone, Default)]
pub struct MockTransport {
    sockets: Arc<Mutex<Vec<MockSocketHandle>>>,
    fail_open: Arc<Mutex<bool>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of connection attempts made so far
    pub fn open_count(&self) -> usize {
        self.sockets.lock().len()
    }

    /// Handle for the n-th socket (0-based)
    pub fn socket(&self, index: usize) -> MockSocketHandle {
        self.sockets.lock()[index].clone()
    }

    /// Handle for the most recent socket
    pub fn last(&self) -> MockSocketHandle {
        self.sockets
            .lock()
            .last()
            .cloned()
            .expect("no socket opened yet")
    }

    /// Make the next `open` calls fail synchronously
    pub fn set_fail_open(&self, fail: bool) {
        *self.fail_open.lock() = fail;
    }
}

impl Transport for MockTransport {
    fn open(&self, url: &str, events: SocketEvents) -> Result<Box<dyn Socket>> {
        if *self.fail_open.lock() {
            return Err(SessionSocketError::WebSocket("connection refused".into()));
        }

        let state = Arc::new(Mutex::new(SocketState::default()));
        self.sockets.lock().push(MockSocketHandle {
            url: url.to_string(),
            events,
            state: Arc::clone(&state),
        });
        Ok(Box::new(MockSocket { state }))
    }
}

struct MockSocket {
    state: Arc<Mutex<SocketState>>,
}

impl Socket for MockSocket {
    fn is_open(&self) -> bool {
        let state = self.state.lock();
        state.open && !state.closed
    }

    fn send(&mut self, frame: WsMessage) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(remaining) = state.sends_allowed.as_mut() {
            if *remaining == 0 {
                return Err(SessionSocketError::WebSocket("injected send failure".into()));
            }
            *remaining -= 1;
        }
        let text = frame.as_text().unwrap_or_default().to_string();
        state.sent.push(text);
        Ok(())
    }

    fn close(&mut self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.open = false;
    }
}

/// Test-side view of one scripted socket
#[derive(Clone)]
pub struct MockSocketHandle {
    pub url: String,
    events: SocketEvents,
    state: Arc<Mutex<SocketState>>,
}

impl MockSocketHandle {
    /// Finish the handshake and report `Open`
    pub fn open(&self) {
        self.state.lock().open = true;
        self.events.opened();
    }

    /// Deliver a text frame from the server
    pub fn deliver(&self, text: &str) {
        self.events.message(WsMessage::Text(text.to_string()));
    }

    /// Report `Close` (server hung up, or the forced close completed)
    pub fn close(&self) {
        {
            let mut state = self.state.lock();
            state.open = false;
            state.closed = true;
        }
        self.events.closed();
    }

    /// Report a transport error
    pub fn error(&self, reason: &str) {
        self.events.error(reason);
    }

    /// Socket stays attached but stops reporting ready
    pub fn go_stale(&self) {
        self.state.lock().open = false;
    }

    /// Let `n` more sends through, then fail every send
    pub fn fail_sends_after(&self, n: usize) {
        self.state.lock().sends_allowed = Some(n);
    }

    pub fn allow_sends(&self) {
        self.state.lock().sends_allowed = None;
    }

    pub fn sent(&self) -> Vec<String> {
        self.state.lock().sent.clone()
    }

    /// Whether the client asked this socket to close
    pub fn close_requested(&self) -> bool {
        self.state.lock().closed
    }
}

// ============================================================================
// Local WebSocket server
// ============================================================================

#[derive(Debug, Clone)]
enum ServerCommand {
    Send(String),
    DropAll,
}

/// A scripted WebSocket server for end-to-end tests
///
/// Records every text frame and request URI it sees; the test pushes
/// frames to all live connections or drops them.
pub struct MockWsServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
    commands: broadcast::Sender<ServerCommand>,
    received: Arc<Mutex<Vec<String>>>,
    request_uris: Arc<Mutex<Vec<String>>>,
    accepted: Arc<AtomicUsize>,
}

impl MockWsServer {
    /// Create and start a new mock WebSocket server
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let (commands, _) = broadcast::channel(64);
        let received = Arc::new(Mutex::new(Vec::new()));
        let request_uris = Arc::new(Mutex::new(Vec::new()));
        let accepted = Arc::new(AtomicUsize::new(0));

        {
            let shutdown = Arc::clone(&shutdown);
            let commands = commands.clone();
            let received = Arc::clone(&received);
            let request_uris = Arc::clone(&request_uris);
            let accepted = Arc::clone(&accepted);

            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        result = listener.accept() => {
                            match result {
                                Ok((stream, _)) => {
                                    let connection = Connection {
                                        shutdown: Arc::clone(&shutdown),
                                        commands: commands.subscribe(),
                                        received: Arc::clone(&received),
                                        request_uris: Arc::clone(&request_uris),
                                        accepted: Arc::clone(&accepted),
                                    };
                                    tokio::spawn(connection.run(stream));
                                }
                                Err(e) => {
                                    eprintln!("Accept error: {}", e);
                                    break;
                                }
                            }
                        }
                        _ = shutdown.notified() => break,
                    }
                }
            });
        }

        Self {
            addr,
            shutdown,
            commands,
            received,
            request_uris,
            accepted,
        }
    }

    /// Base URL for the session client (`ws://127.0.0.1:port`)
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Send a text frame to every live connection
    pub fn push(&self, text: &str) {
        let _ = self.commands.send(ServerCommand::Send(text.to_string()));
    }

    /// Close every live connection
    pub fn drop_connections(&self) {
        let _ = self.commands.send(ServerCommand::DropAll);
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    pub fn request_uris(&self) -> Vec<String> {
        self.request_uris.lock().clone()
    }

    /// Number of completed handshakes
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockWsServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Connection {
    shutdown: Arc<Notify>,
    commands: broadcast::Receiver<ServerCommand>,
    received: Arc<Mutex<Vec<String>>>,
    request_uris: Arc<Mutex<Vec<String>>>,
    accepted: Arc<AtomicUsize>,
}

impl Connection {
    async fn run(mut self, stream: tokio::net::TcpStream) {
        let uris = Arc::clone(&self.request_uris);
        let callback = move |request: &Request,
                             response: Response|
              -> std::result::Result<Response, ErrorResponse> {
            uris.lock().push(request.uri().to_string());
            Ok(response)
        };

        let ws_stream = match tokio_tungstenite::accept_hdr_async(stream, callback).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };
        self.accepted.fetch_add(1, Ordering::SeqCst);

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => self.received.lock().push(text),
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        Some(Ok(_)) => {}
                    }
                }
                cmd = self.commands.recv() => {
                    match cmd {
                        Ok(ServerCommand::Send(text)) => {
                            if write.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                        Ok(ServerCommand::DropAll) => {
                            let _ = write.send(Message::Close(None)).await;
                            break;
                        }
                        Err(_) => break,
                    }
                }
                _ = self.shutdown.notified() => break,
            }
        }
    }
}

/// Poll `condition` every 10ms until it holds or `timeout` passes
pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
