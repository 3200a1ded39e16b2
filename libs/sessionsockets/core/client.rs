use crate::config::ClientConfig;
use crate::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionStatus};
use crate::queue::OutboundQueue;
use crate::timer::{ReconnectTimer, TimerId};
use crate::traits::transport::SocketEventHandler;
use crate::traits::*;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// What happened to a message handed to [`SessionClient::send`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Written to the open socket
    Sent,
    /// Held in the outbound queue until the next flush
    Queued,
}

/// Client metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metrics {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub reconnect_count: u64,
    pub parse_failures: u64,
    pub queue_len: usize,
    pub status: Option<ConnectionStatus>,
}

/// Bounds every session message type satisfies
pub trait SessionMessage: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<M> SessionMessage for M where M: Serialize + DeserializeOwned + Send + Sync + 'static {}

/// Reconnecting session client
///
/// Keeps one socket to `{base}/ws/session?session_id=...`, re-dials after
/// every close, queues outbound messages while the socket is not open and
/// appends inbound batches to the caller's sink.
///
/// Cloning is cheap and every clone drives the same connection. All
/// lifecycle handlers run to completion under one lock, so events are
/// processed strictly one after another.
///
/// Build one with [`crate::builder`].
pub struct SessionClient<M: SessionMessage> {
    shared: Arc<Shared<M>>,
}

impl<M: SessionMessage> Clone for SessionClient<M> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<M: SessionMessage> {
    config: ClientConfig,
    endpoint: String,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn MessageSink<M>>,
    runtime: Handle,
    state: AtomicConnectionState,
    status_tx: watch::Sender<Option<ConnectionStatus>>,
    metrics: AtomicMetrics,
    inner: Mutex<Inner<M>>,
    self_ref: Weak<Shared<M>>,
}

struct Inner<M> {
    socket: Option<AttachedSocket>,
    queue: OutboundQueue<M>,
    timer: ReconnectTimer,
    strategy: Box<dyn ReconnectionStrategy>,
    reconnect_attempt: usize,
    next_socket_id: SocketId,
}

struct AttachedSocket {
    id: SocketId,
    socket: Box<dyn Socket>,
}

impl<M: SessionMessage> SessionClient<M> {
    pub(crate) fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn MessageSink<M>>,
        strategy: Box<dyn ReconnectionStrategy>,
        runtime: Handle,
    ) -> Result<Self> {
        config.validate()?;
        let endpoint = config.endpoint_url()?;
        let (status_tx, _) = watch::channel(None);

        let shared = Arc::new_cyclic(|self_ref| Shared {
            config,
            endpoint,
            transport,
            sink,
            runtime,
            state: AtomicConnectionState::new(None),
            status_tx,
            metrics: AtomicMetrics::new(),
            inner: Mutex::new(Inner {
                socket: None,
                queue: OutboundQueue::new(),
                timer: ReconnectTimer::new(),
                strategy,
                reconnect_attempt: 0,
                next_socket_id: 1,
            }),
            self_ref: self_ref.clone(),
        });

        Ok(Self { shared })
    }

    /// Tear down any socket or pending reconnect and open a fresh socket
    ///
    /// Safe to call at any time, including while connected or while a
    /// reconnect is pending; both are reset.
    pub fn connect(&self) {
        let mut inner = self.shared.inner.lock();
        self.shared.connect_locked(&mut inner);
    }

    /// Stop the session: cancel any pending reconnect, then close the socket
    ///
    /// No automatic reconnect happens afterwards; call [`connect`] to resume.
    /// Queued messages are kept.
    ///
    /// [`connect`]: SessionClient::connect
    pub fn disconnect(&self) {
        let mut inner = self.shared.inner.lock();
        self.shared.cleanup_locked(&mut inner);
        self.shared.clear_status();
        info!("Session {} disconnected", self.shared.config.session_id);
    }

    /// True iff status is connected, a socket is attached and it is open
    pub fn is_connected(&self) -> bool {
        let inner = self.shared.inner.lock();
        self.shared.is_connected_locked(&inner)
    }

    /// Send now if connected, otherwise queue
    ///
    /// A delivery or serialization failure also queues the message; it is
    /// never dropped and never reported as an error.
    pub fn send(&self, message: M) -> SendOutcome {
        let mut inner = self.shared.inner.lock();

        if !self.shared.is_connected_locked(&inner) {
            inner.queue.push_back(message);
            debug!("Not connected, queued message ({} pending)", inner.queue.len());
            return SendOutcome::Queued;
        }

        match self.shared.deliver_locked(&mut inner, &message) {
            Ok(()) => SendOutcome::Sent,
            Err(e) => {
                warn!("Send failed, queueing message: {}", e);
                inner.queue.push_back(message);
                SendOutcome::Queued
            }
        }
    }

    /// Deliver queued messages in order while connected
    ///
    /// Stops at the first failure, leaving that message at the head.
    /// Returns the number delivered; 0 when not connected.
    pub fn flush_queue(&self) -> usize {
        let mut inner = self.shared.inner.lock();
        self.shared.flush_locked(&mut inner)
    }

    /// Drop all queued messages without sending them
    pub fn clear_queue(&self) -> usize {
        let removed = self.shared.inner.lock().queue.clear();
        if removed > 0 {
            info!("Cleared {} queued messages", removed);
        }
        removed
    }

    pub fn queue_len(&self) -> usize {
        self.shared.inner.lock().queue.len()
    }

    /// Empty the inbound sink
    pub fn clear_messages(&self) {
        self.shared.sink.clear();
    }

    /// Sink receiving inbound batches
    pub fn sink(&self) -> &Arc<dyn MessageSink<M>> {
        &self.shared.sink
    }

    /// Current status; `None` before the first `connect()` and after `disconnect()`
    pub fn status(&self) -> Option<ConnectionStatus> {
        self.shared.state.get()
    }

    /// Observe status changes
    pub fn watch_status(&self) -> watch::Receiver<Option<ConnectionStatus>> {
        self.shared.status_tx.subscribe()
    }

    /// Whether a reconnect is scheduled
    pub fn reconnect_pending(&self) -> bool {
        self.shared.inner.lock().timer.is_pending()
    }

    pub fn session_id(&self) -> &str {
        self.shared.config.session_id()
    }

    /// URL every connection attempt dials
    pub fn endpoint(&self) -> &str {
        &self.shared.endpoint
    }

    pub fn config(&self) -> &ClientConfig {
        &self.shared.config
    }

    pub fn metrics(&self) -> Metrics {
        let queue_len = self.queue_len();
        let metrics = &self.shared.metrics;
        Metrics {
            messages_sent: metrics.messages_sent(),
            messages_received: metrics.messages_received(),
            reconnect_count: metrics.reconnect_count(),
            parse_failures: metrics.parse_failures(),
            queue_len,
            status: self.shared.state.get(),
        }
    }
}

impl<M: SessionMessage> Shared<M> {
    fn set_status(&self, status: ConnectionStatus) {
        self.state.set(status);
        self.status_tx.send_replace(Some(status));
    }

    fn clear_status(&self) {
        self.state.clear();
        self.status_tx.send_replace(None);
    }

    fn is_connected_locked(&self, inner: &Inner<M>) -> bool {
        self.state.is_connected()
            && inner
                .socket
                .as_ref()
                .map_or(false, |attached| attached.socket.is_open())
    }

    /// Cancel the timer before closing, so a woken timer cannot re-dial
    fn cleanup_locked(&self, inner: &mut Inner<M>) {
        inner.timer.cancel();
        if let Some(mut attached) = inner.socket.take() {
            debug!("Closing socket {}", attached.id);
            attached.socket.close();
        }
    }

    fn connect_locked(&self, inner: &mut Inner<M>) {
        self.cleanup_locked(inner);
        self.set_status(ConnectionStatus::Connecting);

        let id = inner.next_socket_id;
        inner.next_socket_id += 1;

        let handler: Weak<dyn SocketEventHandler> = self.self_ref.clone();
        let events = SocketEvents::new(id, handler);

        info!("Connecting to {} (socket {})", self.endpoint, id);
        match self.transport.open(&self.endpoint, events) {
            Ok(socket) => {
                inner.socket = Some(AttachedSocket { id, socket });
            }
            Err(e) => {
                error!("Failed to open socket: {}", e);
                self.on_closed_locked(inner);
            }
        }
    }

    fn deliver_locked(&self, inner: &mut Inner<M>, message: &M) -> Result<()> {
        let frame = encode_frame(message)?;
        let attached = inner.socket.as_mut().ok_or(SessionSocketError::NotConnected)?;
        attached.socket.send(frame)?;
        self.metrics.increment_sent();
        Ok(())
    }

    fn flush_locked(&self, inner: &mut Inner<M>) -> usize {
        let mut sent = 0;

        while self.is_connected_locked(inner) {
            let Some(message) = inner.queue.pop_front() else {
                break;
            };
            match self.deliver_locked(inner, &message) {
                Ok(()) => sent += 1,
                Err(e) => {
                    warn!("Flush stopped after {} messages: {}", sent, e);
                    inner.queue.push_front(message);
                    break;
                }
            }
        }

        if sent > 0 {
            info!("Flushed {} queued messages ({} remaining)", sent, inner.queue.len());
        }
        sent
    }

    fn on_open_locked(&self, inner: &mut Inner<M>) {
        info!("Session {} connected", self.config.session_id);
        self.set_status(ConnectionStatus::Connected);
        inner.reconnect_attempt = 0;
        inner.strategy.reset();
        self.flush_locked(inner);
    }

    fn on_message_locked(&self, frame: WsMessage) {
        match decode_batch::<M>(&frame) {
            Ok(batch) => {
                debug!("Received batch of {} messages", batch.len());
                self.metrics.add_received(batch.len() as u64);
                self.sink.append(batch);
            }
            Err(e) => {
                self.metrics.increment_parse_failures();
                warn!("Dropping inbound frame: {}", e);
            }
        }
    }

    fn on_closed_locked(&self, inner: &mut Inner<M>) {
        inner.socket = None;
        self.set_status(ConnectionStatus::Disconnected);
        self.schedule_reconnect_locked(inner);
    }

    fn on_error_locked(&self, inner: &mut Inner<M>, reason: &str) {
        error!("Socket error: {}", reason);
        self.set_status(ConnectionStatus::Error);
        // The socket stays attached so its Close event is still handled
        if let Some(attached) = inner.socket.as_mut() {
            attached.socket.close();
        }
    }

    fn schedule_reconnect_locked(&self, inner: &mut Inner<M>) {
        let attempt = inner.reconnect_attempt;
        let Some(delay) = inner.strategy.next_delay(attempt) else {
            warn!("Reconnection strategy exhausted after {} attempts, staying disconnected", attempt);
            return;
        };
        inner.reconnect_attempt += 1;

        let weak = self.self_ref.clone();
        inner.timer.schedule(&self.runtime, delay, move |timer_id| {
            if let Some(shared) = weak.upgrade() {
                shared.fire_reconnect(timer_id);
            }
        });
        info!("Reconnecting in {:?} (attempt {})", delay, attempt + 1);
    }

    fn fire_reconnect(&self, timer_id: TimerId) {
        let mut inner = self.inner.lock();
        if !inner.timer.take_if_current(timer_id) {
            debug!("Ignoring stale reconnect timer {}", timer_id);
            return;
        }
        self.metrics.increment_reconnects();
        self.connect_locked(&mut inner);
    }
}

impl<M: SessionMessage> SocketEventHandler for Shared<M> {
    fn on_socket_event(&self, id: SocketId, event: SocketEvent) {
        let mut inner = self.inner.lock();

        let attached = inner.socket.as_ref().map(|attached| attached.id);
        if attached != Some(id) {
            debug!("Ignoring {:?} from detached socket {}", event, id);
            return;
        }

        match event {
            SocketEvent::Open => self.on_open_locked(&mut inner),
            SocketEvent::Message(frame) => self.on_message_locked(frame),
            SocketEvent::Close => {
                info!("Socket {} closed", id);
                self.on_closed_locked(&mut inner);
            }
            SocketEvent::Error(reason) => self.on_error_locked(&mut inner, &reason),
        }
    }
}

impl<M> Drop for Inner<M> {
    fn drop(&mut self) {
        self.timer.cancel();
        if let Some(mut attached) = self.socket.take() {
            attached.socket.close();
        }
    }
}
