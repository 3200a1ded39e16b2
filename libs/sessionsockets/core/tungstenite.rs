//! WebSocket transport backed by tokio-tungstenite
//!
//! Each socket is one tokio task owning the stream:
//!
//! ```text
//! Socket::send ──> unbounded channel ──> writer half ──> server
//! server ──> reader half ──> SocketEvents (Message / Error / Close)
//! ```

use crate::traits::*;
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// Default transport used by the session client
#[derive(Debug, Default, Clone)]
pub struct TungsteniteTransport {
    runtime: Option<Handle>,
}

impl TungsteniteTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn socket tasks on a specific runtime instead of the current one
    pub fn with_runtime(runtime: Handle) -> Self {
        Self {
            runtime: Some(runtime),
        }
    }
}

impl Transport for TungsteniteTransport {
    fn open(&self, url: &str, events: SocketEvents) -> Result<Box<dyn Socket>> {
        let runtime = match &self.runtime {
            Some(handle) => handle.clone(),
            None => Handle::try_current()
                .map_err(|e| SessionSocketError::Configuration(format!("no tokio runtime: {}", e)))?,
        };

        let open = Arc::new(AtomicBool::new(false));
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();

        runtime.spawn(run_socket(
            url.to_string(),
            events,
            Arc::clone(&open),
            outgoing_rx,
        ));

        Ok(Box::new(TungsteniteSocket {
            open,
            outgoing_tx,
            closed: false,
        }))
    }
}

enum Outgoing {
    Frame(Message),
    Close,
}

struct TungsteniteSocket {
    open: Arc<AtomicBool>,
    outgoing_tx: mpsc::UnboundedSender<Outgoing>,
    closed: bool,
}

impl Socket for TungsteniteSocket {
    fn is_open(&self) -> bool {
        !self.closed && self.open.load(Ordering::Acquire)
    }

    fn send(&mut self, frame: WsMessage) -> Result<()> {
        if !self.is_open() {
            return Err(SessionSocketError::NotConnected);
        }
        self.outgoing_tx
            .send(Outgoing::Frame(ws_message_to_tungstenite(frame)))
            .map_err(|_| SessionSocketError::ConnectionClosed("socket task has exited".into()))
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            let _ = self.outgoing_tx.send(Outgoing::Close);
        }
    }
}

impl Drop for TungsteniteSocket {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run_socket(
    url: String,
    events: SocketEvents,
    open: Arc<AtomicBool>,
    mut outgoing_rx: mpsc::UnboundedReceiver<Outgoing>,
) {
    debug!("Socket {} connecting to {}", events.id(), url);

    let ws_stream = tokio::select! {
        result = connect_async(url.as_str()) => match result {
            Ok((ws_stream, _)) => ws_stream,
            Err(e) => {
                error!("Failed to connect: {}", e);
                events.error(e.to_string());
                events.closed();
                return;
            }
        },
        // Closed before the handshake finished
        _ = wait_for_close(&mut outgoing_rx) => {
            debug!("Socket {} closed during handshake", events.id());
            events.closed();
            return;
        }
    };

    info!("Connected to {}", url);
    let (mut write, mut read) = ws_stream.split();
    open.store(true, Ordering::Release);
    events.opened();

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(msg)) => {
                        if let Some(frame) = tungstenite_to_ws_message(msg) {
                            events.message(frame);
                        }
                    }
                    Some(Err(e)) => {
                        error!("WebSocket error: {}", e);
                        events.error(e.to_string());
                        break;
                    }
                    None => {
                        warn!("WebSocket stream closed");
                        break;
                    }
                }
            }

            out = outgoing_rx.recv() => {
                match out {
                    Some(Outgoing::Frame(msg)) => {
                        if let Err(e) = write.send(msg).await {
                            error!("Failed to send frame: {}", e);
                            events.error(e.to_string());
                            break;
                        }
                    }
                    Some(Outgoing::Close) | None => {
                        debug!("Closing socket {}", events.id());
                        let _ = write.close().await;
                        break;
                    }
                }
            }
        }
    }

    open.store(false, Ordering::Release);
    events.closed();
}

/// Resolves once a close is requested or the socket handle is gone
///
/// Frames sent before the handshake are rejected by `Socket::send`, so
/// only `Close` can show up here.
async fn wait_for_close(outgoing_rx: &mut mpsc::UnboundedReceiver<Outgoing>) {
    loop {
        match outgoing_rx.recv().await {
            Some(Outgoing::Close) | None => return,
            Some(Outgoing::Frame(_)) => continue,
        }
    }
}

fn ws_message_to_tungstenite(msg: WsMessage) -> Message {
    match msg {
        WsMessage::Text(text) => Message::Text(text),
        WsMessage::Binary(data) => Message::Binary(data),
    }
}

fn tungstenite_to_ws_message(msg: Message) -> Option<WsMessage> {
    match msg {
        Message::Text(text) => Some(WsMessage::Text(text)),
        Message::Binary(data) => Some(WsMessage::Binary(data)),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
    }
}
