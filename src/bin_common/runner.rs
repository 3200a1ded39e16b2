//! Lifecycle helpers for long-running session binaries
//!
//! A binary implements [`BinaryRunner`]: `run` owns the connect / stream /
//! disconnect loop, logging client metrics every heartbeat, and
//! [`shutdown_signal`] ends it on Ctrl+C.

use std::time::Duration;
use tracing::info;

/// Name and heartbeat cadence of a session binary
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Shown in the start and stop banners
    pub name: String,
    /// Session the binary is attached to, if any
    pub session_id: Option<String>,
    /// Seconds between metrics log lines
    pub heartbeat_interval_secs: u64,
}

impl RunConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            session_id: None,
            heartbeat_interval_secs: 60,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_heartbeat(mut self, secs: u64) -> Self {
        self.heartbeat_interval_secs = secs;
        self
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }
}

/// A binary driving one session client until shutdown
pub trait BinaryRunner {
    /// Connect, stream until shutdown, disconnect
    async fn run(&mut self) -> anyhow::Result<()>;

    fn config(&self) -> &RunConfig;

    /// Final client metrics, logged after the loop exits
    fn stats(&self) -> Option<String> {
        None
    }

    fn print_banner(&self) {
        let config = self.config();
        info!("========================================");
        info!("{} starting", config.name);
        if let Some(session_id) = &config.session_id {
            info!("Session: {}", session_id);
        }
        info!("Heartbeat every {}s, Ctrl+C to stop", config.heartbeat_interval_secs);
        info!("========================================");
    }

    fn print_shutdown(&self) {
        info!("========================================");
        info!("{} stopped", self.config().name);
        if let Some(stats) = self.stats() {
            info!("{}", stats);
        }
        info!("========================================");
    }

    /// `run` wrapped in the start and stop banners
    async fn execute(&mut self) -> anyhow::Result<()> {
        self.print_banner();
        let result = self.run().await;
        self.print_shutdown();
        result
    }
}

/// Resolves on Ctrl+C; never resolves if the signal handler can't be installed
pub async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
