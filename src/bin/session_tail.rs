//! Tail a session: print inbound messages, send stdin lines
//!
//! Usage: session_tail <session_id> [user_id]

use anyhow::{bail, Result};
use session_client::bin_common::runner::shutdown_signal;
use session_client::bin_common::{
    init_tracing_with_level, load_config_from_env, parse_args, BinaryRunner, ConfigType,
    RunConfig, SessionClientConfig,
};
use session_client::session_api::Message;
use session_client::sessionsockets::{self, MessageBuffer, SendOutcome, SessionClient};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

struct SessionTail {
    run_config: RunConfig,
    client: SessionClient<Message>,
    messages: MessageBuffer<Message>,
    author: String,
}

impl SessionTail {
    fn print_new_messages(&self, printed: &mut usize) {
        // The buffer shrinks only on clear
        if self.messages.len() < *printed {
            *printed = 0;
        }
        for message in self.messages.since(*printed) {
            let kind = if message.is_answer { "answer" } else { "question" };
            println!("[{}] {}: {}", kind, message.name, message.content);
            *printed += 1;
        }
    }
}

impl BinaryRunner for SessionTail {
    async fn run(&mut self) -> Result<()> {
        let mut lengths = self.messages.subscribe();
        let mut statuses = self.client.watch_status();
        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;
        let mut heartbeat = tokio::time::interval(self.run_config.heartbeat_interval());
        heartbeat.tick().await;
        let mut printed = 0;

        info!("Connecting to {}", self.client.endpoint());
        self.client.connect();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                changed = lengths.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.print_new_messages(&mut printed);
                }
                changed = statuses.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let status = *statuses.borrow_and_update();
                    match status {
                        Some(status) => info!("Status: {}", status),
                        None => info!("Status: none"),
                    }
                }
                line = stdin.next_line(), if stdin_open => match line {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => {
                        match self.client.send(Message::question(self.author.clone(), line)) {
                            SendOutcome::Sent => info!("Sent"),
                            SendOutcome::Queued => {
                                info!("Queued ({} waiting)", self.client.queue_len())
                            }
                        }
                    }
                    Ok(None) => {
                        info!("stdin closed, still listening");
                        stdin_open = false;
                    }
                    Err(e) => {
                        warn!("Failed to read stdin: {}", e);
                        stdin_open = false;
                    }
                },
                _ = heartbeat.tick() => {
                    let metrics = self.client.metrics();
                    info!(
                        "Heartbeat: sent={} received={} reconnects={} queued={}",
                        metrics.messages_sent,
                        metrics.messages_received,
                        metrics.reconnect_count,
                        metrics.queue_len
                    );
                }
            }
        }

        self.client.disconnect();
        Ok(())
    }

    fn config(&self) -> &RunConfig {
        &self.run_config
    }

    fn stats(&self) -> Option<String> {
        let metrics = self.client.metrics();
        Some(format!(
            "Messages: {} received, {} sent, {} left in queue",
            metrics.messages_received, metrics.messages_sent, metrics.queue_len
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load config first (before logging is initialized)
    let config_path = load_config_from_env(ConfigType::Client);
    let config = SessionClientConfig::from_env_or_default(&config_path)?;

    init_tracing_with_level(&config.log_level);
    config.log();

    let args = parse_args();
    let Some(session_id) = args.first().cloned() else {
        bail!("usage: session_tail <session_id> [user_id]");
    };
    let user_id = args.get(1).cloned().or_else(|| config.user_id.clone());

    let run_config = RunConfig::new("Session tail").with_session(session_id.clone());

    let messages: MessageBuffer<Message> = MessageBuffer::new();
    let mut builder = sessionsockets::builder()
        .session_id(session_id)
        .sink::<Message, _>(messages.clone())
        .api_base_path(config.api_config().base_path())
        .reconnect_delay(config.reconnect_delay());
    if let Some(user_id) = &user_id {
        builder = builder.query_param("user_id", user_id.clone());
    }
    let client: SessionClient<Message> = builder.build()?;

    let mut app = SessionTail {
        run_config,
        client,
        messages,
        author: user_id.unwrap_or_else(|| "guest".to_string()),
    };

    app.execute().await
}
