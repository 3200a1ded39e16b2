//! One-shot reconnect timer
//!
//! A client owns exactly one of these. Scheduling replaces whatever was
//! pending, so there is never more than one reconnect in flight.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// Identifier handed to the timer callback
pub type TimerId = u64;

struct PendingTimer {
    id: TimerId,
    handle: JoinHandle<()>,
}

#[derive(Default)]
pub struct ReconnectTimer {
    pending: Option<PendingTimer>,
    next_id: TimerId,
}

impl ReconnectTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `fire` after `delay`, cancelling any pending timer first
    ///
    /// The callback receives the timer id and must confirm it with
    /// [`ReconnectTimer::take_if_current`] before acting: an abort cannot
    /// stop a callback that already woke up and is waiting for the client.
    pub fn schedule<F>(&mut self, runtime: &Handle, delay: Duration, fire: F) -> TimerId
    where
        F: FnOnce(TimerId) + Send + 'static,
    {
        self.cancel();

        self.next_id += 1;
        let id = self.next_id;
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            fire(id);
        });

        debug!("Reconnect timer {} armed for {:?}", id, delay);
        self.pending = Some(PendingTimer { id, handle });
        id
    }

    /// Cancel the pending timer; returns true if one was pending
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(timer) => {
                timer.handle.abort();
                debug!("Reconnect timer {} cancelled", timer.id);
                true
            }
            None => false,
        }
    }

    /// Claim the pending slot for a firing timer
    ///
    /// Returns false for a timer that was cancelled or replaced.
    pub fn take_if_current(&mut self, id: TimerId) -> bool {
        match &self.pending {
            Some(timer) if timer.id == id => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Drop for ReconnectTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_pending_timer() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = ReconnectTimer::new();
        let runtime = Handle::current();

        let first = {
            let fired = Arc::clone(&fired);
            timer.schedule(&runtime, Duration::from_secs(3), move |_| {
                fired.fetch_add(1, Ordering::SeqCst);
            })
        };
        let second = {
            let fired = Arc::clone(&fired);
            timer.schedule(&runtime, Duration::from_secs(3), move |_| {
                fired.fetch_add(10, Ordering::SeqCst);
            })
        };
        assert_ne!(first, second);
        assert!(!timer.take_if_current(first));

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = ReconnectTimer::new();
        {
            let fired = Arc::clone(&fired);
            timer.schedule(&Handle::current(), Duration::from_secs(3), move |_| {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert!(timer.cancel());
        assert!(!timer.is_pending());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
