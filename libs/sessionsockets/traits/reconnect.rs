use std::time::Duration;

/// Delay used by the default reconnect policy
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Policy deciding when (and whether) a dropped session is re-dialled
///
/// The client asks for a delay every time a socket closes. Attempts are
/// counted from the last successful open, so `attempt` is 0 for the first
/// retry after a healthy connection dropped.
pub trait ReconnectionStrategy: Send + Sync {
    /// Delay before the next reconnect attempt
    ///
    /// # Returns
    /// * `Some(duration)` - Schedule one reconnect after this long
    /// * `None` - Stop reconnecting; the client stays disconnected
    fn next_delay(&self, attempt: usize) -> Option<Duration>;

    /// Reset the strategy state (called after a socket opens)
    fn reset(&mut self);

    /// Check if another attempt is allowed
    fn should_reconnect(&self, attempt: usize) -> bool;
}

/// Fixed delay reconnection strategy
///
/// Always waits the same amount of time. With `max_attempts = None` the
/// client retries forever, which is the default session behaviour.
#[derive(Debug, Clone)]
pub struct FixedDelay {
    delay: Duration,
    max_attempts: Option<usize>,
}

impl FixedDelay {
    /// # Arguments
    /// * `delay` - The fixed delay between reconnects
    /// * `max_attempts` - Maximum number of attempts (None = unlimited)
    pub fn new(delay: Duration, max_attempts: Option<usize>) -> Self {
        Self { delay, max_attempts }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(DEFAULT_RECONNECT_DELAY, None)
    }
}

impl ReconnectionStrategy for FixedDelay {
    fn next_delay(&self, attempt: usize) -> Option<Duration> {
        if !self.should_reconnect(attempt) {
            return None;
        }
        Some(self.delay)
    }

    fn reset(&mut self) {
        // No state to reset for fixed delay
    }

    fn should_reconnect(&self, attempt: usize) -> bool {
        self.max_attempts.map_or(true, |max| attempt < max)
    }
}

/// Exponential backoff reconnection strategy
///
/// Delays grow as initial_delay * 2^attempt, capped at max_delay.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    max_delay: Duration,
    max_attempts: Option<usize>,
}

impl ExponentialBackoff {
    /// # Arguments
    /// * `initial_delay` - The delay before the first reconnect
    /// * `max_delay` - Upper bound for any single delay
    /// * `max_attempts` - Maximum number of attempts (None = unlimited)
    pub fn new(initial_delay: Duration, max_delay: Duration, max_attempts: Option<usize>) -> Self {
        Self {
            initial_delay,
            max_delay,
            max_attempts,
        }
    }
}

impl ReconnectionStrategy for ExponentialBackoff {
    fn next_delay(&self, attempt: usize) -> Option<Duration> {
        if !self.should_reconnect(attempt) {
            return None;
        }

        let factor = 2u64.saturating_pow(attempt.min(u32::MAX as usize) as u32);
        let delay = (self.initial_delay.as_millis() as u64).saturating_mul(factor);
        Some(Duration::from_millis(delay.min(self.max_delay.as_millis() as u64)))
    }

    fn reset(&mut self) {
        // Attempts are counted by the client
    }

    fn should_reconnect(&self, attempt: usize) -> bool {
        self.max_attempts.map_or(true, |max| attempt < max)
    }
}

/// Never reconnect strategy
///
/// A dropped session stays disconnected until `connect()` is called again.
#[derive(Debug, Clone)]
pub struct NeverReconnect;

impl ReconnectionStrategy for NeverReconnect {
    fn next_delay(&self, _attempt: usize) -> Option<Duration> {
        None
    }

    fn reset(&mut self) {}

    fn should_reconnect(&self, _attempt: usize) -> bool {
        false
    }
}
