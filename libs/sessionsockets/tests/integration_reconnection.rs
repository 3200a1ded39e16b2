//! Integration tests for reconnection strategies

use sessionsockets::traits::reconnect::{
    ExponentialBackoff, FixedDelay, NeverReconnect, ReconnectionStrategy,
};
use std::time::Duration;

/// Macro for verbose test output
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

#[test]
fn test_default_fixed_delay_never_gives_up() {
    let strategy = FixedDelay::default();

    for attempt in [0, 1, 10, 1_000, 1_000_000] {
        assert_eq!(strategy.next_delay(attempt), Some(Duration::from_secs(3)));
        assert!(strategy.should_reconnect(attempt));
    }
}

#[test]
fn test_fixed_delay_with_max_attempts() {
    let strategy = FixedDelay::new(Duration::from_millis(500), Some(3));

    assert!(strategy.next_delay(0).is_some());
    assert!(strategy.next_delay(1).is_some());
    assert!(strategy.next_delay(2).is_some());
    assert!(strategy.next_delay(3).is_none());
}

#[test]
fn test_exponential_backoff_full_sequence() {
    let strategy = ExponentialBackoff::new(
        Duration::from_millis(100),
        Duration::from_secs(10),
        Some(5),
    );

    let expected_delays = [100, 200, 400, 800, 1600];

    for (attempt, &expected_ms) in expected_delays.iter().enumerate() {
        let delay = strategy.next_delay(attempt).unwrap();
        verbose_println!("  Attempt {}: {:?}", attempt, delay);
        assert_eq!(delay.as_millis(), expected_ms, "Unexpected delay at attempt {}", attempt);
    }

    assert!(strategy.next_delay(5).is_none(), "Should return None after max attempts");
}

#[test]
fn test_exponential_backoff_with_capping() {
    let strategy = ExponentialBackoff::new(
        Duration::from_millis(500),
        Duration::from_secs(2),
        None,
    );

    let delays: Vec<u64> = (0..6)
        .map(|i| strategy.next_delay(i).unwrap().as_millis() as u64)
        .collect();

    verbose_println!("  Delays: {:?}", delays);
    assert_eq!(delays, vec![500, 1000, 2000, 2000, 2000, 2000]);
}

#[test]
fn test_never_reconnect_always_fails() {
    let strategy = NeverReconnect;

    for attempt in 0..10 {
        assert!(strategy.next_delay(attempt).is_none());
        assert!(!strategy.should_reconnect(attempt));
    }
}

#[test]
fn test_strategy_reset_is_stateless() {
    let mut fixed = FixedDelay::new(Duration::from_millis(500), None);
    let before = fixed.next_delay(5);
    fixed.reset();
    assert_eq!(fixed.next_delay(5), before);
}

#[test]
fn test_strategies_as_trait_objects() {
    let strategies: Vec<Box<dyn ReconnectionStrategy>> = vec![
        Box::new(FixedDelay::default()),
        Box::new(ExponentialBackoff::new(
            Duration::from_secs(1),
            Duration::from_secs(60),
            None,
        )),
        Box::new(NeverReconnect),
    ];

    let first: Vec<Option<Duration>> = strategies.iter().map(|s| s.next_delay(0)).collect();
    assert_eq!(
        first,
        vec![Some(Duration::from_secs(3)), Some(Duration::from_secs(1)), None]
    );
}
