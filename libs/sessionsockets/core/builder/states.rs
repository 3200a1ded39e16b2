/// Type-state markers for the builder pattern
///
/// These track at compile time whether the two required pieces, the
/// session id and the inbound sink, have been supplied.

use std::marker::PhantomData;

/// Marker trait for session id state
pub trait SessionState {}

/// Session id has not been set
pub struct NoSession;
impl SessionState for NoSession {}

/// Session id has been set
pub struct HasSession;
impl SessionState for HasSession {}

/// Marker trait for sink state
pub trait SinkState {}

/// Sink has not been set
pub struct NoSink;
impl SinkState for NoSink {}

/// Sink has been set
pub struct HasSink;
impl SinkState for HasSink {}

/// Phantom marker to prevent direct construction
#[derive(Debug, Clone, Copy)]
pub struct TypeState<S, K> {
    _session: PhantomData<S>,
    _sink: PhantomData<K>,
}

impl<S, K> TypeState<S, K> {
    pub(crate) fn new() -> Self {
        Self {
            _session: PhantomData,
            _sink: PhantomData,
        }
    }
}

impl<S, K> Default for TypeState<S, K> {
    fn default() -> Self {
        Self::new()
    }
}
