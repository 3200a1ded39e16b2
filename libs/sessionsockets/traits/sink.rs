//! Inbound sink
//!
//! Delivered messages end up in a collection the caller owns and reads on
//! its own schedule. The client only ever appends batches or clears it.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;

/// Destination for inbound message batches
///
/// # Deadlocks
///
/// `append` runs while the client holds its state lock. An implementation
/// must not call back into the `SessionClient` from inside it; react to new
/// batches from another task instead (see [`MessageBuffer::subscribe`]).
pub trait MessageSink<M>: Send + Sync {
    /// Append a batch after the existing entries, keeping batch order
    fn append(&self, batch: Vec<M>);

    /// Replace the contents with an empty sequence
    fn clear(&self);
}

/// Shared, observable ordered message collection
///
/// Cloning yields another handle to the same buffer. Readers take a
/// snapshot or subscribe to length changes while the client appends.
pub struct MessageBuffer<M> {
    inner: Arc<BufferInner<M>>,
}

struct BufferInner<M> {
    messages: RwLock<Vec<M>>,
    len_tx: watch::Sender<usize>,
}

impl<M> MessageBuffer<M> {
    pub fn new() -> Self {
        let (len_tx, _) = watch::channel(0);
        Self {
            inner: Arc::new(BufferInner {
                messages: RwLock::new(Vec::new()),
                len_tx,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.messages.read().is_empty()
    }

    /// Watch the buffer length; changes after every append or clear
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.inner.len_tx.subscribe()
    }

    /// Run `f` over the current contents without copying them
    pub fn with_messages<R>(&self, f: impl FnOnce(&[M]) -> R) -> R {
        f(&self.inner.messages.read())
    }
}

impl<M: Clone> MessageBuffer<M> {
    /// Copy of the current contents
    pub fn snapshot(&self) -> Vec<M> {
        self.inner.messages.read().clone()
    }

    /// Entries from `offset` on, for readers tracking what they have seen
    pub fn since(&self, offset: usize) -> Vec<M> {
        let messages = self.inner.messages.read();
        messages.get(offset..).map(<[M]>::to_vec).unwrap_or_default()
    }
}

impl<M> Clone for MessageBuffer<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M> Default for MessageBuffer<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Send + Sync> MessageSink<M> for MessageBuffer<M> {
    fn append(&self, batch: Vec<M>) {
        let len = {
            let mut messages = self.inner.messages.write();
            messages.extend(batch);
            messages.len()
        };
        self.inner.len_tx.send_replace(len);
    }

    fn clear(&self) {
        self.inner.messages.write().clear();
        self.inner.len_tx.send_replace(0);
    }
}
