use std::collections::VecDeque;

/// FIFO of messages waiting for an open socket
///
/// Unbounded and owned by one client. Messages only leave through a
/// successful flush or an explicit clear.
#[derive(Debug, Clone)]
pub struct OutboundQueue<M> {
    items: VecDeque<M>,
}

impl<M> OutboundQueue<M> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn push_back(&mut self, message: M) {
        self.items.push_back(message);
    }

    pub fn pop_front(&mut self) -> Option<M> {
        self.items.pop_front()
    }

    /// Put a message back at the head after a failed delivery
    pub fn push_front(&mut self, message: M) {
        self.items.push_front(message);
    }

    /// Drop everything, returning how many messages were removed
    pub fn clear(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &M> {
        self.items.iter()
    }
}

impl<M> Default for OutboundQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}
