//! Message definitions for the broker
//!
//! `Message` is the queued (topic, payload) pair. Besides the two fields a
//! message is made of, the broker stamps:
//! - `sequence`: position in the broker's lifetime enqueue order; this is the
//!   message's identity
//! - `enqueued_at`: milliseconds since UNIX epoch at enqueue time
//!
//! `MessageQueue` is the FIFO of messages awaiting the next dispatch round.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message<P> {
    pub topic: String,
    pub payload: P,
    pub sequence: u64,
    pub enqueued_at: i64,
}

impl<P> Message<P> {
    pub fn new(topic: &str, payload: P, sequence: u64) -> Self {
        Self {
            topic: topic.to_string(),
            payload,
            sequence,
            enqueued_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

#[derive(Debug)]
pub struct MessageQueue<P> {
    messages: Vec<Message<P>>,
}

impl<P> Default for MessageQueue<P> {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
        }
    }
}

impl<P> MessageQueue<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message<P>) {
        self.messages.push(message);
    }

    /// Take every queued message in FIFO order, leaving the queue empty.
    pub fn drain_all(&mut self) -> Vec<Message<P>> {
        std::mem::take(&mut self.messages)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message<P>> {
        self.messages.iter()
    }
}
