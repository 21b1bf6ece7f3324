use crate::broker::{SharedBroker, lock};

/// Publishes payloads under one fixed topic.
///
/// Publishing only queues the payload; subscribers see it on the next
/// dispatch round.
#[derive(Clone)]
pub struct Producer<P> {
    topic: String,
    broker: SharedBroker<P>,
}

impl<P> Producer<P> {
    pub fn new(topic: &str, broker: SharedBroker<P>) -> Self {
        Self {
            topic: topic.to_string(),
            broker,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns the sequence number of the queued message.
    pub fn publish(&self, payload: P) -> u64 {
        lock(&self.broker).enqueue(&self.topic, payload)
    }
}

impl<P> std::fmt::Debug for Producer<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Producer").field("topic", &self.topic).finish()
    }
}
