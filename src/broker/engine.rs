//! Broker engine
//!
//! This module contains the in-memory broker responsible for:
//! - queueing published messages until the next dispatch round
//! - managing per-topic subscriber lists
//! - draining the queue and delivering to subscribers on `dispatch`
//!
//! Late binding: recipients are resolved when `dispatch` runs, never when a
//! message is enqueued. A subscriber that joins between enqueue and dispatch
//! receives the message; one that leaves in that window does not. This is the
//! broker's contract, not an accident of the implementation; do not move
//! recipient resolution into `enqueue`.
//!
//! Concurrency and usage notes:
//! - The API is synchronous and lock-free. To share a broker between threads,
//!   hold it behind one lock (see `SharedBroker`) so a dispatch round is a
//!   single critical section.
//! - Subscribers run inline; a slow `receive` stalls the whole round.

use serde::Serialize;
use tracing::{debug, warn};

use crate::broker::message::{Message, MessageQueue};
use crate::broker::subscriber::SubscriberRef;
use crate::broker::topic::{SubscriptionTable, TopicName};
use crate::utils::error::{DeliveryFailure, DispatchError, NotFoundError};

/// Outcome of one dispatch round.
///
/// Delivery failures do not stop the round. Each one is logged and collected
/// here so the caller can decide what to do with it.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[must_use = "a dispatch report may carry delivery failures"]
pub struct DispatchReport {
    /// Messages drained from the queue.
    pub messages: usize,
    /// Successful `receive` calls.
    pub deliveries: usize,
    /// Messages whose topic had no subscriber at dispatch time.
    pub dropped: usize,
    pub failures: Vec<DeliveryFailure>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn collected failures into an error, after the round has completed.
    pub fn into_result(self) -> Result<Self, DispatchError> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(DispatchError {
                failures: self.failures,
            })
        }
    }
}

pub struct Broker<P> {
    table: SubscriptionTable<P>,
    queue: MessageQueue<P>,
    next_sequence: u64,
}

impl<P> Default for Broker<P> {
    fn default() -> Self {
        Self {
            table: SubscriptionTable::new(),
            queue: MessageQueue::new(),
            next_sequence: 0,
        }
    }
}

impl<P> Broker<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `payload` under `topic`. Nothing is delivered until `dispatch`.
    ///
    /// Returns the message's sequence number.
    pub fn enqueue(&mut self, topic: &str, payload: P) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.queue.append(Message::new(topic, payload, sequence));
        debug!(topic, sequence, "message enqueued");
        sequence
    }

    /// Register `subscriber` under `topic`. Registering twice delivers twice.
    pub fn subscribe(&mut self, topic: &str, subscriber: SubscriberRef<P>) {
        debug!(topic, subscriber = subscriber.name(), "subscribed");
        self.table.add_binding(topic, subscriber);
    }

    /// Remove the first registration of `subscriber` under `topic`.
    pub fn unsubscribe(
        &mut self,
        topic: &str,
        subscriber: &SubscriberRef<P>,
    ) -> Result<(), NotFoundError> {
        self.table.remove_binding(topic, subscriber)?;
        debug!(topic, subscriber = subscriber.name(), "unsubscribed");
        Ok(())
    }

    /// Remove every registration of `subscriber` across all topics.
    pub fn unsubscribe_all(&mut self, subscriber: &SubscriberRef<P>) -> usize {
        let removed = self.table.remove_everywhere(subscriber);
        debug!(
            subscriber = subscriber.name(),
            removed, "cleaned up subscriber"
        );
        removed
    }

    /// Drain the queue and deliver every message in FIFO order.
    ///
    /// Each message goes to the subscribers registered for its topic right
    /// now, in registration order. Messages for a topic without subscribers
    /// are dropped. A failing subscriber does not prevent delivery to the
    /// ones after it; see `DispatchReport`.
    pub fn dispatch(&mut self) -> DispatchReport {
        let mut report = DispatchReport::default();
        if self.queue.is_empty() {
            return report;
        }

        for message in self.queue.drain_all() {
            report.messages += 1;

            // Resolved against the table as it is now, not as it was at enqueue.
            let subscribers = self.table.list_bindings(&message.topic);
            if subscribers.is_empty() {
                debug!(
                    topic = %message.topic,
                    sequence = message.sequence,
                    "no subscribers, message dropped"
                );
                report.dropped += 1;
                continue;
            }

            for subscriber in subscribers {
                match subscriber.receive(&message.payload) {
                    Ok(()) => report.deliveries += 1,
                    Err(e) => {
                        warn!(
                            "Delivery of message #{} on '{}' to '{}' failed: {}",
                            message.sequence,
                            message.topic,
                            subscriber.name(),
                            e
                        );
                        report.failures.push(DeliveryFailure {
                            topic: message.topic.clone(),
                            sequence: message.sequence,
                            subscriber: subscriber.name().to_string(),
                            reason: e.reason().to_string(),
                        });
                    }
                }
            }
        }

        debug!(
            messages = report.messages,
            deliveries = report.deliveries,
            dropped = report.dropped,
            failures = report.failures.len(),
            "dispatch round complete"
        );
        report
    }

    /// Number of messages waiting for the next dispatch.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queued messages in delivery order.
    pub fn queued(&self) -> impl Iterator<Item = &Message<P>> {
        self.queue.iter()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.table.binding_count(topic)
    }

    pub fn topics(&self) -> Vec<TopicName> {
        self.table.topics()
    }
}

impl<P> std::fmt::Debug for Broker<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broker")
            .field("subscriptions", &self.table)
            .field("pending", &self.queue.len())
            .field("next_sequence", &self.next_sequence)
            .finish()
    }
}
