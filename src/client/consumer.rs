//! Consumer handle
//!
//! A `Consumer` binds a name and a fixed delivery callback to a shared
//! broker. The callback lives in an `Inbox` that is created once per consumer;
//! that inbox is the subscriber the broker sees, so every subscribe and
//! unsubscribe issued through the same consumer refers to the same identity.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::broker::{SharedBroker, Subscriber, SubscriberRef, lock};
use crate::client::receive::{ReceiveHandler, ReceiveMode};
use crate::utils::error::{DeliveryError, NotFoundError};

/// Delivery endpoint registered with the broker on behalf of a `Consumer`.
pub(crate) struct Inbox<P> {
    name: String,
    received: Mutex<Vec<P>>,
    count: AtomicUsize,
    handler: ReceiveHandler<P>,
}

impl<P> Inbox<P> {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn keep(&self, payload: P) {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(payload);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn count_only(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }
}

impl<P: Send> Subscriber<P> for Inbox<P> {
    fn receive(&self, payload: &P) -> Result<(), DeliveryError> {
        (self.handler)(self, payload);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub struct Consumer<P> {
    inbox: Arc<Inbox<P>>,
    mode: ReceiveMode,
    broker: SharedBroker<P>,
}

impl<P> Consumer<P>
where
    P: Clone + fmt::Display + Send + 'static,
{
    /// Create a consumer that records every payload it receives.
    pub fn new(name: &str, broker: SharedBroker<P>) -> Self {
        Self::with_mode(name, broker, ReceiveMode::default())
    }

    pub fn with_mode(name: &str, broker: SharedBroker<P>, mode: ReceiveMode) -> Self {
        Self {
            inbox: Arc::new(Inbox {
                name: name.to_string(),
                received: Mutex::new(Vec::new()),
                count: AtomicUsize::new(0),
                handler: mode.handler::<P>(),
            }),
            mode,
            broker,
        }
    }

    pub fn subscribe(&self, topic: &str) {
        lock(&self.broker).subscribe(topic, self.as_subscriber());
    }

    pub fn unsubscribe(&self, topic: &str) -> Result<(), NotFoundError> {
        lock(&self.broker).unsubscribe(topic, &self.as_subscriber())
    }

    /// Drop every registration this consumer holds.
    pub fn unsubscribe_all(&self) -> usize {
        lock(&self.broker).unsubscribe_all(&self.as_subscriber())
    }

    /// The handle the broker knows this consumer by.
    pub fn as_subscriber(&self) -> SubscriberRef<P> {
        self.inbox.clone()
    }

    /// Payloads kept so far, in delivery order.
    pub fn received(&self) -> Vec<P> {
        self.inbox
            .received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Take and clear the kept payloads.
    pub fn take_received(&self) -> Vec<P> {
        std::mem::take(
            &mut *self
                .inbox
                .received
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Deliveries seen, including those a `Silent` consumer did not keep.
    pub fn received_count(&self) -> usize {
        self.inbox.count.load(Ordering::Relaxed)
    }
}

impl<P> Consumer<P> {
    pub fn name(&self) -> &str {
        &self.inbox.name
    }

    pub fn mode(&self) -> ReceiveMode {
        self.mode
    }
}

impl<P> fmt::Debug for Consumer<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("name", &self.inbox.name)
            .field("mode", &self.mode)
            .finish()
    }
}
