//! Sharing a broker between threads and tasks.
//!
//! The broker has no internal locking. Everything that touches a shared
//! broker goes through one `Mutex`, so enqueue, subscription changes and a
//! whole dispatch round are each a single critical section.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::broker::Broker;

pub type SharedBroker<P> = Arc<Mutex<Broker<P>>>;

pub fn shared<P>(broker: Broker<P>) -> SharedBroker<P> {
    Arc::new(Mutex::new(broker))
}

/// Lock the broker, recovering the guard if a previous holder panicked.
///
/// A panic inside a subscriber poisons the mutex but leaves the broker
/// consistent: the queue was already drained and the table untouched.
pub fn lock<P>(broker: &SharedBroker<P>) -> MutexGuard<'_, Broker<P>> {
    broker.lock().unwrap_or_else(PoisonError::into_inner)
}
