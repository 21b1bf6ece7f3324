//! Subscriber contract
//!
//! A subscriber is anything that can take delivery of a payload. The broker
//! stores subscribers as shared trait objects (`SubscriberRef`) and tells
//! registrations apart by pointer identity only: two handles are "the same
//! subscriber" exactly when they point at the same allocation.

use std::sync::Arc;

use crate::utils::error::DeliveryError;

/// Delivery callback invoked by `Broker::dispatch`.
///
/// `receive` runs synchronously inside the dispatch round while the broker is
/// borrowed (or locked, for a `SharedBroker`). It must not call back into the
/// same broker.
pub trait Subscriber<P>: Send + Sync {
    fn receive(&self, payload: &P) -> Result<(), DeliveryError>;

    /// Human-readable name used in logs and failure reports.
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// Shared handle to a registered subscriber.
pub type SubscriberRef<P> = Arc<dyn Subscriber<P>>;

impl<P, F> Subscriber<P> for F
where
    F: Fn(&P) -> Result<(), DeliveryError> + Send + Sync,
{
    fn receive(&self, payload: &P) -> Result<(), DeliveryError> {
        self(payload)
    }
}

/// Reference equality between two subscriber handles.
pub fn same_subscriber<P>(a: &SubscriberRef<P>, b: &SubscriberRef<P>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
