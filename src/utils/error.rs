//! The `error` module defines the error types used within `batchsub`.
//!
//! Broker operations that can fail return one of these through `Result`;
//! nothing in the library panics on a recoverable condition.

use serde::Serialize;
use thiserror::Error;

/// Returned by `unsubscribe` when there is no registration to remove.
///
/// Always recoverable: the broker state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundError {
    #[error("topic '{topic}' has no registrations")]
    UnknownTopic { topic: String },

    #[error("subscriber '{subscriber}' is not bound to topic '{topic}'")]
    NotSubscribed { topic: String, subscriber: String },
}

impl NotFoundError {
    /// The topic the failed call referred to.
    pub fn topic(&self) -> &str {
        match self {
            NotFoundError::UnknownTopic { topic } => topic,
            NotFoundError::NotSubscribed { topic, .. } => topic,
        }
    }
}

/// Raised by a subscriber's `receive` callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct DeliveryError {
    reason: String,
}

impl DeliveryError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// One failed delivery inside a dispatch round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("delivery of message #{sequence} on '{topic}' to '{subscriber}' failed: {reason}")]
pub struct DeliveryFailure {
    pub topic: String,
    pub sequence: u64,
    pub subscriber: String,
    pub reason: String,
}

/// Every delivery failure collected during one dispatch round.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} deliveries failed during dispatch", .failures.len())]
pub struct DispatchError {
    pub failures: Vec<DeliveryFailure>,
}

/// Errors from the consumer registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("a consumer named '{0}' is already registered")]
    Duplicate(String),

    #[error("no consumer named '{0}' is registered")]
    Missing(String),
}

/// A dispatch loop that could not be started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchLoopError {
    #[error("dispatch interval must be greater than zero")]
    ZeroInterval,
}

/// Errors from the bundled scenario and demo runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

/// An unknown `receive_mode` key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid receive mode '{0}' (expected one of: record, log, silent)")]
pub struct ReceiveModeError(pub String);
