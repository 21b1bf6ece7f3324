pub mod engine;
pub mod message;
pub mod shared;
pub mod subscriber;
pub mod topic;

pub use engine::{Broker, DispatchReport};
pub use shared::{SharedBroker, lock, shared};
pub use subscriber::{Subscriber, SubscriberRef};

#[cfg(test)]
mod tests;
