//! The `client` module holds the handles applications use to talk to a
//! broker.
//!
//! - `Producer` publishes under one fixed topic.
//! - `Consumer` subscribes a fixed delivery callback, chosen by `ReceiveMode`.
//! - `ChannelSubscriber` forwards deliveries into a tokio channel.
//! - `ConsumerRegistry` looks consumers up by name.

pub mod channel;
pub mod consumer;
pub mod producer;
pub mod receive;
pub mod registry;

pub use channel::ChannelSubscriber;
pub use consumer::Consumer;
pub use producer::Producer;
pub use receive::ReceiveMode;
pub use registry::ConsumerRegistry;
