//! # batchsub
//!
//! `batchsub` is an in-process, topic-based publish/subscribe broker with
//! batched delivery. Producers queue messages under a topic; consumers
//! register interest in topics; nothing is delivered until someone calls
//! `dispatch`, which drains the queue in publish order.
//!
//! Recipients are resolved when `dispatch` runs (late binding). Subscribing
//! after a message was queued still delivers it; unsubscribing before the
//! round suppresses it.
//!
//! ## Core Modules
//!
//! - `broker`: the subscription table, the message queue and the dispatch algorithm.
//! - `client`: producer and consumer handles, receive modes and the consumer registry.
//! - `config`: loads settings from `config/default` and `BATCHSUB_*` environment variables.
//! - `runtime`: an opt-in background dispatch loop for a shared broker.
//! - `scenario`: the scripted runs behind the `scenario` and `demo` commands.
//! - `utils`: error types and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod runtime;
pub mod scenario;
pub mod utils;

pub use broker::{Broker, DispatchReport, SharedBroker, Subscriber, SubscriberRef};
pub use client::{Consumer, Producer};
pub use utils::error::{DeliveryError, NotFoundError};
