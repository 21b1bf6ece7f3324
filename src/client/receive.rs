//! Receive modes for consumers.
//!
//! A consumer's delivery behaviour is one of a closed set of handlers. The
//! mode is parsed and validated once (typically from configuration) and the
//! matching handler is bound when the consumer is built, so nothing is looked
//! up or re-validated per delivery.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use crate::client::consumer::Inbox;
use crate::utils::error::ReceiveModeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReceiveMode {
    /// Keep every payload in the consumer's inbox.
    #[default]
    Record,
    /// Keep the payload and log `"<name> got <payload>"` at info level.
    Log,
    /// Count deliveries without keeping payloads.
    Silent,
}

pub(crate) type ReceiveHandler<P> = fn(&Inbox<P>, &P);

impl ReceiveMode {
    pub const ALL: [ReceiveMode; 3] = [ReceiveMode::Record, ReceiveMode::Log, ReceiveMode::Silent];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiveMode::Record => "record",
            ReceiveMode::Log => "log",
            ReceiveMode::Silent => "silent",
        }
    }

    pub(crate) fn handler<P>(self) -> ReceiveHandler<P>
    where
        P: Clone + fmt::Display,
    {
        match self {
            ReceiveMode::Record => record::<P>,
            ReceiveMode::Log => log::<P>,
            ReceiveMode::Silent => silent::<P>,
        }
    }
}

impl fmt::Display for ReceiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReceiveMode {
    type Err = ReceiveModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        ReceiveMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == key)
            .ok_or_else(|| ReceiveModeError(s.to_string()))
    }
}

fn record<P: Clone + fmt::Display>(inbox: &Inbox<P>, payload: &P) {
    debug!("{} got {}", inbox.name(), payload);
    inbox.keep(payload.clone());
}

fn log<P: Clone + fmt::Display>(inbox: &Inbox<P>, payload: &P) {
    info!("{} got {}", inbox.name(), payload);
    inbox.keep(payload.clone());
}

fn silent<P>(inbox: &Inbox<P>, _payload: &P) {
    inbox.count_only();
}
