use tokio::sync::mpsc::UnboundedSender;

use crate::broker::Subscriber;
use crate::utils::error::DeliveryError;

/// Forwards every delivered payload into a tokio channel.
///
/// Useful when the code that reacts to messages runs on another task. A
/// closed channel (receiver dropped) turns into a `DeliveryError`.
#[derive(Debug)]
pub struct ChannelSubscriber<P> {
    /// Name used in logs and failure reports.
    pub name: String,

    /// Channel the payloads are forwarded to.
    pub sender: UnboundedSender<P>,
}

impl<P> ChannelSubscriber<P> {
    pub fn new(name: &str, sender: UnboundedSender<P>) -> Self {
        Self {
            name: name.to_string(),
            sender,
        }
    }
}

impl<P: Clone + Send> Subscriber<P> for ChannelSubscriber<P> {
    fn receive(&self, payload: &P) -> Result<(), DeliveryError> {
        self.sender
            .send(payload.clone())
            .map_err(|_| DeliveryError::new(format!("channel for '{}' is closed", self.name)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
