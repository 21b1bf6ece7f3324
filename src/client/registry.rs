//! Consumer registry
//!
//! An explicit, owned lookup table of consumers by name. Whoever needs to
//! find consumers by name builds one and registers into it; there is no
//! global registry and constructing a `Consumer` does not register it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::debug;

use crate::client::Consumer;
use crate::utils::error::RegistryError;

pub struct ConsumerRegistry<P> {
    consumers: HashMap<String, Consumer<P>>,
}

impl<P> Default for ConsumerRegistry<P> {
    fn default() -> Self {
        Self {
            consumers: HashMap::new(),
        }
    }
}

impl<P> ConsumerRegistry<P>
where
    P: Clone + fmt::Display + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a consumer under its own name. Names must be unique.
    pub fn register(&mut self, consumer: Consumer<P>) -> Result<(), RegistryError> {
        let name = consumer.name().to_string();
        if self.consumers.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        debug!(consumer = %name, "consumer registered");
        self.consumers.insert(name, consumer);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Consumer<P>> {
        self.consumers.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&Consumer<P>, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::Missing(name.to_string()))
    }

    /// Remove a consumer and detach all of its broker registrations.
    pub fn deregister(&mut self, name: &str) -> Result<Consumer<P>, RegistryError> {
        let consumer = self
            .consumers
            .remove(name)
            .ok_or_else(|| RegistryError::Missing(name.to_string()))?;
        let removed = consumer.unsubscribe_all();
        debug!(consumer = %name, removed, "consumer deregistered");
        Ok(consumer)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.consumers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Every consumer's kept payloads, keyed by name.
    pub fn transcripts(&self) -> BTreeMap<String, Vec<P>> {
        self.consumers
            .iter()
            .map(|(name, consumer)| (name.clone(), consumer.received()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }
}
