//! Subscription table
//!
//! Maps a topic name to the ordered list of registrations for it. Unlike a
//! set, the list keeps duplicates: a subscriber bound twice to one topic holds
//! two registrations and is delivered to twice. Insertion order is delivery
//! order. Nothing is promised about ordering across topics.
//!
//! Topics with no remaining registrations are pruned, so "unknown topic" and
//! "topic whose last subscriber left" are the same state.

use std::collections::HashMap;
use std::fmt;

use crate::broker::subscriber::{SubscriberRef, same_subscriber};
use crate::utils::error::NotFoundError;

pub type TopicName = String;

pub struct SubscriptionTable<P> {
    bindings: HashMap<TopicName, Vec<SubscriberRef<P>>>,
}

impl<P> Default for SubscriptionTable<P> {
    fn default() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }
}

impl<P> SubscriptionTable<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a registration, creating the topic's list if needed.
    pub fn add_binding(&mut self, topic: &str, subscriber: SubscriberRef<P>) {
        self.bindings
            .entry(topic.to_string())
            .or_default()
            .push(subscriber);
    }

    /// Remove the first registration of `subscriber` under `topic`.
    ///
    /// The relative order of the remaining registrations is preserved.
    pub fn remove_binding(
        &mut self,
        topic: &str,
        subscriber: &SubscriberRef<P>,
    ) -> Result<(), NotFoundError> {
        let Some(list) = self.bindings.get_mut(topic) else {
            return Err(NotFoundError::UnknownTopic {
                topic: topic.to_string(),
            });
        };

        let Some(index) = list.iter().position(|s| same_subscriber(s, subscriber)) else {
            return Err(NotFoundError::NotSubscribed {
                topic: topic.to_string(),
                subscriber: subscriber.name().to_string(),
            });
        };

        list.remove(index);
        if list.is_empty() {
            self.bindings.remove(topic);
        }
        Ok(())
    }

    /// Registrations for `topic` in delivery order; empty for unknown topics.
    pub fn list_bindings(&self, topic: &str) -> &[SubscriberRef<P>] {
        self.bindings.get(topic).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Drop every registration of `subscriber` on every topic.
    ///
    /// Returns how many registrations were removed.
    pub fn remove_everywhere(&mut self, subscriber: &SubscriberRef<P>) -> usize {
        let mut removed = 0;
        self.bindings.retain(|_, list| {
            let before = list.len();
            list.retain(|s| !same_subscriber(s, subscriber));
            removed += before - list.len();
            !list.is_empty()
        });
        removed
    }

    pub fn binding_count(&self, topic: &str) -> usize {
        self.list_bindings(topic).len()
    }

    /// Topics that currently have at least one registration, sorted.
    pub fn topics(&self) -> Vec<TopicName> {
        let mut topics: Vec<_> = self.bindings.keys().cloned().collect();
        topics.sort();
        topics
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<P> fmt::Debug for SubscriptionTable<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for topic in self.topics() {
            let names: Vec<&str> = self.list_bindings(&topic).iter().map(|s| s.name()).collect();
            map.entry(&topic, &names);
        }
        map.finish()
    }
}
