//! Scripted runs used by the `scenario` and `demo` commands.
//!
//! Each run builds its own broker and consumer registry, performs a fixed
//! sequence of subscribe/publish/dispatch calls and returns what every
//! consumer ended up with.

use std::collections::BTreeMap;

use tracing::info;

use crate::broker::{Broker, SharedBroker, lock, shared};
use crate::client::{Consumer, ConsumerRegistry, Producer, ReceiveMode};
use crate::utils::error::ScenarioError;

/// Payloads received per consumer name, ordered by name.
pub type Transcripts = BTreeMap<String, Vec<String>>;

fn dispatch(broker: &SharedBroker<String>) {
    let report = lock(broker).dispatch();
    info!(
        "Dispatched {} messages: {} deliveries, {} dropped, {} failures",
        report.messages,
        report.deliveries,
        report.dropped,
        report.failures.len()
    );
}

/// The news walkthrough: alice ends with `A, B, C`, bob with `A, B`, and
/// `D` reaches nobody.
pub fn run_scenario(mode: ReceiveMode) -> Result<Transcripts, ScenarioError> {
    let broker = shared(Broker::<String>::new());
    let news = Producer::new("news", broker.clone());
    let mut registry = ConsumerRegistry::new();
    registry.register(Consumer::with_mode("alice", broker.clone(), mode))?;
    registry.register(Consumer::with_mode("bob", broker.clone(), mode))?;
    let alice = registry.require("alice")?;
    let bob = registry.require("bob")?;

    alice.subscribe("news");
    bob.subscribe("news");
    news.publish("A".to_string());
    news.publish("B".to_string());
    dispatch(&broker);

    bob.unsubscribe("news")?;
    news.publish("C".to_string());
    dispatch(&broker);

    // Alice leaves after "D" is queued; resolution at dispatch time means
    // nobody receives it.
    news.publish("D".to_string());
    alice.unsubscribe("news")?;
    dispatch(&broker);

    Ok(registry.transcripts())
}

/// One `fftv` publisher and four consumers, delivered in a single round.
pub fn run_demo(mode: ReceiveMode) -> Result<Transcripts, ScenarioError> {
    let broker = shared(Broker::<String>::new());
    let fftv = Producer::new("fftv", broker.clone());

    let mut registry = ConsumerRegistry::new();
    for name in ["jim", "jack", "gee", "vani"] {
        registry.register(Consumer::with_mode(name, broker.clone(), mode))?;
    }
    registry.require("jim")?.subscribe("fftv");
    registry.require("jack")?.subscribe("music");
    registry.require("gee")?.subscribe("fftv");
    let vani = registry.require("vani")?;
    vani.subscribe("movie");
    vani.unsubscribe("movie")?;

    for show in [
        "cartoon", "music", "ads", "movie", "cartoon", "cartoon", "movie", "blank",
    ] {
        fftv.publish(show.to_string());
    }
    dispatch(&broker);

    Ok(registry.transcripts())
}

/// Render transcripts as pretty JSON or as one `name: a, b` line per consumer.
pub fn render_transcripts(transcripts: &Transcripts, json: bool) -> serde_json::Result<String> {
    if json {
        return serde_json::to_string_pretty(transcripts);
    }
    let lines: Vec<String> = transcripts
        .iter()
        .map(|(name, payloads)| {
            if payloads.is_empty() {
                format!("{name}: (nothing)")
            } else {
                format!("{name}: {}", payloads.join(", "))
            }
        })
        .collect();
    Ok(lines.join("\n"))
}
