use std::sync::{Arc, Mutex};

use super::message::{Message, MessageQueue};
use super::topic::SubscriptionTable;
use super::{Broker, DispatchReport, Subscriber, SubscriberRef, lock, shared};
use crate::utils::error::{DeliveryError, NotFoundError};

struct Recorder {
    name: String,
    received: Mutex<Vec<String>>,
}

impl Subscriber<String> for Recorder {
    fn receive(&self, payload: &String) -> Result<(), DeliveryError> {
        self.received.lock().unwrap().push(payload.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Recorder {
    fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

struct Failing;

impl Subscriber<String> for Failing {
    fn receive(&self, payload: &String) -> Result<(), DeliveryError> {
        Err(DeliveryError::new(format!("cannot handle {payload}")))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

fn recorder(name: &str) -> (Arc<Recorder>, SubscriberRef<String>) {
    let recorder = Arc::new(Recorder {
        name: name.to_string(),
        received: Mutex::new(Vec::new()),
    });
    let handle: SubscriberRef<String> = recorder.clone();
    (recorder, handle)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_table_add_and_list_preserves_order() {
    let mut table = SubscriptionTable::new();
    let (_, a) = recorder("a");
    let (_, b) = recorder("b");
    table.add_binding("news", a.clone());
    table.add_binding("news", b.clone());

    let names: Vec<&str> = table.list_bindings("news").iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(table.topics(), vec!["news".to_string()]);
}

#[test]
fn test_table_list_unknown_topic_is_empty() {
    let table: SubscriptionTable<String> = SubscriptionTable::new();
    assert!(table.list_bindings("nowhere").is_empty());
    assert!(table.is_empty());
}

#[test]
fn test_table_remove_binding_removes_first_match_only() {
    let mut table = SubscriptionTable::new();
    let (_, a) = recorder("a");
    let (_, b) = recorder("b");
    table.add_binding("news", a.clone());
    table.add_binding("news", b.clone());
    table.add_binding("news", a.clone());

    table.remove_binding("news", &a).unwrap();

    let names: Vec<&str> = table.list_bindings("news").iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["b", "a"]);
}

#[test]
fn test_table_remove_binding_errors() {
    let mut table = SubscriptionTable::new();
    let (_, a) = recorder("a");
    let (_, b) = recorder("b");

    assert_eq!(
        table.remove_binding("news", &a),
        Err(NotFoundError::UnknownTopic {
            topic: "news".to_string()
        })
    );

    table.add_binding("news", a.clone());
    assert_eq!(
        table.remove_binding("news", &b),
        Err(NotFoundError::NotSubscribed {
            topic: "news".to_string(),
            subscriber: "b".to_string(),
        })
    );
}

#[test]
fn test_table_prunes_empty_topics() {
    let mut table = SubscriptionTable::new();
    let (_, a) = recorder("a");
    table.add_binding("news", a.clone());
    table.remove_binding("news", &a).unwrap();

    assert!(table.topics().is_empty());
    assert!(matches!(
        table.remove_binding("news", &a),
        Err(NotFoundError::UnknownTopic { .. })
    ));
}

#[test]
fn test_identity_is_by_reference_not_by_name() {
    let mut table = SubscriptionTable::new();
    let (_, first) = recorder("twin");
    let (_, second) = recorder("twin");
    table.add_binding("news", first.clone());

    assert!(table.remove_binding("news", &second).is_err());
    assert!(table.remove_binding("news", &first).is_ok());
}

#[test]
fn test_queue_drain_all_empties_in_fifo_order() {
    let mut queue = MessageQueue::new();
    queue.append(Message::new("a", 1, 0));
    queue.append(Message::new("b", 2, 1));
    assert_eq!(queue.len(), 2);

    let drained: Vec<i32> = queue.drain_all().into_iter().map(|m| m.payload).collect();
    assert_eq!(drained, vec![1, 2]);
    assert!(queue.is_empty());
    assert!(queue.drain_all().is_empty());
}

#[test]
fn test_broker_new() {
    let broker: Broker<String> = Broker::default();
    assert_eq!(broker.pending(), 0);
    assert!(broker.is_idle());
    assert!(broker.topics().is_empty());
}

#[test]
fn test_enqueue_does_not_deliver() {
    let mut broker = Broker::new();
    let (alice, handle) = recorder("alice");
    broker.subscribe("news", handle);

    broker.enqueue("news", "A".to_string());

    assert!(alice.received().is_empty());
    assert_eq!(broker.pending(), 1);
}

#[test]
fn test_enqueue_assigns_increasing_sequence_numbers() {
    let mut broker = Broker::new();
    let first = broker.enqueue("a", "x".to_string());
    let second = broker.enqueue("unknown", "y".to_string());
    assert_eq!(second, first + 1);

    let sequences: Vec<u64> = broker.queued().map(|m| m.sequence).collect();
    assert_eq!(sequences, vec![first, second]);
}

#[test]
fn test_fifo_per_topic() {
    let mut broker = Broker::new();
    let (alice, handle) = recorder("alice");
    broker.subscribe("news", handle);

    for payload in ["1", "2", "3", "4"] {
        broker.enqueue("news", payload.to_string());
    }
    let report = broker.dispatch();

    assert_eq!(alice.received(), strings(&["1", "2", "3", "4"]));
    assert_eq!(report.messages, 4);
    assert_eq!(report.deliveries, 4);
}

#[test]
fn test_dispatch_follows_global_publish_order_across_topics() {
    let mut broker = Broker::new();
    let (alice, handle) = recorder("alice");
    broker.subscribe("a", handle.clone());
    broker.subscribe("b", handle);

    broker.enqueue("a", "a1".to_string());
    broker.enqueue("b", "b1".to_string());
    broker.enqueue("a", "a2".to_string());
    let _ = broker.dispatch();

    assert_eq!(alice.received(), strings(&["a1", "b1", "a2"]));
}

// Recipients are resolved at dispatch time. Leaving after enqueue suppresses
// delivery; this is the contract, not a bug.
#[test]
fn test_late_binding_unsubscribe_suppresses_delivery() {
    let mut broker = Broker::new();
    let (alice, handle) = recorder("alice");
    broker.subscribe("news", handle.clone());

    broker.enqueue("news", "D".to_string());
    broker.unsubscribe("news", &handle).unwrap();
    let report = broker.dispatch();

    assert!(alice.received().is_empty());
    assert_eq!(report.dropped, 1);
}

#[test]
fn test_catch_up_subscribe_receives_queued_message() {
    let mut broker = Broker::new();
    let (bob, handle) = recorder("bob");

    broker.enqueue("news", "early".to_string());
    broker.subscribe("news", handle);
    let _ = broker.dispatch();

    assert_eq!(bob.received(), strings(&["early"]));
}

#[test]
fn test_double_subscription_delivers_twice() {
    let mut broker = Broker::new();
    let (alice, handle) = recorder("alice");
    broker.subscribe("news", handle.clone());
    broker.subscribe("news", handle.clone());

    broker.enqueue("news", "A".to_string());
    let report = broker.dispatch();
    assert_eq!(alice.received(), strings(&["A", "A"]));
    assert_eq!(report.deliveries, 2);

    // one unsubscribe removes exactly one registration
    broker.unsubscribe("news", &handle).unwrap();
    broker.enqueue("news", "B".to_string());
    let _ = broker.dispatch();
    assert_eq!(alice.received(), strings(&["A", "A", "B"]));
}

#[test]
fn test_dispatch_is_idempotent_once_drained() {
    let mut broker = Broker::new();
    let (alice, handle) = recorder("alice");
    broker.subscribe("news", handle);

    assert_eq!(broker.dispatch(), DispatchReport::default());

    broker.enqueue("news", "A".to_string());
    let _ = broker.dispatch();
    let second = broker.dispatch();

    assert_eq!(alice.received(), strings(&["A"]));
    assert_eq!(second.messages, 0);
    assert!(broker.is_idle());
}

#[test]
fn test_unsubscribe_unknown_topic_is_not_found() {
    let mut broker: Broker<String> = Broker::new();
    let (_, handle) = recorder("s");

    let err = broker.unsubscribe("missing", &handle).unwrap_err();
    assert!(matches!(err, NotFoundError::UnknownTopic { .. }));
    assert_eq!(err.topic(), "missing");
}

#[test]
fn test_unsubscribe_unbound_subscriber_is_not_found() {
    let mut broker = Broker::new();
    let (_, alice) = recorder("alice");
    let (_, bob) = recorder("bob");
    broker.subscribe("news", alice);

    let err = broker.unsubscribe("news", &bob).unwrap_err();
    assert_eq!(
        err.to_string(),
        "subscriber 'bob' is not bound to topic 'news'"
    );
    assert_eq!(broker.subscriber_count("news"), 1);
}

#[test]
fn test_message_without_subscribers_is_dropped() {
    let mut broker: Broker<String> = Broker::new();
    broker.enqueue("void", "hello".to_string());

    let report = broker.dispatch();
    assert_eq!(report.messages, 1);
    assert_eq!(report.dropped, 1);
    assert_eq!(report.deliveries, 0);
    assert!(broker.is_idle());
}

#[test]
fn test_failing_subscriber_does_not_block_others() {
    let mut broker: Broker<String> = Broker::new();
    let (alice, handle) = recorder("alice");
    broker.subscribe("news", Arc::new(Failing));
    broker.subscribe("news", handle);

    broker.enqueue("news", "A".to_string());
    broker.enqueue("news", "B".to_string());
    let report = broker.dispatch();

    assert_eq!(alice.received(), strings(&["A", "B"]));
    assert_eq!(report.deliveries, 2);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].subscriber, "failing");
    assert_eq!(report.failures[0].reason, "cannot handle A");
    assert_eq!(report.failures[1].sequence, 1);
    assert!(broker.is_idle());

    let err = report.into_result().unwrap_err();
    assert_eq!(err.failures.len(), 2);
}

#[test]
fn test_clean_report_into_result_is_ok() {
    let mut broker = Broker::new();
    let (_, handle) = recorder("alice");
    broker.subscribe("news", handle);
    broker.enqueue("news", "A".to_string());

    let report = broker.dispatch();
    assert!(report.is_clean());
    assert_eq!(report.into_result().unwrap().deliveries, 1);
}

#[test]
fn test_closure_subscriber() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let handle: SubscriberRef<u32> = Arc::new(move |n: &u32| {
        sink.lock().unwrap().push(*n * 10);
        Ok::<(), DeliveryError>(())
    });

    let mut broker = Broker::new();
    broker.subscribe("numbers", handle);
    broker.enqueue("numbers", 1);
    broker.enqueue("numbers", 2);
    let _ = broker.dispatch();

    assert_eq!(*seen.lock().unwrap(), vec![10, 20]);
}

#[test]
fn test_unsubscribe_all_cleans_every_topic() {
    let mut broker = Broker::new();
    let (alice, alice_handle) = recorder("alice");
    let (_, bob_handle) = recorder("bob");
    broker.subscribe("news", alice_handle.clone());
    broker.subscribe("news", alice_handle.clone());
    broker.subscribe("sport", alice_handle.clone());
    broker.subscribe("sport", bob_handle);

    assert_eq!(broker.unsubscribe_all(&alice_handle), 3);
    assert_eq!(broker.topics(), vec!["sport".to_string()]);
    assert_eq!(broker.subscriber_count("sport"), 1);

    broker.enqueue("news", "x".to_string());
    let _ = broker.dispatch();
    assert!(alice.received().is_empty());
}

#[test]
fn test_shared_lock_recovers_from_poison() {
    let broker = shared(Broker::<String>::new());
    let poisoner = broker.clone();
    let result = std::thread::spawn(move || {
        let _guard = poisoner.lock().unwrap();
        panic!("subscriber blew up");
    })
    .join();
    assert!(result.is_err());

    let mut guard = lock(&broker);
    guard.enqueue("news", "still works".to_string());
    assert_eq!(guard.pending(), 1);
}

#[test]
fn test_report_and_queued_messages_serialize() {
    let mut broker: Broker<String> = Broker::new();
    broker.subscribe("news", Arc::new(Failing));
    broker.enqueue("news", "A".to_string());
    broker.enqueue("news", "B".to_string());

    let queued: Vec<_> = broker
        .queued()
        .map(|message| serde_json::to_value(message).unwrap())
        .collect();
    assert_eq!(queued[0]["topic"], "news");
    assert_eq!(queued[0]["payload"], "A");
    assert_eq!(queued[0]["sequence"], 0);
    assert_eq!(queued[1]["sequence"], 1);

    let first_at = queued[0]["enqueued_at"].as_i64().expect("enqueued_at missing");
    let second_at = queued[1]["enqueued_at"].as_i64().expect("enqueued_at missing");
    assert!(first_at > 0);
    assert!(second_at >= first_at);

    let report = serde_json::to_value(broker.dispatch()).unwrap();
    assert_eq!(report["messages"], 2);
    assert_eq!(report["failures"][0]["subscriber"], "failing");
    assert_eq!(report["failures"][0]["reason"], "cannot handle A");
    assert_eq!(report["failures"][1]["reason"], "cannot handle B");
}
