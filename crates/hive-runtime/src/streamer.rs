//! Topic streamer.
//!
//! The streamer owns the worker's topic map: topic name → the sinks of
//! every connection currently subscribed. Publishing fans the value out
//! to the subscribers present *right now*: no replay, no buffering, a
//! subscriber that joins later misses earlier values.
//!
//! # Delivery Semantics
//!
//! `publish` is synchronous and never awaits a subscriber:
//!
//! - a sink with a full queue is skipped (slow consumers lose values,
//!   they cannot stall the publisher)
//! - a sink whose connection is gone is skipped
//! - the returned count is the number of sinks that accepted the value
//!
//! The topic map is shared by every connection task and the application's
//! [`Publisher`] handle, so access is serialized behind a mutex. Topics
//! exist only while someone is subscribed; the last unsubscribe removes
//! the entry.

use std::collections::HashMap;

use hive_app::Publisher;
use hive_proto::Frame;
use hive_types::{ConnectionId, SubscriptionId};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// One subscriber entry: the subscription handle plus the owning
/// connection's outbound frame queue.
#[derive(Debug, Clone)]
struct Subscriber {
    id: SubscriptionId,
    connection: ConnectionId,
    sink: mpsc::Sender<Frame>,
}

/// Best-effort pub/sub fan-out over the worker's connections.
///
/// # Example
///
/// ```
/// use hive_runtime::CallStreamer;
/// use hive_types::ConnectionId;
/// use serde_json::json;
/// use tokio::sync::mpsc;
///
/// let streamer = CallStreamer::new();
/// let (sink, mut events) = mpsc::channel(8);
///
/// let sub = streamer.subscribe("ticks", ConnectionId::new(), sink);
/// assert_eq!(streamer.publish("ticks", &json!(1)), 1);
///
/// streamer.unsubscribe(sub);
/// assert_eq!(streamer.publish("ticks", &json!(2)), 0);
/// # let _ = events.try_recv();
/// ```
#[derive(Debug, Default)]
pub struct CallStreamer {
    topics: Mutex<HashMap<String, Vec<Subscriber>>>,
}

impl CallStreamer {
    /// Creates a streamer with no topics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `sink` to `topic` and returns the subscription handle.
    ///
    /// The first subscriber creates the topic.
    pub fn subscribe(
        &self,
        topic: impl Into<String>,
        connection: ConnectionId,
        sink: mpsc::Sender<Frame>,
    ) -> SubscriptionId {
        let topic = topic.into();
        let id = SubscriptionId::new();
        self.topics
            .lock()
            .entry(topic.clone())
            .or_default()
            .push(Subscriber {
                id,
                connection,
                sink,
            });
        debug!(%topic, subscription = %id, %connection, "subscribed");
        id
    }

    /// Removes one subscription. A stale or unknown id is a no-op, so
    /// connection teardown may race with an explicit unsubscribe.
    pub fn unsubscribe(&self, subscription: SubscriptionId) {
        let mut topics = self.topics.lock();
        for subscribers in topics.values_mut() {
            subscribers.retain(|sub| sub.id != subscription);
        }
        topics.retain(|_, subscribers| !subscribers.is_empty());
        debug!(subscription = %subscription, "unsubscribed");
    }

    /// Removes every subscription held by `connection`.
    ///
    /// Called on socket close; built on the same idempotent removal as
    /// [`unsubscribe`](Self::unsubscribe).
    pub fn release_connection(&self, connection: ConnectionId) {
        let mut topics = self.topics.lock();
        let before: usize = topics.values().map(Vec::len).sum();
        for subscribers in topics.values_mut() {
            subscribers.retain(|sub| sub.connection != connection);
        }
        topics.retain(|_, subscribers| !subscribers.is_empty());
        let after: usize = topics.values().map(Vec::len).sum();
        if before != after {
            debug!(%connection, released = before - after, "connection subscriptions released");
        }
    }

    /// Fans `value` out to every sink subscribed to `topic` right now.
    ///
    /// Returns how many sinks accepted the value. Publishing to a topic
    /// nobody subscribed is a no-op returning `0`.
    pub fn publish(&self, topic: &str, value: &Value) -> usize {
        let topics = self.topics.lock();
        let Some(subscribers) = topics.get(topic) else {
            return 0;
        };

        let mut delivered = 0;
        for sub in subscribers {
            let event = Frame::Event {
                subscription: sub.id,
                topic: topic.to_string(),
                value: value.clone(),
            };
            match sub.sink.try_send(event) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(%topic, subscription = %sub.id, "subscriber queue full, value dropped");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!(%topic, subscription = %sub.id, "subscriber gone, value dropped");
                }
            }
        }
        debug!(%topic, delivered, "published");
        delivered
    }

    /// Returns how many sinks are subscribed to `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.lock().get(topic).map_or(0, Vec::len)
    }

    /// Returns how many topics currently have subscribers.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics.lock().len()
    }
}

impl Publisher for CallStreamer {
    fn publish(&self, topic: &str, value: &Value) -> usize {
        CallStreamer::publish(self, topic, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn sink(capacity: usize) -> (mpsc::Sender<Frame>, mpsc::Receiver<Frame>) {
        mpsc::channel(capacity)
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_noop() {
        let streamer = CallStreamer::new();
        assert_eq!(streamer.publish("ticks", &json!(1)), 0);
        assert_eq!(streamer.topic_count(), 0);
    }

    #[tokio::test]
    async fn subscribe_then_publish_delivers_event() {
        let streamer = CallStreamer::new();
        let (tx, mut rx) = sink(8);
        let connection = ConnectionId::new();

        let sub = streamer.subscribe("ticks", connection, tx);
        assert_eq!(streamer.publish("ticks", &json!({"n": 1})), 1);

        match rx.recv().await.expect("event should arrive") {
            Frame::Event {
                subscription,
                topic,
                value,
            } => {
                assert_eq!(subscription, sub);
                assert_eq!(topic, "ticks");
                assert_eq!(value, json!({"n": 1}));
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[tokio::test]
    async fn fan_out_counts_every_accepting_sink() {
        let streamer = CallStreamer::new();
        let (tx_a, mut rx_a) = sink(8);
        let (tx_b, mut rx_b) = sink(8);

        streamer.subscribe("ticks", ConnectionId::new(), tx_a);
        streamer.subscribe("ticks", ConnectionId::new(), tx_b);

        assert_eq!(streamer.publish("ticks", &json!(7)), 2);
        assert!(matches!(rx_a.recv().await, Some(Frame::Event { .. })));
        assert!(matches!(rx_b.recv().await, Some(Frame::Event { .. })));
    }

    #[tokio::test]
    async fn late_subscriber_misses_earlier_publish() {
        let streamer = CallStreamer::new();
        let (tx_early, mut rx_early) = sink(8);
        streamer.subscribe("ticks", ConnectionId::new(), tx_early);

        streamer.publish("ticks", &json!("first"));

        let (tx_late, mut rx_late) = sink(8);
        streamer.subscribe("ticks", ConnectionId::new(), tx_late);
        streamer.publish("ticks", &json!("second"));

        // Early subscriber saw both values, the late one only the second.
        assert!(matches!(rx_early.recv().await, Some(Frame::Event { value, .. }) if value == json!("first")));
        assert!(matches!(rx_early.recv().await, Some(Frame::Event { value, .. }) if value == json!("second")));
        assert!(matches!(rx_late.recv().await, Some(Frame::Event { value, .. }) if value == json!("second")));
        assert!(rx_late.try_recv().is_err());
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent() {
        let streamer = CallStreamer::new();
        let (tx, _rx) = sink(8);
        let sub = streamer.subscribe("ticks", ConnectionId::new(), tx);

        streamer.unsubscribe(sub);
        streamer.unsubscribe(sub);
        streamer.unsubscribe(SubscriptionId::new());

        assert_eq!(streamer.subscriber_count("ticks"), 0);
        assert_eq!(streamer.topic_count(), 0);
        assert_eq!(streamer.publish("ticks", &json!(1)), 0);
    }

    #[tokio::test]
    async fn full_queue_is_skipped_not_awaited() {
        let streamer = CallStreamer::new();
        let (tx, mut rx) = sink(1);
        streamer.subscribe("ticks", ConnectionId::new(), tx);

        assert_eq!(streamer.publish("ticks", &json!(1)), 1);
        // Queue now full; the second publish must drop, not block.
        assert_eq!(streamer.publish("ticks", &json!(2)), 0);

        assert!(matches!(rx.recv().await, Some(Frame::Event { value, .. }) if value == json!(1)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn closed_sink_is_skipped() {
        let streamer = CallStreamer::new();
        let (tx, rx) = sink(8);
        streamer.subscribe("ticks", ConnectionId::new(), tx);
        drop(rx);

        assert_eq!(streamer.publish("ticks", &json!(1)), 0);
    }

    #[tokio::test]
    async fn release_connection_drops_every_subscription() {
        let streamer = CallStreamer::new();
        let connection = ConnectionId::new();
        let (tx, _rx) = sink(8);
        let (other_tx, mut other_rx) = sink(8);

        streamer.subscribe("ticks", connection, tx.clone());
        streamer.subscribe("logs", connection, tx);
        streamer.subscribe("ticks", ConnectionId::new(), other_tx);

        streamer.release_connection(connection);
        // Releasing again is a no-op.
        streamer.release_connection(connection);

        assert_eq!(streamer.subscriber_count("ticks"), 1);
        assert_eq!(streamer.subscriber_count("logs"), 0);
        assert_eq!(streamer.topic_count(), 1);
        assert_eq!(streamer.publish("ticks", &json!(1)), 1);
        assert!(matches!(other_rx.recv().await, Some(Frame::Event { .. })));
    }

    #[tokio::test]
    async fn publishes_through_publisher_seam() {
        let streamer = Arc::new(CallStreamer::new());
        let (tx, mut rx) = sink(8);
        streamer.subscribe("ticks", ConnectionId::new(), tx);

        let publisher: Arc<dyn Publisher> = streamer;
        assert_eq!(publisher.publish("ticks", &json!(42)), 1);
        assert!(matches!(rx.recv().await, Some(Frame::Event { value, .. }) if value == json!(42)));
    }
}
