//! In-memory message bus for testing and single-process deployments.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::bus::{Delivery, MessageBus, Subscription};
use crate::error::BusError;

const CHANNEL_CAPACITY: usize = 256;

/// In-memory bus backed by one broadcast channel per topic.
///
/// Every subscriber sees every message published after it subscribed.
/// Messages published to a topic with no live subscribers are dropped,
/// which matches the fire-and-forget contract of [`MessageBus::publish`].
#[derive(Clone, Default)]
pub struct InMemoryBus {
    topics: Arc<Mutex<HashMap<String, broadcast::Sender<Delivery>>>>,
}

impl InMemoryBus {
    /// Creates a new bus with no topics.
    pub fn new() -> Self {
        Self::default()
    }

    fn sender(&self, topic: &str) -> broadcast::Sender<Delivery> {
        self.topics
            .lock()
            .unwrap()
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: serde_json::Value,
    ) -> Result<(), BusError> {
        let delivery = Delivery {
            topic: topic.to_string(),
            key: key.to_string(),
            payload,
        };
        // a send with no receivers is a successful fire-and-forget
        let _ = self.sender(topic).send(delivery);
        tracing::trace!(topic, key, "published message");
        Ok(())
    }

    fn subscribe(&self, topic: &str) -> Subscription {
        Subscription::new(self.sender(topic).subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::MessageBusExt;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Ping {
        seq: u32,
    }

    #[tokio::test]
    async fn subscriber_receives_published_message() {
        let bus = InMemoryBus::new();
        let mut subscription = bus.subscribe("ping");

        bus.publish_json("ping", "k1", &Ping { seq: 1 }).await.unwrap();

        let delivery = subscription.recv().await.unwrap();
        assert_eq!(delivery.topic, "ping");
        assert_eq!(delivery.key, "k1");
        assert_eq!(delivery.decode::<Ping>().unwrap(), Ping { seq: 1 });
    }

    #[tokio::test]
    async fn publish_without_subscribers_succeeds() {
        let bus = InMemoryBus::new();
        bus.publish_json("nobody-listens", "k", &Ping { seq: 7 })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn each_subscriber_sees_every_message() {
        let bus = InMemoryBus::new();
        let mut first = bus.subscribe("ping");
        let mut second = bus.subscribe("ping");

        bus.publish_json("ping", "k", &Ping { seq: 42 }).await.unwrap();

        assert_eq!(first.recv().await.unwrap().decode::<Ping>().unwrap().seq, 42);
        assert_eq!(second.recv().await.unwrap().decode::<Ping>().unwrap().seq, 42);
    }

    #[tokio::test]
    async fn subscriber_does_not_see_earlier_messages() {
        let bus = InMemoryBus::new();
        bus.publish_json("ping", "k", &Ping { seq: 1 }).await.unwrap();

        let mut late = bus.subscribe("ping");
        bus.publish_json("ping", "k", &Ping { seq: 2 }).await.unwrap();

        assert_eq!(late.recv().await.unwrap().decode::<Ping>().unwrap().seq, 2);
    }

    #[tokio::test]
    async fn topics_are_isolated() {
        let bus = InMemoryBus::new();
        let mut pings = bus.subscribe("ping");

        bus.publish_json("pong", "k", &Ping { seq: 1 }).await.unwrap();
        bus.publish_json("ping", "k", &Ping { seq: 2 }).await.unwrap();

        assert_eq!(pings.recv().await.unwrap().decode::<Ping>().unwrap().seq, 2);
    }
}
