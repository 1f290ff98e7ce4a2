//! Core message-bus traits.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;

use crate::error::BusError;

/// A message delivered on a topic.
///
/// The payload is carried as JSON; consumers decode it into the typed
/// contract for their topic.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Topic the message was published on.
    pub topic: String,
    /// Partitioning/correlation key chosen by the producer.
    pub key: String,
    /// JSON-encoded message body.
    pub payload: serde_json::Value,
}

impl Delivery {
    /// Decodes the payload into a typed message.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, BusError> {
        serde_json::from_value(self.payload.clone()).map_err(|source| BusError::Decode {
            topic: self.topic.clone(),
            source,
        })
    }
}

/// A consumer's handle on one topic.
pub struct Subscription {
    receiver: broadcast::Receiver<Delivery>,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<Delivery>) -> Self {
        Self { receiver }
    }

    /// Receives the next delivery.
    ///
    /// Deliveries dropped because this consumer lagged are skipped with a
    /// warning. Returns `None` once the topic channel is closed.
    pub async fn recv(&mut self) -> Option<Delivery> {
        loop {
            match self.receiver.recv().await {
                Ok(delivery) => return Some(delivery),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagged, deliveries dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Transport seam between services.
///
/// Delivery semantics are at-least-once: consumers must tolerate duplicates
/// and reordering. Publishing to a topic nobody subscribes to succeeds and
/// drops the message, matching fire-and-forget producers.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publishes a message on a topic.
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: serde_json::Value,
    ) -> Result<(), BusError>;

    /// Subscribes to a topic, receiving every message published after this
    /// call.
    fn subscribe(&self, topic: &str) -> Subscription;
}

/// Extension trait providing typed publishing on any bus.
#[async_trait]
pub trait MessageBusExt: MessageBus {
    /// Serializes `message` and publishes it on `topic`.
    async fn publish_json<M>(&self, topic: &str, key: &str, message: &M) -> Result<(), BusError>
    where
        M: Serialize + Sync,
    {
        let payload = serde_json::to_value(message).map_err(|source| BusError::Encode {
            topic: topic.to_string(),
            source,
        })?;
        self.publish(topic, key, payload).await
    }
}

// Blanket implementation for all bus implementations
impl<T: MessageBus + ?Sized> MessageBusExt for T {}
