//! Reservation gateway: correlated checks and fire-and-forget releases.

use std::sync::Arc;
use std::time::Duration;

use common::{Money, ProductId};
use messaging::{MessageBus, MessageBusExt, ProductCheckMessage, topics};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::correlation::CorrelationTable;
use crate::error::OrderError;

/// Default reservation round-trip timeout.
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

/// Outcome of a single reservation check.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// Stock was decremented; the item is held at this unit price.
    Reserved { price: Money },

    /// The inventory service declined the reservation.
    Unavailable { reason: Option<String> },

    /// No reply arrived within the timeout bound. Treated like
    /// `Unavailable` by the saga.
    TimedOut,
}

impl CheckOutcome {
    /// Returns true when the check reserved stock.
    pub fn is_reserved(&self) -> bool {
        matches!(self, CheckOutcome::Reserved { .. })
    }
}

/// Publishes reservation checks and resolves their asynchronous replies.
///
/// Every check registers a single-resolution slot in the correlation table
/// and suspends the caller until the matching reply arrives or the timeout
/// elapses, whichever is first. A reply that loses the race finds its slot
/// gone and is discarded.
pub struct ReservationGateway {
    bus: Arc<dyn MessageBus>,
    pending: CorrelationTable,
    timeout: Duration,
}

impl ReservationGateway {
    /// Creates a gateway with the default timeout.
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self::with_timeout(bus, DEFAULT_CHECK_TIMEOUT)
    }

    /// Creates a gateway with a custom per-check timeout.
    pub fn with_timeout(bus: Arc<dyn MessageBus>, timeout: Duration) -> Self {
        Self {
            bus,
            pending: CorrelationTable::new(),
            timeout,
        }
    }

    /// Number of checks currently awaiting a reply.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Issues a check-and-reserve request and waits for reply-or-timeout.
    #[tracing::instrument(skip(self), fields(product_id = %product_id))]
    pub async fn check(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CheckOutcome, OrderError> {
        let request = ProductCheckMessage::check(product_id, quantity);
        let correlation_id = request.correlation_id;

        let (slot, reply) = oneshot::channel();
        self.pending.register(correlation_id, slot);

        if let Err(error) = self
            .bus
            .publish_json(topics::PRODUCT_CHECK, &correlation_id.to_string(), &request)
            .await
        {
            self.pending.remove(&correlation_id);
            return Err(error.into());
        }

        match tokio::time::timeout(self.timeout, reply).await {
            Ok(Ok(reply)) if reply.available => match reply.price_at_order {
                Some(price) => {
                    metrics::counter!("reservation_checks_reserved_total").increment(1);
                    Ok(CheckOutcome::Reserved { price })
                }
                // an available reply must carry the reservation price
                None => Ok(CheckOutcome::Unavailable {
                    reason: reply.message,
                }),
            },
            Ok(Ok(reply)) => {
                metrics::counter!("reservation_checks_rejected_total").increment(1);
                Ok(CheckOutcome::Unavailable {
                    reason: reply.message,
                })
            }
            // slot dropped without a reply; equivalent to an absent answer
            Ok(Err(_)) => Ok(CheckOutcome::TimedOut),
            Err(_) => {
                self.pending.remove(&correlation_id);
                metrics::counter!("reservation_timeouts_total").increment(1);
                tracing::warn!(%correlation_id, "reservation check timed out");
                Ok(CheckOutcome::TimedOut)
            }
        }
    }

    /// Publishes a compensating stock release.
    ///
    /// Fire-and-forget: no reply is awaited, and the receiving side applies
    /// the credit without deduplication.
    pub async fn release(&self, product_id: ProductId, quantity: u32) -> Result<(), OrderError> {
        let message = ProductCheckMessage::release(product_id, quantity);
        metrics::counter!("stock_releases_total").increment(1);
        tracing::debug!(product_id = %message.product_id, quantity, "releasing reserved stock");
        self.bus
            .publish_json(
                topics::STOCK_RELEASE,
                &message.correlation_id.to_string(),
                &message,
            )
            .await
            .map_err(Into::into)
    }

    /// Resolves a pending check with its reply.
    ///
    /// Replies for unknown or already-settled correlation ids are discarded;
    /// the slot was removed when the check timed out or resolved earlier.
    pub fn resolve(&self, reply: ProductCheckMessage) {
        let correlation_id = reply.correlation_id;
        if !self.pending.settle(&correlation_id, reply) {
            metrics::counter!("reservation_late_replies_total").increment(1);
            tracing::debug!(%correlation_id, "discarding late or unknown check reply");
        }
    }
}

/// Spawns the consumer feeding `product-check-response` replies back into
/// the gateway's correlation table.
pub fn spawn_response_listener(
    bus: Arc<dyn MessageBus>,
    gateway: Arc<ReservationGateway>,
) -> JoinHandle<()> {
    let mut replies = bus.subscribe(topics::PRODUCT_CHECK_RESPONSE);
    tokio::spawn(async move {
        while let Some(delivery) = replies.recv().await {
            match delivery.decode::<ProductCheckMessage>() {
                Ok(reply) => gateway.resolve(reply),
                Err(error) => tracing::warn!(%error, "dropping undecodable check response"),
            }
        }
    })
}
