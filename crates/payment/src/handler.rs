//! Idempotent handler for `order-created` events.

use std::sync::Arc;

use chrono::Utc;
use messaging::{MessageBus, MessageBusExt, OrderCreatedEvent, topics};

use crate::error::PaymentError;
use crate::model::{Payment, PaymentStatus};
use crate::policy::PaymentPolicy;
use crate::repository::PaymentRepository;

/// Creates and processes payments in reaction to created orders.
///
/// At most one payment record ever exists per order. A duplicate delivery
/// of the same `order-created` event replays the previously computed result
/// verbatim (same transaction id, amount and status) without touching the
/// repository or the policy again.
pub struct PaymentRequestHandler<R, P> {
    repository: R,
    policy: P,
    bus: Arc<dyn MessageBus>,
}

impl<R, P> PaymentRequestHandler<R, P>
where
    R: PaymentRepository,
    P: PaymentPolicy,
{
    /// Creates a handler over the given repository, policy and bus.
    pub fn new(repository: R, policy: P, bus: Arc<dyn MessageBus>) -> Self {
        Self {
            repository,
            policy,
            bus,
        }
    }

    /// Handles one `order-created` delivery.
    ///
    /// Every failure along the way is folded into a single
    /// [`PaymentError::Processing`]; the listener's recovery is at-least-once
    /// redelivery of the event.
    #[tracing::instrument(skip(self, event), fields(order_id = %event.order_id))]
    pub async fn handle_order_created(&self, event: OrderCreatedEvent) -> Result<(), PaymentError> {
        let order_id = event.order_id;
        self.process(event).await.map_err(|error| {
            metrics::counter!("payment_processing_failures_total").increment(1);
            tracing::error!(%order_id, %error, "payment processing failed");
            PaymentError::Processing {
                order_id,
                reason: error.to_string(),
            }
        })
    }

    async fn process(&self, event: OrderCreatedEvent) -> Result<(), PaymentError> {
        if let Some(existing) = self.repository.find_by_order_id(event.order_id).await? {
            tracing::warn!(order_id = %event.order_id, "duplicate payment request, replaying prior result");
            metrics::counter!("payment_duplicate_replays_total").increment(1);
            // replayed verbatim on the processed topic, whatever the stored
            // status was
            self.bus
                .publish_json(
                    topics::PAYMENT_PROCESSED,
                    &existing.order_id.to_string(),
                    &existing.to_processed_event(),
                )
                .await?;
            return Ok(());
        }

        let pending = Payment::new(event.order_id, event.user_email, event.total_price);
        let mut payment = self.repository.save(pending).await?;

        payment.status = self.policy.determine(&payment);
        payment.updated_at = Some(Utc::now());
        let payment = self.repository.save(payment).await?;

        let key = payment.order_id.to_string();
        match payment.status {
            PaymentStatus::Success => {
                self.bus
                    .publish_json(topics::PAYMENT_PROCESSED, &key, &payment.to_processed_event())
                    .await?;
            }
            _ => {
                self.bus
                    .publish_json(
                        topics::PAYMENT_FAILED,
                        &key,
                        &payment.to_failed_event("Payment declined"),
                    )
                    .await?;
            }
        }

        metrics::counter!("payments_processed_total").increment(1);
        tracing::info!(
            order_id = %payment.order_id,
            payment_id = %payment.id,
            status = %payment.status,
            "payment processed"
        );
        Ok(())
    }
}
