//! Order status projection from asynchronous payment results.

use std::sync::Arc;

use common::OrderId;
use messaging::{
    MessageBus, MessageBusExt, PaymentFailedEvent, PaymentProcessedEvent, ProductCheckMessage,
    topics,
};
use tokio::task::JoinHandle;

use crate::access::Caller;
use crate::error::OrderError;
use crate::model::Order;
use crate::repository::OrderRepository;
use crate::status::OrderStatus;

/// Applies payment-result events and explicit cancellations to order state.
///
/// Runs independently of the synchronous creation path: events arrive over
/// the bus whenever the payment service gets around to them.
pub struct OrderStatusProjector<R> {
    repository: R,
    bus: Arc<dyn MessageBus>,
}

impl<R: OrderRepository> OrderStatusProjector<R> {
    /// Creates a projector over the given repository and bus.
    pub fn new(repository: R, bus: Arc<dyn MessageBus>) -> Self {
        Self { repository, bus }
    }

    /// Applies a `payment-processed` event: SUCCESS pays the order, any
    /// other final status fails it.
    #[tracing::instrument(skip(self, event), fields(order_id = %event.order_id))]
    pub async fn handle_payment_processed(
        &self,
        event: &PaymentProcessedEvent,
    ) -> Result<(), OrderError> {
        let status = if event.status == "SUCCESS" {
            OrderStatus::Paid
        } else {
            OrderStatus::Failed
        };
        self.transition(event.order_id, status).await
    }

    /// Applies a `payment-failed` event: the payment can be retried, the
    /// order keeps waiting.
    #[tracing::instrument(skip(self, event), fields(order_id = %event.order_id))]
    pub async fn handle_payment_failed(
        &self,
        event: &PaymentFailedEvent,
    ) -> Result<(), OrderError> {
        self.transition(event.order_id, OrderStatus::WaitingForPayment)
            .await
    }

    async fn transition(&self, order_id: OrderId, status: OrderStatus) -> Result<(), OrderError> {
        let mut order = self
            .repository
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        let previous = order.status;
        order.status = status;
        self.repository.save(order).await?;

        metrics::counter!("order_status_transitions_total").increment(1);
        tracing::info!(%order_id, %previous, %status, "order status updated");
        Ok(())
    }

    /// Cancels an order, compensating its reservations first.
    ///
    /// Allowed for the owner or an admin, from any status that is neither
    /// terminal nor `Delivered`. One stock release is published per line
    /// item before the status flips to `Cancelled`.
    #[tracing::instrument(skip(self, caller))]
    pub async fn cancel_order(&self, order_id: OrderId, caller: &Caller) -> Result<Order, OrderError> {
        let mut order = self
            .repository
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        if !caller.may_act_on(&order.user_email) {
            return Err(OrderError::AccessDenied(
                "only admin or the order owner can cancel an order".to_string(),
            ));
        }
        if !order.status.can_cancel() {
            return Err(OrderError::CancellationNotAllowed(order.status));
        }

        // return the reserved stock before the status flip
        for item in &order.items {
            let message = ProductCheckMessage::release(item.product_id.clone(), item.quantity);
            self.bus
                .publish_json(
                    topics::STOCK_RELEASE,
                    &message.correlation_id.to_string(),
                    &message,
                )
                .await?;
        }

        order.status = OrderStatus::Cancelled;
        let order = self.repository.save(order).await?;

        metrics::counter!("orders_cancelled_total").increment(1);
        tracing::info!(%order_id, "order cancelled");
        Ok(order)
    }
}

/// Spawns the payment-result consumers feeding a projector.
///
/// Missing orders and repository failures are logged; the events will come
/// around again on redelivery.
pub fn spawn_payment_listeners<R>(
    bus: Arc<dyn MessageBus>,
    projector: Arc<OrderStatusProjector<R>>,
) -> Vec<JoinHandle<()>>
where
    R: OrderRepository + 'static,
{
    let mut processed = bus.subscribe(topics::PAYMENT_PROCESSED);
    let mut failed = bus.subscribe(topics::PAYMENT_FAILED);

    let processed_task = {
        let projector = Arc::clone(&projector);
        tokio::spawn(async move {
            while let Some(delivery) = processed.recv().await {
                match delivery.decode::<PaymentProcessedEvent>() {
                    Ok(event) => {
                        if let Err(error) = projector.handle_payment_processed(&event).await {
                            tracing::error!(%error, "failed to apply payment result");
                        }
                    }
                    Err(error) => {
                        tracing::warn!(%error, "dropping undecodable payment-processed event");
                    }
                }
            }
        })
    };

    let failed_task = tokio::spawn(async move {
        while let Some(delivery) = failed.recv().await {
            match delivery.decode::<PaymentFailedEvent>() {
                Ok(event) => {
                    if let Err(error) = projector.handle_payment_failed(&event).await {
                        tracing::error!(%error, "failed to apply payment failure");
                    }
                }
                Err(error) => tracing::warn!(%error, "dropping undecodable payment-failed event"),
            }
        }
    });

    vec![processed_task, failed_task]
}
