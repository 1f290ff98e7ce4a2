//! The order-creation saga.

use std::sync::Arc;

use common::{Money, ProductId};
use futures_util::future;
use messaging::{MessageBus, MessageBusExt, OrderCreatedEvent, topics};

use crate::access::Caller;
use crate::error::OrderError;
use crate::gateway::{CheckOutcome, ReservationGateway};
use crate::model::{Order, OrderItem};
use crate::repository::OrderRepository;

/// A line item of an incoming order request.
#[derive(Debug, Clone)]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl LineItem {
    /// Creates a line item.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Request to create an order.
#[derive(Debug, Clone)]
pub struct CreateOrderRequest {
    pub items: Vec<LineItem>,
}

/// Coordinates the order-creation saga.
///
/// One reservation check per line item is fanned out concurrently; the
/// order is persisted and announced only when every check reserved its
/// stock. On any unavailable or timed-out item, every reservation that did
/// succeed is compensated with a stock release and the attempt fails as a
/// whole. There are never partial orders.
pub struct OrderOrchestrator<R> {
    gateway: Arc<ReservationGateway>,
    repository: R,
    bus: Arc<dyn MessageBus>,
}

impl<R: OrderRepository> OrderOrchestrator<R> {
    /// Creates an orchestrator over the given gateway, repository and bus.
    pub fn new(gateway: Arc<ReservationGateway>, repository: R, bus: Arc<dyn MessageBus>) -> Self {
        Self {
            gateway,
            repository,
            bus,
        }
    }

    /// Runs the order-creation saga for one request.
    #[tracing::instrument(skip(self, request, caller), fields(items = request.items.len()))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
        caller: &Caller,
    ) -> Result<Order, OrderError> {
        let user_email = caller.identity()?.to_string();
        if request.items.is_empty() {
            return Err(OrderError::InvalidRequest("order has no items".to_string()));
        }
        if request.items.iter().any(|item| item.quantity == 0) {
            return Err(OrderError::InvalidRequest(
                "line item quantity must be positive".to_string(),
            ));
        }

        metrics::counter!("orders_attempted_total").increment(1);
        let started = std::time::Instant::now();

        // Fan out one check per line item. The total wait is bounded by the
        // slowest single check, not their sum. A failing sibling does not
        // cancel the others; they settle on their own and are compensated
        // below if they reserved stock.
        let checks = request
            .items
            .iter()
            .map(|item| self.gateway.check(item.product_id.clone(), item.quantity));
        let outcomes = future::join_all(checks).await;

        let mut reserved: Vec<(&LineItem, Money)> = Vec::new();
        let mut unavailable: Vec<ProductId> = Vec::new();
        let mut infrastructure: Option<OrderError> = None;
        for (item, outcome) in request.items.iter().zip(outcomes) {
            match outcome {
                Ok(CheckOutcome::Reserved { price }) => reserved.push((item, price)),
                Ok(CheckOutcome::Unavailable { .. }) | Ok(CheckOutcome::TimedOut) => {
                    unavailable.push(item.product_id.clone());
                }
                Err(error) => {
                    unavailable.push(item.product_id.clone());
                    if infrastructure.is_none() {
                        infrastructure = Some(error);
                    }
                }
            }
        }

        if !unavailable.is_empty() {
            self.release_reserved(&reserved).await;
            metrics::counter!("orders_rejected_total").increment(1);
            tracing::info!(unavailable = ?unavailable, "order rejected, items unavailable");
            return Err(match infrastructure {
                Some(error) => error,
                None => OrderError::ItemsUnavailable {
                    product_ids: unavailable,
                },
            });
        }

        // Build the order from the price snapshot in each reply. The catalog
        // is never consulted again for these items.
        let items = reserved
            .iter()
            .map(|(item, price)| OrderItem::new(item.product_id.clone(), item.quantity, *price))
            .collect();
        let order = Order::new(user_email, items);

        // One atomic write for the order and its items. Reservations are
        // deliberately left in place if this fails; recovery is an operator
        // action, not an automatic release.
        let order = self.repository.save(order).await?;

        let event = OrderCreatedEvent {
            order_id: order.id,
            user_email: order.user_email.clone(),
            total_price: order.total_price(),
        };
        self.bus
            .publish_json(topics::ORDER_CREATED, &order.id.to_string(), &event)
            .await?;

        metrics::counter!("orders_created_total").increment(1);
        metrics::histogram!("order_creation_seconds").record(started.elapsed().as_secs_f64());
        tracing::info!(order_id = %order.id, total_price = %order.total_price(), "order created");
        Ok(order)
    }

    /// Publishes a release for every line item that had reserved stock.
    async fn release_reserved(&self, reserved: &[(&LineItem, Money)]) {
        for (item, _) in reserved {
            if let Err(error) = self
                .gateway
                .release(item.product_id.clone(), item.quantity)
                .await
            {
                tracing::error!(product_id = %item.product_id, %error, "failed to publish stock release");
            }
        }
    }
}
