//! Bus consumer for the payment service.

use std::sync::Arc;

use messaging::{MessageBus, OrderCreatedEvent, topics};
use tokio::task::JoinHandle;

use crate::handler::PaymentRequestHandler;
use crate::policy::PaymentPolicy;
use crate::repository::PaymentRepository;

/// Spawns the `order-created` consumer feeding the payment handler.
///
/// Handler errors are logged and the consumer keeps running; redelivery of
/// the failed event is the transport's responsibility.
pub fn spawn_listener<R, P>(
    bus: Arc<dyn MessageBus>,
    handler: Arc<PaymentRequestHandler<R, P>>,
) -> JoinHandle<()>
where
    R: PaymentRepository + 'static,
    P: PaymentPolicy + 'static,
{
    let mut orders = bus.subscribe(topics::ORDER_CREATED);
    tokio::spawn(async move {
        while let Some(delivery) = orders.recv().await {
            let event: OrderCreatedEvent = match delivery.decode() {
                Ok(event) => event,
                Err(error) => {
                    tracing::warn!(%error, "dropping undecodable order-created event");
                    continue;
                }
            };

            if let Err(error) = handler.handle_order_created(event).await {
                tracing::error!(%error, "payment handling failed, awaiting redelivery");
            }
        }
    })
}
