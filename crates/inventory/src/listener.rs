//! Bus consumers for the inventory service.

use std::sync::Arc;

use messaging::{MessageBus, MessageBusExt, ProductCheckMessage, topics};
use tokio::task::JoinHandle;

use crate::service::InventoryReservationService;
use crate::store::StockStore;

/// Spawns the check and release consumers for an inventory service instance.
///
/// Subscriptions are taken before the tasks start, so messages published
/// right after this call returns are never missed. Undecodable payloads are
/// logged and skipped.
pub fn spawn_listeners<S>(
    bus: Arc<dyn MessageBus>,
    service: Arc<InventoryReservationService<S>>,
) -> Vec<JoinHandle<()>>
where
    S: StockStore + 'static,
{
    let mut checks = bus.subscribe(topics::PRODUCT_CHECK);
    let mut releases = bus.subscribe(topics::STOCK_RELEASE);

    let check_task = {
        let bus = Arc::clone(&bus);
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            while let Some(delivery) = checks.recv().await {
                let request: ProductCheckMessage = match delivery.decode() {
                    Ok(request) => request,
                    Err(error) => {
                        tracing::warn!(%error, "dropping undecodable check request");
                        continue;
                    }
                };

                let reply = service.handle_check(request).await;
                let key = reply.correlation_id.to_string();
                if let Err(error) = bus
                    .publish_json(topics::PRODUCT_CHECK_RESPONSE, &key, &reply)
                    .await
                {
                    tracing::error!(%error, correlation_id = %key, "failed to publish check response");
                }
            }
        })
    };

    let release_task = tokio::spawn(async move {
        while let Some(delivery) = releases.recv().await {
            match delivery.decode::<ProductCheckMessage>() {
                Ok(request) => service.handle_release(&request).await,
                Err(error) => tracing::warn!(%error, "dropping undecodable release request"),
            }
        }
    });

    vec![check_task, release_task]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStockStore;
    use common::{Money, ProductId};
    use messaging::InMemoryBus;

    #[tokio::test]
    async fn check_request_is_answered_on_response_topic() {
        let bus: Arc<dyn MessageBus> = Arc::new(InMemoryBus::new());
        let store = InMemoryStockStore::new();
        let sku = ProductId::new("SKU-001");
        store.add_product(sku.clone(), Money::from_cents(1500), 4);

        let service = Arc::new(InventoryReservationService::new(store));
        let _handles = spawn_listeners(Arc::clone(&bus), service);

        let mut responses = bus.subscribe(topics::PRODUCT_CHECK_RESPONSE);
        let request = ProductCheckMessage::check(sku, 2);
        let correlation_id = request.correlation_id;
        bus.publish_json(topics::PRODUCT_CHECK, &correlation_id.to_string(), &request)
            .await
            .unwrap();

        let reply: ProductCheckMessage = responses.recv().await.unwrap().decode().unwrap();
        assert_eq!(reply.correlation_id, correlation_id);
        assert!(reply.available);
        assert_eq!(reply.price_at_order, Some(Money::from_cents(1500)));
    }

    #[tokio::test]
    async fn release_message_credits_stock() {
        let bus: Arc<dyn MessageBus> = Arc::new(InMemoryBus::new());
        let store = InMemoryStockStore::new();
        let sku = ProductId::new("SKU-001");
        store.add_product(sku.clone(), Money::from_cents(1500), 1);

        let service = Arc::new(InventoryReservationService::new(store.clone()));
        let _handles = spawn_listeners(Arc::clone(&bus), service);

        let release = ProductCheckMessage::release(sku.clone(), 3);
        bus.publish_json(
            topics::STOCK_RELEASE,
            &release.correlation_id.to_string(),
            &release,
        )
        .await
        .unwrap();

        // the release consumer runs on the same runtime; poll until applied
        for _ in 0..100 {
            if store.quantity_of(&sku) == Some(4) {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("release was not applied");
    }
}
