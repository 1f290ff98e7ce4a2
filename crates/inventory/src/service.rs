//! Reservation check and release handlers.

use messaging::ProductCheckMessage;

use crate::store::StockStore;

/// Answers reservation checks and stock releases against a [`StockStore`].
pub struct InventoryReservationService<S> {
    store: S,
}

impl<S: StockStore> InventoryReservationService<S> {
    /// Creates a service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Answers a check-and-reserve request.
    ///
    /// The reply reuses the request shape: the correlation id is untouched,
    /// `available` and `price_at_order` are filled in. Insufficient stock,
    /// unknown products and store failures all answer `available = false`.
    #[tracing::instrument(skip(self, request), fields(correlation_id = %request.correlation_id, product_id = %request.product_id))]
    pub async fn handle_check(&self, request: ProductCheckMessage) -> ProductCheckMessage {
        let reserved = match self
            .store
            .decrease_stock_if_sufficient(&request.product_id, request.quantity)
            .await
        {
            Ok(reserved) => reserved,
            Err(error) => {
                tracing::error!(%error, "stock check failed");
                false
            }
        };

        if !reserved {
            metrics::counter!("inventory_checks_rejected_total").increment(1);
            return request.rejected("Not available");
        }

        match self.store.unit_price(&request.product_id).await {
            Ok(Some(price)) => {
                metrics::counter!("inventory_checks_reserved_total").increment(1);
                tracing::debug!(%price, quantity = request.quantity, "stock reserved");
                request.reserved(price)
            }
            // the product vanished between decrement and price read; undo
            Ok(None) | Err(_) => {
                let _ = self
                    .store
                    .increase_stock(&request.product_id, request.quantity)
                    .await;
                metrics::counter!("inventory_checks_rejected_total").increment(1);
                request.rejected("Not available")
            }
        }
    }

    /// Handles a stock-release message.
    ///
    /// The credit is unconditional and carries no dedup key, so a redelivered
    /// release is applied again.
    #[tracing::instrument(skip(self, request), fields(product_id = %request.product_id))]
    pub async fn handle_release(&self, request: &ProductCheckMessage) {
        if let Err(error) = self
            .store
            .increase_stock(&request.product_id, request.quantity)
            .await
        {
            tracing::error!(%error, "stock release failed");
            return;
        }
        metrics::counter!("inventory_releases_total").increment(1);
        tracing::debug!(quantity = request.quantity, "stock released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStockStore;
    use common::{Money, ProductId};

    fn service_with(
        sku: &ProductId,
        price: Money,
        quantity: u32,
    ) -> (InventoryReservationService<InMemoryStockStore>, InMemoryStockStore) {
        let store = InMemoryStockStore::new();
        store.add_product(sku.clone(), price, quantity);
        (InventoryReservationService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn check_reserves_and_returns_price() {
        let sku = ProductId::new("SKU-001");
        let (service, store) = service_with(&sku, Money::from_cents(1000), 5);

        let request = ProductCheckMessage::check(sku.clone(), 2);
        let correlation_id = request.correlation_id;
        let reply = service.handle_check(request).await;

        assert_eq!(reply.correlation_id, correlation_id);
        assert!(reply.available);
        assert_eq!(reply.price_at_order, Some(Money::from_cents(1000)));
        assert_eq!(store.quantity_of(&sku), Some(3));
    }

    #[tokio::test]
    async fn check_rejects_insufficient_stock_without_decrement() {
        let sku = ProductId::new("SKU-001");
        let (service, store) = service_with(&sku, Money::from_cents(1000), 1);

        let reply = service
            .handle_check(ProductCheckMessage::check(sku.clone(), 2))
            .await;

        assert!(!reply.available);
        assert!(reply.price_at_order.is_none());
        assert_eq!(store.quantity_of(&sku), Some(1));
    }

    #[tokio::test]
    async fn check_rejects_unknown_product() {
        let sku = ProductId::new("SKU-001");
        let (service, _) = service_with(&sku, Money::from_cents(1000), 1);

        let reply = service
            .handle_check(ProductCheckMessage::check(ProductId::new("SKU-404"), 1))
            .await;

        assert!(!reply.available);
        assert_eq!(reply.message.as_deref(), Some("Not available"));
    }

    #[tokio::test]
    async fn release_credits_stock() {
        let sku = ProductId::new("SKU-001");
        let (service, store) = service_with(&sku, Money::from_cents(1000), 5);

        service
            .handle_release(&ProductCheckMessage::release(sku.clone(), 3))
            .await;

        assert_eq!(store.quantity_of(&sku), Some(8));
    }

    #[tokio::test]
    async fn redelivered_release_double_credits() {
        let sku = ProductId::new("SKU-001");
        let (service, store) = service_with(&sku, Money::from_cents(1000), 0);

        let release = ProductCheckMessage::release(sku.clone(), 2);
        service.handle_release(&release).await;
        service.handle_release(&release).await;

        // no dedup key on releases: the second delivery credits again
        assert_eq!(store.quantity_of(&sku), Some(4));
    }
}
