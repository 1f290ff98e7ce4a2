//! Stock store trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, ProductId};

use crate::error::InventoryError;

/// Persistence collaborator for product stock levels and prices.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// Atomically decrements stock if at least `quantity` units remain.
    ///
    /// Returns `false` for unknown products, products flagged unavailable,
    /// or insufficient stock. Implementations must perform the check and
    /// the decrement as one atomic operation; a separate read-then-write
    /// races with concurrent checks for the same product.
    async fn decrease_stock_if_sufficient(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<bool, InventoryError>;

    /// Unconditionally credits stock back. Unknown products are ignored.
    async fn increase_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), InventoryError>;

    /// Current unit price, if the product exists.
    async fn unit_price(&self, product_id: &ProductId) -> Result<Option<Money>, InventoryError>;
}

#[derive(Debug, Clone)]
struct ProductRecord {
    price: Money,
    quantity: u32,
    available: bool,
}

/// In-memory stock store for testing and single-process deployments.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStockStore {
    products: Arc<RwLock<HashMap<ProductId, ProductRecord>>>,
}

impl InMemoryStockStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product with an initial price and stock level.
    pub fn add_product(&self, product_id: ProductId, price: Money, quantity: u32) {
        self.products.write().unwrap().insert(
            product_id,
            ProductRecord {
                price,
                quantity,
                available: true,
            },
        );
    }

    /// Changes the catalog price of a product.
    pub fn set_price(&self, product_id: &ProductId, price: Money) {
        if let Some(record) = self.products.write().unwrap().get_mut(product_id) {
            record.price = price;
        }
    }

    /// Flags a product as (un)available for reservation.
    pub fn set_available(&self, product_id: &ProductId, available: bool) {
        if let Some(record) = self.products.write().unwrap().get_mut(product_id) {
            record.available = available;
        }
    }

    /// Returns the current stock level of a product.
    pub fn quantity_of(&self, product_id: &ProductId) -> Option<u32> {
        self.products
            .read()
            .unwrap()
            .get(product_id)
            .map(|record| record.quantity)
    }
}

#[async_trait]
impl StockStore for InMemoryStockStore {
    async fn decrease_stock_if_sufficient(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<bool, InventoryError> {
        // one lock acquisition covers both the check and the decrement
        let mut products = self.products.write().unwrap();
        match products.get_mut(product_id) {
            Some(record) if record.available && record.quantity >= quantity => {
                record.quantity -= quantity;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn increase_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), InventoryError> {
        if let Some(record) = self.products.write().unwrap().get_mut(product_id) {
            record.quantity += quantity;
        }
        Ok(())
    }

    async fn unit_price(&self, product_id: &ProductId) -> Result<Option<Money>, InventoryError> {
        Ok(self
            .products
            .read()
            .unwrap()
            .get(product_id)
            .map(|record| record.price))
    }
}
