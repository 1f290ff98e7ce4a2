//! Order repository trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;

use crate::error::OrderError;
use crate::model::Order;

/// Persistence collaborator for orders.
///
/// `save` writes the order and all of its items as one unit; callers rely on
/// there never being a half-written order.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Returns the order with the given id, if any.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderError>;

    /// Inserts or updates an order together with its items.
    async fn save(&self, order: Order) -> Result<Order, OrderError>;

    /// Deletes an order.
    async fn delete(&self, id: OrderId) -> Result<(), OrderError>;
}

#[derive(Debug, Default)]
struct InMemoryOrderState {
    orders: HashMap<OrderId, Order>,
    fail_on_save: bool,
}

/// In-memory order repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    state: Arc<RwLock<InMemoryOrderState>>,
}

impl InMemoryOrderRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the repository to fail on the next save call.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.state.write().unwrap().fail_on_save = fail;
    }

    /// Returns the number of stored orders.
    pub fn order_count(&self) -> usize {
        self.state.read().unwrap().orders.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderError> {
        Ok(self.state.read().unwrap().orders.get(&id).cloned())
    }

    async fn save(&self, order: Order) -> Result<Order, OrderError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_save {
            return Err(OrderError::Persistence("simulated write failure".to_string()));
        }
        state.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn delete(&self, id: OrderId) -> Result<(), OrderError> {
        self.state.write().unwrap().orders.remove(&id);
        Ok(())
    }
}
