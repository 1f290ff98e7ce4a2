//! Order and order-item records.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, ProductId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::OrderStatus;

/// A line item of a persisted order.
///
/// `price_at_order` is the unit price returned by the reservation check.
/// It is a snapshot: catalog price changes after reservation never affect
/// an existing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price_at_order: Money,
}

impl OrderItem {
    /// Creates a new line item with the reservation-time price.
    pub fn new(product_id: ProductId, quantity: u32, price_at_order: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            quantity,
            price_at_order,
        }
    }

    /// Returns the total price for this item.
    pub fn total_price(&self) -> Money {
        self.price_at_order.multiply(self.quantity)
    }
}

/// An order and its items.
///
/// An order is only ever written as a whole, after every item's reservation
/// succeeded; there is no partially persisted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_email: String,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Creates a new order in status `New` dated now.
    pub fn new(user_email: impl Into<String>, items: Vec<OrderItem>) -> Self {
        Self {
            id: OrderId::new(),
            user_email: user_email.into(),
            order_date: Utc::now(),
            status: OrderStatus::New,
            items,
        }
    }

    /// Total price derived from the items' price snapshots.
    pub fn total_price(&self) -> Money {
        self.items.iter().map(OrderItem::total_price).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_total_is_price_times_quantity() {
        let item = OrderItem::new(ProductId::new("SKU-001"), 3, Money::from_cents(1000));
        assert_eq!(item.total_price().cents(), 3000);
    }

    #[test]
    fn order_total_sums_item_totals() {
        let order = Order::new(
            "user@example.com",
            vec![
                OrderItem::new(ProductId::new("SKU-001"), 2, Money::from_cents(1000)),
                OrderItem::new(ProductId::new("SKU-002"), 1, Money::from_cents(2500)),
            ],
        );
        assert_eq!(order.total_price().cents(), 4500);
    }

    #[test]
    fn new_order_starts_in_new_status() {
        let order = Order::new("user@example.com", vec![]);
        assert_eq!(order.status, OrderStatus::New);
    }

    #[test]
    fn serialization_round_trip() {
        let order = Order::new(
            "user@example.com",
            vec![OrderItem::new(
                ProductId::new("SKU-001"),
                1,
                Money::from_cents(999),
            )],
        );
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(back, order);
    }
}
