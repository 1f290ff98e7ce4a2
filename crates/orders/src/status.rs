//! Order status lifecycle.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Payment events move a `New` order to `WaitingForPayment`, `Paid` or
/// `Failed`; fulfillment then walks `Processing → Shipped → InTransit →
/// Delivered → Completed`. Cancellation and returns branch off to the side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Just placed, reservation held, payment not yet attempted.
    #[default]
    New,

    /// Payment declined or pending retry.
    WaitingForPayment,

    /// Payment received.
    Paid,

    /// Being picked and packed.
    Processing,

    /// Handed to the delivery service.
    Shipped,

    /// On its way per tracking.
    InTransit,

    /// Delivered to the customer.
    Delivered,

    /// Confirmed after delivery (terminal).
    Completed,

    /// Cancelled by the customer or the store (terminal).
    Cancelled,

    /// Customer asked to return the order.
    ReturnRequested,

    /// Items came back and were processed.
    Returned,

    /// Money returned to the customer (terminal).
    Refunded,

    /// Payment or system error (terminal).
    Failed,
}

impl OrderStatus {
    /// Returns true if no further saga-driven transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed
                | OrderStatus::Cancelled
                | OrderStatus::Refunded
                | OrderStatus::Failed
        )
    }

    /// Returns true if the order can still be cancelled.
    ///
    /// Delivered orders cannot be cancelled even though they are not
    /// terminal; they go through the return branch instead.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal() && *self != OrderStatus::Delivered
    }

    /// Returns the status name as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::WaitingForPayment => "WAITING_FOR_PAYMENT",
            OrderStatus::Paid => "PAID",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::InTransit => "IN_TRANSIT",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::ReturnRequested => "RETURN_REQUESTED",
            OrderStatus::Returned => "RETURNED",
            OrderStatus::Refunded => "REFUNDED",
            OrderStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
