//! Payment error types.

use common::OrderId;
use messaging::BusError;
use thiserror::Error;

/// Errors that can occur in the payment service.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Payment creation or processing failed as a whole.
    ///
    /// Raised to the event listener; recovery is redelivery of the
    /// triggering event, not an internal retry loop.
    #[error("Failed to process payment for order {order_id}: {reason}")]
    Processing { order_id: OrderId, reason: String },

    /// The payment repository failed.
    #[error("Payment repository error: {0}")]
    Repository(String),

    /// Message bus error.
    #[error("Message bus error: {0}")]
    Bus(#[from] BusError),
}
