//! Order error types.

use common::{OrderId, ProductId};
use messaging::BusError;
use thiserror::Error;

use crate::status::OrderStatus;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request is malformed: missing caller identity, empty item list,
    /// or a zero quantity.
    #[error("Invalid order request: {0}")]
    InvalidRequest(String),

    /// The caller may not act on this order.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Order not found.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// One or more line items could not be reserved (unavailable or timed
    /// out). The whole order-creation attempt is rejected.
    #[error("Items unavailable: {product_ids:?}")]
    ItemsUnavailable { product_ids: Vec<ProductId> },

    /// The order cannot be cancelled from its current status.
    #[error("Order cannot be cancelled from status {0}")]
    CancellationNotAllowed(OrderStatus),

    /// The order write failed after the reservations succeeded. The
    /// reservations are left in place; recovery is an operator action.
    #[error("Order persistence failed: {0}")]
    Persistence(String),

    /// Message bus error.
    #[error("Message bus error: {0}")]
    Bus(#[from] BusError),
}
