//! Inventory error types.

use messaging::BusError;
use thiserror::Error;

/// Errors that can occur in the inventory service.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The stock store failed.
    #[error("Stock store error: {0}")]
    Store(String),

    /// Message bus error.
    #[error("Message bus error: {0}")]
    Bus(#[from] BusError),
}
