//! Inventory service: answers check-and-reserve requests and stock releases.
//!
//! A reservation check is a single atomic conditional decrement, never a
//! separate read-then-write, so concurrent checks for the same product can
//! never oversell. A release is an unconditional credit with no dedup key;
//! redelivery of the same release message double-credits stock.

pub mod error;
pub mod listener;
pub mod service;
pub mod store;

pub use error::InventoryError;
pub use listener::spawn_listeners;
pub use service::InventoryReservationService;
pub use store::{InMemoryStockStore, StockStore};
