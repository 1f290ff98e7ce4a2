//! Message-bus abstraction and the message contracts shared across services.
//!
//! Services communicate only through topics on a [`MessageBus`]: the order
//! service fans out reservation checks, the inventory service answers them,
//! the payment service reacts to created orders, and payment results flow
//! back asynchronously. The [`InMemoryBus`] implementation backs tests and
//! single-process deployments; the trait is the seam for a real broker.

pub mod bus;
pub mod contracts;
pub mod error;
pub mod memory;
pub mod topics;

pub use bus::{Delivery, MessageBus, MessageBusExt, Subscription};
pub use contracts::{
    OrderCreatedEvent, PaymentFailedEvent, PaymentProcessedEvent, ProductCheckMessage,
};
pub use error::BusError;
pub use memory::InMemoryBus;
