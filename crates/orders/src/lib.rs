//! Order service: the order-creation saga and its collaborators.
//!
//! Creating an order fans out one reservation check per line item over the
//! message bus, correlates the replies, and commits the order only when
//! every item was reserved. Any failure compensates the reservations that
//! did succeed by releasing their stock. There is no distributed
//! transaction: consistency comes from message correlation, timeouts and
//! compensating actions.
//!
//! Order status afterwards is driven by asynchronous payment-result events,
//! applied by the [`OrderStatusProjector`] independently of the creation
//! path.

pub mod access;
pub mod correlation;
pub mod error;
pub mod gateway;
pub mod model;
pub mod orchestrator;
pub mod projector;
pub mod repository;
pub mod status;

pub use access::Caller;
pub use correlation::CorrelationTable;
pub use error::OrderError;
pub use gateway::{CheckOutcome, DEFAULT_CHECK_TIMEOUT, ReservationGateway, spawn_response_listener};
pub use model::{Order, OrderItem};
pub use orchestrator::{CreateOrderRequest, LineItem, OrderOrchestrator};
pub use projector::{OrderStatusProjector, spawn_payment_listeners};
pub use repository::{InMemoryOrderRepository, OrderRepository};
pub use status::OrderStatus;
