//! Topic names shared across services.
//!
//! These are part of the wire compatibility surface and must not change.

/// Order service announces a newly persisted order.
pub const ORDER_CREATED: &str = "order-created";

/// Order service asks the inventory service to check-and-reserve stock.
pub const PRODUCT_CHECK: &str = "product-check";

/// Inventory service answers a reservation check.
pub const PRODUCT_CHECK_RESPONSE: &str = "product-check-response";

/// Order service returns previously reserved stock.
pub const STOCK_RELEASE: &str = "stock-release";

/// Payment service announces a processed payment (any final status).
pub const PAYMENT_PROCESSED: &str = "payment-processed";

/// Payment service announces a declined payment.
pub const PAYMENT_FAILED: &str = "payment-failed";
