//! Typed payloads for the cross-service topics.
//!
//! Field names are serialized in camelCase; they are part of the wire
//! compatibility surface shared with the other services.

use common::{CorrelationId, Money, OrderId, PaymentId, ProductId};
use serde::{Deserialize, Serialize};

/// Request/response shape for reservation checks and stock releases.
///
/// A check request leaves with `available = false` and no price; the
/// inventory service fills in `available`, `price_at_order` and `message`
/// and sends the same shape back with the correlation id untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCheckMessage {
    pub correlation_id: CorrelationId,
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_at_order: Option<Money>,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProductCheckMessage {
    /// Builds a check-and-reserve request with a fresh correlation id.
    pub fn check(product_id: ProductId, quantity: u32) -> Self {
        Self {
            correlation_id: CorrelationId::new(),
            product_id,
            quantity,
            price_at_order: None,
            available: false,
            message: None,
        }
    }

    /// Builds a compensating release message.
    ///
    /// Releases are fire-and-forget: the correlation id is fresh (nothing
    /// awaits it) and carries no idempotency guarantee on the receiving side.
    pub fn release(product_id: ProductId, quantity: u32) -> Self {
        Self {
            correlation_id: CorrelationId::new(),
            product_id,
            quantity,
            price_at_order: None,
            available: true,
            message: Some("Release stock".to_string()),
        }
    }

    /// Turns a request into a successful reply carrying the reservation
    /// price.
    pub fn reserved(self, price: Money) -> Self {
        Self {
            price_at_order: Some(price),
            available: true,
            message: Some("Available".to_string()),
            ..self
        }
    }

    /// Turns a request into a rejected reply.
    pub fn rejected(self, reason: impl Into<String>) -> Self {
        Self {
            price_at_order: None,
            available: false,
            message: Some(reason.into()),
            ..self
        }
    }
}

/// Published on `order-created` once an order and its items are persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedEvent {
    pub order_id: OrderId,
    pub user_email: String,
    pub total_price: Money,
}

/// Published on `payment-processed` with the final status of a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProcessedEvent {
    pub order_id: OrderId,
    pub payment_id: PaymentId,
    pub transaction_id: String,
    pub amount: Money,
    /// "SUCCESS" or "FAILED".
    pub status: String,
    pub method: String,
    pub user_email: String,
}

/// Published on `payment-failed` when a payment is declined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFailedEvent {
    pub order_id: OrderId,
    pub payment_id: PaymentId,
    pub reason: String,
    pub user_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_request_starts_unavailable_without_price() {
        let request = ProductCheckMessage::check(ProductId::new("SKU-001"), 3);
        assert!(!request.available);
        assert!(request.price_at_order.is_none());
        assert!(request.message.is_none());
    }

    #[test]
    fn fresh_correlation_id_per_request() {
        let a = ProductCheckMessage::check(ProductId::new("SKU-001"), 1);
        let b = ProductCheckMessage::check(ProductId::new("SKU-001"), 1);
        assert_ne!(a.correlation_id, b.correlation_id);
    }

    #[test]
    fn reserved_reply_keeps_correlation_id() {
        let request = ProductCheckMessage::check(ProductId::new("SKU-001"), 2);
        let correlation_id = request.correlation_id;

        let reply = request.reserved(Money::from_cents(1000));
        assert_eq!(reply.correlation_id, correlation_id);
        assert!(reply.available);
        assert_eq!(reply.price_at_order, Some(Money::from_cents(1000)));
    }

    #[test]
    fn rejected_reply_has_no_price() {
        let reply =
            ProductCheckMessage::check(ProductId::new("SKU-404"), 1).rejected("Not available");
        assert!(!reply.available);
        assert!(reply.price_at_order.is_none());
        assert_eq!(reply.message.as_deref(), Some("Not available"));
    }

    #[test]
    fn release_message_shape() {
        let release = ProductCheckMessage::release(ProductId::new("SKU-007"), 2);
        assert!(release.available);
        assert_eq!(release.quantity, 2);
        assert_eq!(release.message.as_deref(), Some("Release stock"));
    }

    #[test]
    fn wire_fields_are_camel_case() {
        let request = ProductCheckMessage::check(ProductId::new("SKU-001"), 1);
        let json = serde_json::to_value(&request).unwrap();
        let object = json.as_object().unwrap();
        assert!(object.contains_key("correlationId"));
        assert!(object.contains_key("productId"));
        assert!(object.contains_key("quantity"));
        assert!(object.contains_key("available"));
        // absent optional fields are omitted from the wire entirely
        assert!(!object.contains_key("priceAtOrder"));
        assert!(!object.contains_key("message"));
    }

    #[test]
    fn order_created_event_round_trip() {
        let event = OrderCreatedEvent {
            order_id: OrderId::new(),
            user_email: "user@example.com".to_string(),
            total_price: Money::from_cents(2100),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert!(json.as_object().unwrap().contains_key("totalPrice"));

        let back: OrderCreatedEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn payment_events_round_trip() {
        let processed = PaymentProcessedEvent {
            order_id: OrderId::new(),
            payment_id: PaymentId::new(),
            transaction_id: "tx-1".to_string(),
            amount: Money::from_cents(500),
            status: "SUCCESS".to_string(),
            method: "MOCK".to_string(),
            user_email: "user@example.com".to_string(),
        };
        let json = serde_json::to_string(&processed).unwrap();
        let back: PaymentProcessedEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, processed);

        let failed = PaymentFailedEvent {
            order_id: OrderId::new(),
            payment_id: PaymentId::new(),
            reason: "declined".to_string(),
            user_email: "user@example.com".to_string(),
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert!(json.as_object().unwrap().contains_key("orderId"));
        assert!(json.as_object().unwrap().contains_key("userEmail"));
    }
}
