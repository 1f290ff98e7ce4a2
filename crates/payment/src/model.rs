//! Payment record and its status/method enums.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, PaymentId};
use messaging::{PaymentFailedEvent, PaymentProcessedEvent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    /// Returns the wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a payment was (or would be) collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Mock,
    Card,
}

impl PaymentMethod {
    /// Returns the wire representation of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Mock => "MOCK",
            PaymentMethod::Card => "CARD",
        }
    }
}

/// A payment record.
///
/// At most one payment exists per order; the orderId-unique row is what
/// makes duplicate `order-created` deliveries harmless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub transaction_id: String,
    pub amount: Money,
    pub status: PaymentStatus,
    pub method: PaymentMethod,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// Creates a pending payment with a fresh transaction id.
    pub fn new(order_id: OrderId, user_email: impl Into<String>, amount: Money) -> Self {
        Self {
            id: PaymentId::new(),
            order_id,
            transaction_id: Uuid::new_v4().to_string(),
            amount,
            status: PaymentStatus::Pending,
            method: PaymentMethod::Mock,
            user_email: user_email.into(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Builds the `payment-processed` event for this record.
    pub fn to_processed_event(&self) -> PaymentProcessedEvent {
        PaymentProcessedEvent {
            order_id: self.order_id,
            payment_id: self.id,
            transaction_id: self.transaction_id.clone(),
            amount: self.amount,
            status: self.status.as_str().to_string(),
            method: self.method.as_str().to_string(),
            user_email: self.user_email.clone(),
        }
    }

    /// Builds the `payment-failed` event for this record.
    pub fn to_failed_event(&self, reason: impl Into<String>) -> PaymentFailedEvent {
        PaymentFailedEvent {
            order_id: self.order_id,
            payment_id: self.id,
            reason: reason.into(),
            user_email: self.user_email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_payment_is_pending_with_fresh_transaction_id() {
        let order_id = OrderId::new();
        let a = Payment::new(order_id, "user@example.com", Money::from_cents(1000));
        let b = Payment::new(order_id, "user@example.com", Money::from_cents(1000));

        assert_eq!(a.status, PaymentStatus::Pending);
        assert!(a.updated_at.is_none());
        assert_ne!(a.transaction_id, b.transaction_id);
    }

    #[test]
    fn status_wire_representation() {
        assert_eq!(PaymentStatus::Success.as_str(), "SUCCESS");
        assert_eq!(PaymentStatus::Failed.as_str(), "FAILED");
        assert_eq!(PaymentStatus::Pending.as_str(), "PENDING");

        let json = serde_json::to_string(&PaymentStatus::Success).unwrap();
        assert_eq!(json, "\"SUCCESS\"");
    }

    #[test]
    fn processed_event_mirrors_the_record() {
        let mut payment = Payment::new(OrderId::new(), "user@example.com", Money::from_cents(500));
        payment.status = PaymentStatus::Success;

        let event = payment.to_processed_event();
        assert_eq!(event.order_id, payment.order_id);
        assert_eq!(event.payment_id, payment.id);
        assert_eq!(event.transaction_id, payment.transaction_id);
        assert_eq!(event.amount, payment.amount);
        assert_eq!(event.status, "SUCCESS");
        assert_eq!(event.method, "MOCK");
    }

    #[test]
    fn failed_event_carries_reason_and_email() {
        let payment = Payment::new(OrderId::new(), "user@example.com", Money::from_cents(500));
        let event = payment.to_failed_event("Payment declined");
        assert_eq!(event.reason, "Payment declined");
        assert_eq!(event.user_email, "user@example.com");
    }
}
