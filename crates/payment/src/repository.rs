//! Payment repository trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{OrderId, PaymentId};

use crate::error::PaymentError;
use crate::model::Payment;

/// Persistence collaborator for payment records.
///
/// The store must enforce at most one payment per order id; that uniqueness
/// is the idempotency guard for duplicate `order-created` deliveries.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Returns the payment with the given id, if any.
    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, PaymentError>;

    /// Returns the payment for an order, if one exists.
    async fn find_by_order_id(&self, order_id: OrderId) -> Result<Option<Payment>, PaymentError>;

    /// Inserts or updates a payment record.
    async fn save(&self, payment: Payment) -> Result<Payment, PaymentError>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    payments: HashMap<OrderId, Payment>,
    fail_on_save: bool,
}

/// In-memory payment repository keyed by order id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentRepository {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the repository to fail on the next save call.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.state.write().unwrap().fail_on_save = fail;
    }

    /// Returns the number of stored payments.
    pub fn payment_count(&self) -> usize {
        self.state.read().unwrap().payments.len()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, PaymentError> {
        Ok(self
            .state
            .read()
            .unwrap()
            .payments
            .values()
            .find(|payment| payment.id == id)
            .cloned())
    }

    async fn find_by_order_id(&self, order_id: OrderId) -> Result<Option<Payment>, PaymentError> {
        Ok(self.state.read().unwrap().payments.get(&order_id).cloned())
    }

    async fn save(&self, payment: Payment) -> Result<Payment, PaymentError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_save {
            return Err(PaymentError::Repository("simulated write failure".to_string()));
        }
        state.payments.insert(payment.order_id, payment.clone());
        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PaymentStatus;
    use common::Money;

    #[tokio::test]
    async fn save_and_find_by_order_id() {
        let repository = InMemoryPaymentRepository::new();
        let payment = Payment::new(OrderId::new(), "user@example.com", Money::from_cents(100));
        let order_id = payment.order_id;

        repository.save(payment.clone()).await.unwrap();

        let found = repository.find_by_order_id(order_id).await.unwrap().unwrap();
        assert_eq!(found, payment);
        assert_eq!(repository.payment_count(), 1);

        let by_id = repository.find_by_id(payment.id).await.unwrap().unwrap();
        assert_eq!(by_id, payment);
    }

    #[tokio::test]
    async fn second_save_for_same_order_replaces_the_row() {
        let repository = InMemoryPaymentRepository::new();
        let mut payment = Payment::new(OrderId::new(), "user@example.com", Money::from_cents(100));
        let order_id = payment.order_id;

        repository.save(payment.clone()).await.unwrap();
        payment.status = PaymentStatus::Success;
        repository.save(payment).await.unwrap();

        assert_eq!(repository.payment_count(), 1);
        let found = repository.find_by_order_id(order_id).await.unwrap().unwrap();
        assert_eq!(found.status, PaymentStatus::Success);
    }

    #[tokio::test]
    async fn fail_on_save_returns_repository_error() {
        let repository = InMemoryPaymentRepository::new();
        repository.set_fail_on_save(true);

        let payment = Payment::new(OrderId::new(), "user@example.com", Money::from_cents(100));
        let result = repository.save(payment).await;
        assert!(matches!(result, Err(PaymentError::Repository(_))));
        assert_eq!(repository.payment_count(), 0);
    }
}
