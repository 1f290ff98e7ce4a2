//! Pluggable payment determination.

use crate::model::{Payment, PaymentStatus};

/// Decides the final status of a pending payment.
pub trait PaymentPolicy: Send + Sync {
    /// Returns the outcome for the given pending payment.
    fn determine(&self, payment: &Payment) -> PaymentStatus;
}

/// Default policy: every payment succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysApprove;

impl PaymentPolicy for AlwaysApprove {
    fn determine(&self, _payment: &Payment) -> PaymentStatus {
        PaymentStatus::Success
    }
}

/// Declines every payment. Exercises the failure path.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysDecline;

impl PaymentPolicy for AlwaysDecline {
    fn determine(&self, _payment: &Payment) -> PaymentStatus {
        PaymentStatus::Failed
    }
}
