//! Caller identity and capabilities.

use crate::error::OrderError;

/// Identity and capabilities of the caller of an order operation.
///
/// Access rules live in one predicate instead of per-operation role
/// comparisons: an admin may act on any order, an owner on their own.
#[derive(Debug, Clone)]
pub struct Caller {
    email: Option<String>,
    admin: bool,
}

impl Caller {
    /// A regular authenticated user.
    pub fn user(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            admin: false,
        }
    }

    /// An administrator.
    pub fn admin(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            admin: true,
        }
    }

    /// A caller with no identity, e.g. an unauthenticated request.
    pub fn anonymous() -> Self {
        Self {
            email: None,
            admin: false,
        }
    }

    /// Returns true for administrators.
    pub fn is_admin(&self) -> bool {
        self.admin
    }

    /// The caller's identity, or `InvalidRequest` when absent.
    pub fn identity(&self) -> Result<&str, OrderError> {
        self.email
            .as_deref()
            .ok_or_else(|| OrderError::InvalidRequest("caller has no identity".to_string()))
    }

    /// True when the caller may act on an order owned by `owner_email`.
    pub fn may_act_on(&self, owner_email: &str) -> bool {
        self.admin || self.email.as_deref() == Some(owner_email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_caller_has_no_identity() {
        assert!(Caller::anonymous().identity().is_err());
    }

    #[test]
    fn user_identity_is_their_email() {
        let caller = Caller::user("user@example.com");
        assert_eq!(caller.identity().unwrap(), "user@example.com");
        assert!(!caller.is_admin());
    }

    #[test]
    fn owner_may_act_on_own_order_only() {
        let caller = Caller::user("user@example.com");
        assert!(caller.may_act_on("user@example.com"));
        assert!(!caller.may_act_on("other@example.com"));
    }

    #[test]
    fn admin_may_act_on_any_order() {
        let caller = Caller::admin("admin@example.com");
        assert!(caller.may_act_on("user@example.com"));
        assert!(caller.is_admin());
    }
}
