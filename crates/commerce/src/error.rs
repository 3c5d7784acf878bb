//! Commerce error taxonomy.
//!
//! Services return `CommerceError`; repository failures bubble up inside it
//! via [`RepositoryError`]. Callers render user-facing text through
//! [`CommerceError::user_message`], which keeps storage internals out of
//! anything shown to a shopper.

use thiserror::Error;

use veranda_core::{MoneyError, OrderStatus};

use crate::db::RepositoryError;

/// Application-level error type for the commerce pipeline.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// Request data failed validation (bad quantity, missing shipping fields).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Referenced cart/order/product does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Checkout attempted on a cart with no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// Requested order status change is not in the transition table.
    #[error("illegal order status transition: {from} -> {to}")]
    InvalidTransition {
        /// Status the order currently holds.
        from: OrderStatus,
        /// Status the caller asked for.
        to: OrderStatus,
    },

    /// Unique-constraint race that exhausted its internal retries.
    /// The caller may retry the request.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Monetary amount could not be represented.
    #[error("pricing error: {0}")]
    Pricing(#[from] MoneyError),

    /// Underlying storage failure. Not retried automatically.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl CommerceError {
    /// Sanitized, user-facing description of the failure.
    ///
    /// Validation-class errors keep their human-readable reason. Storage
    /// failures and exhausted conflicts are reported generically so that
    /// database internals never leak to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(_)
            | Self::NotFound(_)
            | Self::EmptyCart
            | Self::InvalidTransition { .. }
            | Self::Pricing(_) => self.to_string(),
            Self::Conflict(_) | Self::Repository(_) => {
                "something went wrong processing your request; please try again".to_owned()
            }
        }
    }

    /// Whether the caller may retry the same request as-is.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = CommerceError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "not found: product 123");

        let err = CommerceError::InvalidTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Pending,
        };
        assert_eq!(
            err.to_string(),
            "illegal order status transition: delivered -> pending"
        );
    }

    #[test]
    fn test_user_message_keeps_validation_reasons() {
        let err = CommerceError::Validation("quantity must be positive (got 0)".to_string());
        assert!(err.user_message().contains("quantity must be positive"));

        assert_eq!(CommerceError::EmptyCart.user_message(), "cart is empty");
    }

    #[test]
    fn test_user_message_hides_storage_internals() {
        let err = CommerceError::Repository(RepositoryError::DataCorruption(
            "invalid status in database: weird".to_string(),
        ));
        assert!(!err.user_message().contains("database"));
        assert!(!err.user_message().contains("weird"));
    }

    #[test]
    fn test_only_conflicts_are_retryable() {
        assert!(CommerceError::Conflict("order number".to_string()).is_retryable());
        assert!(!CommerceError::EmptyCart.is_retryable());
        assert!(!CommerceError::Repository(RepositoryError::NotFound).is_retryable());
    }
}
