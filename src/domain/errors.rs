use thiserror::Error;
use uuid::Uuid;

use super::order::OrderStatus;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Product {product_id} not found")]
    ProductNotFound { product_id: Uuid },
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: Uuid,
        available: i32,
        requested: i32,
    },
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Verification code expired")]
    VerificationExpired,
    #[error("Verification code does not match")]
    VerificationMismatch,
    #[error("Too many verification attempts")]
    TooManyAttempts,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// True for failures caused by the store rather than by business rules.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, DomainError::Internal(_))
    }
}
