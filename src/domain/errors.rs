use thiserror::Error;
use uuid::Uuid;

use super::payment::PaymentError;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Order not found")]
    OrderNotFound,
    #[error("Product with ID {0} not found")]
    ProductNotFound(Uuid),
    #[error("Invalid session ID: {0}")]
    InvalidSession(String),
    #[error("Payment provider unavailable: {0}")]
    PaymentUnavailable(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PaymentError> for DomainError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::InvalidSession(msg) => DomainError::InvalidSession(msg),
            PaymentError::Unavailable(msg) => DomainError::PaymentUnavailable(msg),
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(e: validator::ValidationErrors) -> Self {
        DomainError::Validation(e.to_string())
    }
}
