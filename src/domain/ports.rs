use std::sync::Arc;

use uuid::Uuid;

use super::errors::DomainError;
use super::order::{Order, OrderDraft, Product, StatusTransition};
use super::payment::{PaymentError, PaymentSession};

pub trait ProductRepository: Send + Sync + 'static {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Store the order and all of its lines atomically, returning it with the
    /// assigned id.
    fn insert(&self, draft: OrderDraft) -> Result<Order, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn find_by_session_id(&self, session_id: &str) -> Result<Option<Order>, DomainError>;
    /// Write `transition` only if the order is still in `transition.from`.
    /// Returns whether a row was updated.
    fn apply_transition(
        &self,
        order_id: Uuid,
        transition: &StatusTransition,
    ) -> Result<bool, DomainError>;
}

pub trait PaymentSessionGateway: Send + Sync + 'static {
    fn fetch_session(&self, session_id: &str) -> Result<PaymentSession, PaymentError>;
}

impl<T: ProductRepository + ?Sized> ProductRepository for Arc<T> {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        (**self).find_by_id(id)
    }
}

impl<T: OrderRepository + ?Sized> OrderRepository for Arc<T> {
    fn insert(&self, draft: OrderDraft) -> Result<Order, DomainError> {
        (**self).insert(draft)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        (**self).find_by_id(id)
    }

    fn find_by_session_id(&self, session_id: &str) -> Result<Option<Order>, DomainError> {
        (**self).find_by_session_id(session_id)
    }

    fn apply_transition(
        &self,
        order_id: Uuid,
        transition: &StatusTransition,
    ) -> Result<bool, DomainError> {
        (**self).apply_transition(order_id, transition)
    }
}

impl<T: PaymentSessionGateway + ?Sized> PaymentSessionGateway for Arc<T> {
    fn fetch_session(&self, session_id: &str) -> Result<PaymentSession, PaymentError> {
        (**self).fetch_session(session_id)
    }
}
