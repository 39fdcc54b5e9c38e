//! In-memory stand-ins for the store and the payment provider, shared by the
//! service and handler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderDraft, OrderStatus, Product, StatusTransition};
use crate::domain::payment::{PaymentError, PaymentSession, PaymentStatus};
use crate::domain::ports::{OrderRepository, PaymentSessionGateway, ProductRepository};

#[derive(Clone, Default)]
pub struct InMemoryProducts {
    products: Arc<Mutex<HashMap<Uuid, Product>>>,
    lookups: Arc<AtomicUsize>,
}

impl InMemoryProducts {
    pub fn add(&self, product: Product) -> Uuid {
        let id = product.id;
        self.products.lock().unwrap().insert(id, product);
        id
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ProductRepository for InMemoryProducts {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.products.lock().unwrap().get(&id).cloned())
    }
}

#[derive(Default)]
struct OrdersState {
    orders: HashMap<Uuid, Order>,
    reads: usize,
    transitions_applied: usize,
    complete_on_next_read: Option<(Uuid, String)>,
}

#[derive(Clone, Default)]
pub struct InMemoryOrders {
    state: Arc<Mutex<OrdersState>>,
}

impl InMemoryOrders {
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().orders.len()
    }

    pub fn get(&self, id: Uuid) -> Option<Order> {
        self.state.lock().unwrap().orders.get(&id).cloned()
    }

    pub fn reads(&self) -> usize {
        self.state.lock().unwrap().reads
    }

    pub fn transitions_applied(&self) -> usize {
        self.state.lock().unwrap().transitions_applied
    }

    /// Simulate a concurrent writer completing `id` right after the next read.
    pub fn complete_on_next_read(&self, id: Uuid, payment_intent_id: &str) {
        self.state.lock().unwrap().complete_on_next_read = Some((id, payment_intent_id.to_string()));
    }

    fn after_read(state: &mut OrdersState) {
        state.reads += 1;
        if let Some((id, intent)) = state.complete_on_next_read.take() {
            if let Some(order) = state.orders.get_mut(&id) {
                order.status = OrderStatus::Completed;
                order.completed_at = Some(Utc::now());
                order.stripe_payment_intent_id = Some(intent);
            }
        }
    }
}

impl OrderRepository for InMemoryOrders {
    fn insert(&self, draft: OrderDraft) -> Result<Order, DomainError> {
        let mut state = self.state.lock().unwrap();
        if let Some(session_id) = &draft.stripe_session_id {
            let taken = state
                .orders
                .values()
                .any(|o| o.stripe_session_id.as_ref() == Some(session_id));
            if taken {
                return Err(DomainError::Conflict(format!(
                    "session {} is already attached to an order",
                    session_id
                )));
            }
        }
        let order = Order {
            id: Uuid::new_v4(),
            customer_email: draft.customer_email,
            lines: draft.lines,
            total_amount: draft.total_amount,
            status: draft.status,
            created_at: draft.created_at,
            completed_at: draft.completed_at,
            stripe_session_id: draft.stripe_session_id,
            stripe_payment_intent_id: None,
        };
        state.orders.insert(order.id, order.clone());
        Ok(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut state = self.state.lock().unwrap();
        let found = state.orders.get(&id).cloned();
        Self::after_read(&mut state);
        Ok(found)
    }

    fn find_by_session_id(&self, session_id: &str) -> Result<Option<Order>, DomainError> {
        let mut state = self.state.lock().unwrap();
        let found = state
            .orders
            .values()
            .find(|o| o.stripe_session_id.as_deref() == Some(session_id))
            .cloned();
        Self::after_read(&mut state);
        Ok(found)
    }

    fn apply_transition(
        &self,
        order_id: Uuid,
        transition: &StatusTransition,
    ) -> Result<bool, DomainError> {
        let mut state = self.state.lock().unwrap();
        let Some(order) = state.orders.get_mut(&order_id) else {
            return Ok(false);
        };
        if order.status != transition.from {
            return Ok(false);
        }
        order.apply(transition);
        state.transitions_applied += 1;
        Ok(true)
    }
}

#[derive(Default)]
struct PaymentsState {
    sessions: HashMap<String, PaymentSession>,
    outage: bool,
}

#[derive(Clone, Default)]
pub struct StubPayments {
    state: Arc<Mutex<PaymentsState>>,
}

impl StubPayments {
    pub fn set(&self, session_id: &str, status: PaymentStatus, payment_intent_id: Option<&str>) {
        self.state.lock().unwrap().sessions.insert(
            session_id.to_string(),
            PaymentSession {
                id: session_id.to_string(),
                payment_status: status,
                payment_intent_id: payment_intent_id.map(str::to_string),
            },
        );
    }

    pub fn fail_with_outage(&self) {
        self.state.lock().unwrap().outage = true;
    }
}

impl PaymentSessionGateway for StubPayments {
    fn fetch_session(&self, session_id: &str) -> Result<PaymentSession, PaymentError> {
        let state = self.state.lock().unwrap();
        if state.outage {
            return Err(PaymentError::Unavailable("connection refused".to_string()));
        }
        state.sessions.get(session_id).cloned().ok_or_else(|| {
            PaymentError::InvalidSession(format!("No such checkout.session: '{}'", session_id))
        })
    }
}
