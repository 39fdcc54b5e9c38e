use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::domain::errors::DomainError;
use crate::domain::order::{CreationPolicy, NewOrder, Order, OrderDraft, OrderLine};
use crate::domain::ports::{OrderRepository, PaymentSessionGateway, ProductRepository};

pub struct OrderService<R, P, G> {
    orders: R,
    products: P,
    payments: G,
    policy: CreationPolicy,
}

impl<R, P, G> OrderService<R, P, G>
where
    R: OrderRepository,
    P: ProductRepository,
    G: PaymentSessionGateway,
{
    pub fn new(orders: R, products: P, payments: G, policy: CreationPolicy) -> Self {
        Self {
            orders,
            products,
            payments,
            policy,
        }
    }

    /// Price the cart against current product data and store it as one order.
    pub fn create_order(&self, new_order: NewOrder) -> Result<Order, DomainError> {
        new_order.validate()?;

        let mut lines = Vec::with_capacity(new_order.items.len());
        for item in &new_order.items {
            let product = self
                .products
                .find_by_id(item.product_id)?
                .ok_or(DomainError::ProductNotFound(item.product_id))?;
            lines.push(OrderLine::snapshot(&product, item.quantity));
        }

        let draft = OrderDraft::new(
            new_order.customer_email,
            lines,
            new_order.stripe_session_id,
            self.policy,
            Utc::now(),
        );
        let order = self.orders.insert(draft)?;

        log::info!(
            "Created order {} with {} line(s), total {}, status {}",
            order.id,
            order.lines.len(),
            order.total_amount,
            order.status
        );
        Ok(order)
    }

    pub fn get_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        self.orders.find_by_id(id)
    }

    /// Look up the order behind a checkout session, bringing its status in
    /// line with what the payment provider reports.
    pub fn get_order_by_session(&self, session_id: &str) -> Result<Order, DomainError> {
        let session = self.payments.fetch_session(session_id)?;

        let order = self
            .orders
            .find_by_session_id(session_id)?
            .ok_or(DomainError::OrderNotFound)?;

        let Some(transition) = order.reconcile(&session, Utc::now()) else {
            return Ok(order);
        };

        if self.orders.apply_transition(order.id, &transition)? {
            log::info!(
                "Order {} moved {} -> {} from session {}",
                order.id,
                transition.from,
                transition.to,
                session_id
            );
        } else {
            // Another request changed the status between our read and write.
            log::warn!(
                "Order {} left {} before reconciliation could write; returning stored state",
                order.id,
                transition.from
            );
        }

        // Re-read so the response matches what is stored, column precision included.
        self.orders
            .find_by_id(order.id)?
            .ok_or(DomainError::OrderNotFound)
    }
}
