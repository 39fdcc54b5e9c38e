use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::payment::{is_well_formed_session_id, PaymentSession, PaymentStatus};

#[derive(Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub is_on_sale: bool,
    pub sale_price: Option<BigDecimal>,
}

impl Product {
    /// Unit price a customer pays right now: the sale price while on sale,
    /// the list price otherwise.
    pub fn effective_price(&self) -> BigDecimal {
        match (self.is_on_sale, &self.sale_price) {
            (true, Some(sale_price)) => sale_price.clone(),
            (true, None) => {
                log::warn!(
                    "Product {} is on sale without a sale price; using list price",
                    self.id
                );
                self.price.clone()
            }
            (false, _) => self.price.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Completed,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "COMPLETED" => Ok(OrderStatus::Completed),
            "FAILED" => Ok(OrderStatus::Failed),
            other => Err(format!("unknown order status '{}'", other)),
        }
    }
}

/// Which status a freshly created order starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreationPolicy {
    /// Mark the order completed as soon as it is stored. Placeholder until
    /// checkout sessions gate every order.
    #[default]
    CompleteImmediately,
    /// Leave the order pending; reconciliation with the payment session
    /// completes or fails it.
    AwaitPayment,
}

impl FromStr for CreationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complete-immediately" => Ok(CreationPolicy::CompleteImmediately),
            "await-payment" => Ok(CreationPolicy::AwaitPayment),
            other => Err(format!("unknown creation policy '{}'", other)),
        }
    }
}

// ── Inputs ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 1000, message = "quantity must be between 1 and 1000"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Validate)]
pub struct NewOrder {
    #[validate(email(message = "customerEmail must be a valid email address"))]
    pub customer_email: String,
    #[validate(length(min = 1, message = "order must contain at least one item"))]
    #[validate]
    pub items: Vec<NewOrderItem>,
    #[validate(length(
        min = 1,
        max = 255,
        message = "stripeSessionId must be between 1 and 255 characters"
    ))]
    #[validate(custom = "validate_session_id")]
    pub stripe_session_id: Option<String>,
}

/// Orders may only be tied to session ids the payment gateway will look up.
fn validate_session_id(session_id: &str) -> Result<(), ValidationError> {
    if is_well_formed_session_id(session_id) {
        return Ok(());
    }
    let mut err = ValidationError::new("session_id");
    err.message = Some(Cow::from(
        "stripeSessionId may only contain ASCII letters, digits and '_'",
    ));
    Err(err)
}

// ── Stored order ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price_at_purchase: BigDecimal,
}

impl OrderLine {
    /// Freeze the product's name and current effective price into a line.
    pub fn snapshot(product: &Product, quantity: i32) -> Self {
        Self {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity,
            price_at_purchase: product.effective_price(),
        }
    }

    pub fn subtotal(&self) -> BigDecimal {
        &self.price_at_purchase * BigDecimal::from(self.quantity)
    }
}

pub fn total_of(lines: &[OrderLine]) -> BigDecimal {
    lines
        .iter()
        .fold(BigDecimal::from(0), |acc, line| acc + line.subtotal())
}

/// An order that has been priced but not yet assigned an id by the store.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer_email: String,
    pub lines: Vec<OrderLine>,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub stripe_session_id: Option<String>,
}

impl OrderDraft {
    pub fn new(
        customer_email: String,
        lines: Vec<OrderLine>,
        stripe_session_id: Option<String>,
        policy: CreationPolicy,
        now: DateTime<Utc>,
    ) -> Self {
        let (status, completed_at) = match policy {
            CreationPolicy::CompleteImmediately => (OrderStatus::Completed, Some(now)),
            CreationPolicy::AwaitPayment => (OrderStatus::Pending, None),
        };
        Self {
            customer_email,
            total_amount: total_of(&lines),
            lines,
            status,
            created_at: now,
            completed_at,
            stripe_session_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub customer_email: String,
    pub lines: Vec<OrderLine>,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub stripe_session_id: Option<String>,
    pub stripe_payment_intent_id: Option<String>,
}

/// A status change produced by reconciliation, applied only if the order is
/// still in `from`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTransition {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub payment_intent_id: Option<String>,
}

impl Order {
    /// Decide how the stored status must change to match the payment session.
    ///
    /// `paid` completes any order that is not already Completed, Failed
    /// included, so a captured payment never stays on a Failed order.
    /// `unpaid` only fails a Pending order.
    pub fn reconcile(
        &self,
        session: &PaymentSession,
        now: DateTime<Utc>,
    ) -> Option<StatusTransition> {
        match session.payment_status {
            PaymentStatus::Paid if self.status != OrderStatus::Completed => {
                Some(StatusTransition {
                    from: self.status,
                    to: OrderStatus::Completed,
                    completed_at: Some(now),
                    payment_intent_id: session.payment_intent_id.clone(),
                })
            }
            PaymentStatus::Unpaid if self.status == OrderStatus::Pending => {
                Some(StatusTransition {
                    from: self.status,
                    to: OrderStatus::Failed,
                    completed_at: None,
                    payment_intent_id: None,
                })
            }
            _ => None,
        }
    }

    pub fn apply(&mut self, transition: &StatusTransition) {
        self.status = transition.to;
        if transition.completed_at.is_some() {
            self.completed_at = transition.completed_at;
        }
        if transition.payment_intent_id.is_some() {
            self.stripe_payment_intent_id = transition.payment_intent_id.clone();
        }
    }
}
