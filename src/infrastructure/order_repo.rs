use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderDraft, OrderLine, OrderStatus, StatusTransition};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_lines, orders};

use super::models::{NewOrderLineRow, NewOrderRow, OrderLineRow, OrderRow, OrderStatusChange};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DomainError::Conflict(info.message().to_string())
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Row mapping ───────────────────────────────────────────────────────────────

fn to_domain(order: OrderRow, lines: Vec<OrderLineRow>) -> Result<Order, DomainError> {
    let status = order
        .status
        .parse::<OrderStatus>()
        .map_err(DomainError::Internal)?;

    Ok(Order {
        id: order.id,
        customer_email: order.customer_email,
        lines: lines
            .into_iter()
            .map(|l| OrderLine {
                product_id: l.product_id,
                product_name: l.product_name,
                quantity: l.quantity,
                price_at_purchase: l.price_at_purchase,
            })
            .collect(),
        total_amount: order.total_amount,
        status,
        created_at: order.created_at,
        completed_at: order.completed_at,
        stripe_session_id: order.stripe_session_id,
        stripe_payment_intent_id: order.stripe_payment_intent_id,
    })
}

fn load_with_lines(conn: &mut PgConnection, order: OrderRow) -> Result<Order, DomainError> {
    let lines = OrderLineRow::belonging_to(&order)
        .select(OrderLineRow::as_select())
        .order(order_lines::line_no.asc())
        .load(conn)?;
    to_domain(order, lines)
}

fn line_number(index: usize) -> Result<i32, DomainError> {
    i32::try_from(index)
        .map_err(|_| DomainError::Internal(format!("line index {} does not fit line_no", index)))
}

fn line_rows(order_id: Uuid, lines: &[OrderLine]) -> Result<Vec<NewOrderLineRow>, DomainError> {
    lines
        .iter()
        .enumerate()
        .map(|(i, l)| {
            Ok(NewOrderLineRow {
                id: Uuid::new_v4(),
                order_id,
                line_no: line_number(i)?,
                product_id: l.product_id,
                product_name: l.product_name.clone(),
                quantity: l.quantity,
                price_at_purchase: l.price_at_purchase.clone(),
            })
        })
        .collect()
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn insert(&self, draft: OrderDraft) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Insert the order
            let order_id = Uuid::new_v4();
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    customer_email: draft.customer_email.clone(),
                    total_amount: draft.total_amount.clone(),
                    status: draft.status.as_str().to_string(),
                    created_at: draft.created_at,
                    completed_at: draft.completed_at,
                    stripe_session_id: draft.stripe_session_id.clone(),
                })
                .execute(conn)?;

            // 2. Insert order lines, numbered in request order
            let new_lines = line_rows(order_id, &draft.lines)?;
            diesel::insert_into(order_lines::table)
                .values(&new_lines)
                .execute(conn)?;

            let order = orders::table
                .find(order_id)
                .select(OrderRow::as_select())
                .first(conn)?;
            load_with_lines(conn, order)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        order.map(|o| load_with_lines(&mut conn, o)).transpose()
    }

    fn find_by_session_id(&self, session_id: &str) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::stripe_session_id.eq(session_id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        order.map(|o| load_with_lines(&mut conn, o)).transpose()
    }

    fn apply_transition(
        &self,
        order_id: Uuid,
        transition: &StatusTransition,
    ) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        // Compare-and-set on the status we read, so a concurrent writer wins
        // instead of being overwritten.
        let updated = diesel::update(
            orders::table
                .filter(orders::id.eq(order_id))
                .filter(orders::status.eq(transition.from.as_str())),
        )
        .set(&OrderStatusChange {
            status: transition.to.as_str().to_string(),
            completed_at: transition.completed_at,
            stripe_payment_intent_id: transition.payment_intent_id.clone(),
            updated_at: Utc::now(),
        })
        .execute(&mut conn)?;

        Ok(updated == 1)
    }
}
