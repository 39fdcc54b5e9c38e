use std::sync::Arc;

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::OrderService;
use crate::domain::order::{NewOrder, NewOrderItem, Order, OrderLine};
use crate::domain::ports::{OrderRepository, PaymentSessionGateway, ProductRepository};
use crate::errors::AppError;

/// The service as shared with handlers: collaborators behind trait objects so
/// the same routes serve the diesel/Stripe wiring and in-memory test doubles.
pub type AppOrderService = OrderService<
    Arc<dyn OrderRepository>,
    Arc<dyn ProductRepository>,
    Arc<dyn PaymentSessionGateway>,
>;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub items: Vec<CreateOrderItemRequest>,
    /// Checkout session the order will be reconciled against: 1 to 255 ASCII
    /// letters, digits or '_'.
    pub stripe_session_id: Option<String>,
}

impl From<CreateOrderRequest> for NewOrder {
    fn from(req: CreateOrderRequest) -> Self {
        NewOrder {
            customer_email: req.customer_email,
            items: req
                .items
                .into_iter()
                .map(|i| NewOrderItem {
                    product_id: i.product_id,
                    quantity: i.quantity,
                })
                .collect(),
            stripe_session_id: req.stripe_session_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    /// Unit price at purchase time, as a decimal string, e.g. "9.99"
    pub price_at_purchase: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_email: String,
    pub items: Vec<OrderLineResponse>,
    pub total_amount: String,
    pub status: String,
    pub created_at: String,
    pub completed_at: Option<String>,
    pub stripe_session_id: Option<String>,
    pub stripe_payment_intent_id: Option<String>,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(l: OrderLine) -> Self {
        OrderLineResponse {
            product_id: l.product_id,
            product_name: l.product_name,
            quantity: l.quantity,
            price_at_purchase: l.price_at_purchase.to_string(),
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            id: o.id,
            customer_email: o.customer_email,
            items: o.lines.into_iter().map(OrderLineResponse::from).collect(),
            total_amount: o.total_amount.to_string(),
            status: o.status.as_str().to_string(),
            created_at: o.created_at.to_rfc3339(),
            completed_at: o.completed_at.map(|t| t.to_rfc3339()),
            stripe_session_id: o.stripe_session_id,
            stripe_payment_intent_id: o.stripe_payment_intent_id,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Prices every item against the current product catalogue and stores the
/// order with its lines in a single transaction.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderResponse),
        (status = 400, description = "Invalid email, empty cart, bad quantity or session id"),
        (status = 404, description = "A product in the cart does not exist"),
        (status = 409, description = "Checkout session already attached to an order"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<AppOrderService>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let new_order = NewOrder::from(body.into_inner());

    let order = web::block(move || service.create_order(new_order))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/orders/{}", order.id)))
        .json(OrderResponse::from(order)))
}

/// GET /orders/{id}
///
/// Returns the order together with its order lines.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<AppOrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let result = web::block(move || service.get_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match result {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from(order))),
        None => Err(AppError::NotFound("Order not found".to_string())),
    }
}

/// GET /orders/session/{session_id}
///
/// Reads the checkout session from the payment provider and reconciles the
/// matching order's status before returning it.
#[utoipa::path(
    get,
    path = "/orders/session/{session_id}",
    params(
        ("session_id" = String, Path, description = "Checkout session id"),
    ),
    responses(
        (status = 200, description = "Order found and reconciled", body = OrderResponse),
        (status = 400, description = "Invalid or unknown session id"),
        (status = 404, description = "No order for this session"),
        (status = 502, description = "Payment provider unavailable"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order_by_session(
    service: web::Data<AppOrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();

    let order = web::block(move || service.get_order_by_session(&session_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
