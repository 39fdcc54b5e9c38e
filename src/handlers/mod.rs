pub mod orders;

use actix_web::web;
use utoipa::OpenApi;

use crate::errors::AppError;

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::create_order,
        orders::get_order,
        orders::get_order_by_session,
    ),
    components(schemas(
        orders::CreateOrderRequest,
        orders::CreateOrderItemRequest,
        orders::OrderResponse,
        orders::OrderLineResponse,
    )),
    tags((name = "orders", description = "Order creation and payment reconciliation"))
)]
pub struct ApiDoc;

/// Register the order routes and the JSON body error handler.
///
/// Expects a `web::Data<orders::AppOrderService>` to be registered as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid request body: {}", err)).into()
    }))
    .service(
        web::scope("/orders")
            .route("", web::post().to(orders::create_order))
            .route("/session/{session_id}", web::get().to(orders::get_order_by_session))
            .route("/{id}", web::get().to(orders::get_order)),
    );
}
