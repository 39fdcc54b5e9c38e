pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::order_service::OrderService;
use domain::ports::{OrderRepository, PaymentSessionGateway, ProductRepository};
use handlers::orders::AppOrderService;
use infrastructure::order_repo::DieselOrderRepository;
use infrastructure::product_repo::DieselProductRepository;
use infrastructure::stripe::StripeSessionGateway;

pub use config::Config;
pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type MigrationError = Box<dyn std::error::Error + Send + Sync>;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), MigrationError> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

/// Wire the diesel repositories and the Stripe gateway into an order service.
///
/// Must be called outside of an async runtime (or from a blocking task): the
/// Stripe gateway owns a blocking HTTP client.
pub fn build_service(pool: DbPool, config: &Config) -> std::io::Result<AppOrderService> {
    let payments = StripeSessionGateway::new(&config.stripe_api_base, &config.stripe_secret_key)
        .map_err(std::io::Error::other)?;

    let orders: Arc<dyn OrderRepository> = Arc::new(DieselOrderRepository::new(pool.clone()));
    let products: Arc<dyn ProductRepository> = Arc::new(DieselProductRepository::new(pool));
    let payments: Arc<dyn PaymentSessionGateway> = Arc::new(payments);

    log::info!(
        "Order creation policy: {:?}, Stripe API at {}",
        config.creation_policy,
        config.stripe_api_base
    );

    Ok(OrderService::new(
        orders,
        products,
        payments,
        config.creation_policy,
    ))
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    service: AppOrderService,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(service);
    let openapi = handlers::ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(Logger::default())
            .configure(handlers::configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
