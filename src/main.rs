use dotenvy::dotenv;
use order_checkout_service::{build_server, build_service, create_pool, run_migrations, Config};

fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(std::io::Error::other)?;

    let pool = create_pool(&config.database_url).map_err(std::io::Error::other)?;
    run_migrations(&pool).map_err(std::io::Error::other)?;

    // The Stripe gateway's blocking client has to be created before the
    // runtime starts.
    let service = build_service(pool, &config)?;

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    actix_web::rt::System::new().block_on(async move {
        build_server(service, &config.host, config.port)?.await
    })
}
