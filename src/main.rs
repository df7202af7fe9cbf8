use actix_web::web;
use marketplace_service::{build_server, create_pool, run_migrations, AppConfig, AppState, JwtKeys};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let pool = create_pool(&config.database_url, config.db_pool_size)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    run_migrations(&pool).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let keys = JwtKeys::new(
        &config.jwt_secret,
        config.access_token_ttl,
        config.refresh_token_ttl,
    );
    let state = AppState::new(pool, &config);

    log::info!(
        "Starting server at http://{}:{} (pricing policy {:?}, restock on cancel {})",
        config.host,
        config.port,
        config.pricing_policy,
        config.restock_on_cancel
    );

    build_server(
        web::Data::new(state),
        web::Data::new(keys),
        &config.host,
        config.port,
    )?
    .await
}
