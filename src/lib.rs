pub mod application;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;
pub mod schema;
pub mod state;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use auth::JwtKeys;
pub use config::AppConfig;
pub use db::{create_pool, DbPool};
pub use errors::AppError;
pub use state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), String> {
    let mut conn = pool
        .get()
        .map_err(|e| format!("failed to get DB connection for migrations: {}", e))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| format!("failed to run database migrations: {}", e))?;
    for version in applied {
        log::info!("Applied migration {}", version);
    }
    Ok(())
}

/// Registers every route on an actix `ServiceConfig`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(handlers::orders::create_order))
            .route("", web::get().to(handlers::orders::list_orders))
            .route("/user", web::get().to(handlers::orders::list_my_orders))
            .route("/{id}", web::get().to(handlers::orders::get_order))
            .route(
                "/{id}/status",
                web::put().to(handlers::orders::update_order_status),
            ),
    )
    .service(
        web::scope("/cart")
            .route("", web::get().to(handlers::cart::get_cart))
            .route("", web::post().to(handlers::cart::add_to_cart))
            .route("", web::delete().to(handlers::cart::clear_cart))
            .route("/{id}", web::put().to(handlers::cart::update_cart_item))
            .route("/{id}", web::delete().to(handlers::cart::remove_cart_item)),
    )
    .service(
        web::scope("/products")
            .route("", web::post().to(handlers::products::create_product))
            .route("/{id}", web::get().to(handlers::products::get_product))
            .route("/{id}", web::put().to(handlers::products::update_product)),
    )
    .service(
        web::scope("/shops")
            .route("", web::post().to(handlers::shops::create_shop))
            .route("/{id}", web::get().to(handlers::shops::get_shop))
            .route("/{id}", web::put().to(handlers::shops::update_shop)),
    )
    .service(
        web::scope("/auth/verify/{channel}")
            .route("/send", web::post().to(handlers::verification::send_code))
            .route("/confirm", web::post().to(handlers::verification::confirm_code))
            .route(
                "/status",
                web::get().to(handlers::verification::verification_status),
            ),
    )
    .route("/health", web::get().to(handlers::health::health));
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: web::Data<AppState>,
    keys: web::Data<JwtKeys>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(keys.clone())
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
