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

use crate::application::checkout_service::CheckoutService;
use crate::application::fulfillment_service::FulfillmentService;
use crate::config::AppConfig;
use crate::domain::ports::PaymentGateway;
use crate::errors::AppError;
use crate::handlers::ApiDoc;
use crate::infrastructure::catalog_repo::DieselCatalogRepository;
use crate::infrastructure::sale_repo::DieselSaleRepository;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), String> {
    let mut conn = pool
        .get()
        .map_err(|e| format!("Failed to get DB connection for migrations: {e}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| format!("Failed to run database migrations: {e}"))?;
    Ok(())
}

/// Route table, shared by the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/checkout")
            .route("/preferences", web::post().to(handlers::checkout::create_preference)),
    )
    .service(
        web::scope("/webhooks").route(
            "/payments",
            web::post().to(handlers::webhooks::receive_payment_notification),
        ),
    )
    .route("/payments/{id}", web::get().to(handlers::payments::get_payment))
    .route("/sales/{id}", web::get().to(handlers::sales::get_sale))
    .route("/config/status", web::get().to(handlers::status::config_status));
}

/// Rejected JSON bodies get the same `{success: false, error}` shape as every
/// other client error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Build and return an actix-web `Server` bound to the configured host and
/// port.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    gateway: Arc<dyn PaymentGateway>,
    config: &AppConfig,
) -> std::io::Result<actix_web::dev::Server> {
    let checkout = web::Data::new(CheckoutService::new(
        Arc::new(DieselCatalogRepository::new(pool.clone())),
        gateway.clone(),
        config.checkout_settings(),
    ));
    let fulfillment = web::Data::new(FulfillmentService::new(
        Arc::new(DieselSaleRepository::new(pool)),
        gateway,
    ));
    let report = web::Data::new(config.report());

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(json_config())
            .app_data(checkout.clone())
            .app_data(fulfillment.clone())
            .app_data(report.clone())
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((config.host.clone(), config.port))?
    .run())
}
