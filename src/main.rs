use std::io;
use std::sync::Arc;

use dotenvy::dotenv;
use fulfillment_service::config::{AppConfig, CredentialMode};
use fulfillment_service::infrastructure::mercado_pago::MercadoPagoClient;
use fulfillment_service::{build_server, create_pool, run_migrations};

fn fatal(message: String) -> io::Error {
    log::error!("{message}");
    io::Error::new(io::ErrorKind::Other, message)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| fatal(format!("Invalid configuration: {e}")))?;

    let pool = create_pool(&config.database_url)
        .map_err(|e| fatal(format!("Failed to create database pool: {e}")))?;
    run_migrations(&pool).map_err(fatal)?;

    let gateway = MercadoPagoClient::new(
        &config.provider_api_url,
        &config.access_token,
        config.provider_timeout,
    )
    .map_err(|e| fatal(format!("Failed to build payment provider client: {e}")))?;

    let report = config.report();
    if report.mode == CredentialMode::Production {
        log::warn!("Using production payment credentials");
    } else {
        log::info!("Using test payment credentials");
    }

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(pool, Arc::new(gateway), &config)?.await
}
