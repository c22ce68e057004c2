//! Habitrack API - AWS Lambda Runtime

use lambda_http::{run, Error};
use sqlx::PgPool;
use tracing::info;

use habitrack_app::{create_app, with_http_layers};
use habitrack_common::Config;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .without_time()
        .init();

    info!("Initializing Habitrack API Lambda");

    let config = Config::from_env().map_err(|e| Error::from(format!("Configuration error: {}", e)))?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .map_err(|e| Error::from(format!("Database error: {}", e)))?;

    info!("Database connection established");

    let app = create_app(&config, pool)
        .map_err(|e| Error::from(format!("App initialization error: {}", e)))?;

    let app = with_http_layers(app, &config.cors_allowed_origins);

    info!("Habitrack API Lambda ready to serve requests");

    run(app).await
}
