//! # Waiting Room API Main Entry Point
//!
//! Loads configuration, prepares the database and serves the providers API.

use waiting_room::{config::ConfigLoader, db, server::run_server, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigLoader::new().load()?;

    telemetry::init_tracing(&config)?;
    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(configuration = %redacted_json, "Effective configuration");
    }

    let pool = db::init_pool(&config).await?;
    // Best effort: a missing schema is logged and requests fail until it exists
    db::initialize_schema(&pool).await;

    run_server(config, pool).await
}
