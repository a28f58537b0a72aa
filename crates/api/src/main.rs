use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use domain::services::SystemClock;
use persistence::repositories::PgAnalyticsStore;
use shopdesk_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging
    middleware::logging::init_logging(&config.logging)?;
    middleware::init_metrics()?;

    info!("Starting Shopdesk API v{}", env!("CARGO_PKG_VERSION"));

    // Create database pool
    let db_config: persistence::db::DatabaseConfig = (&config.database).into();
    let pool = persistence::db::create_pool(&db_config)
        .await
        .context("failed to connect to the database")?;

    // Run migrations
    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let addr = config.socket_addr()?;

    // Build application
    let store = Arc::new(PgAnalyticsStore::new(pool));
    let app = app::create_app(config, store, Arc::new(SystemClock));

    // Start server
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
