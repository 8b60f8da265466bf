use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use statement_ledger::api::{create_router, AppState};
use statement_ledger::config::Settings;
use statement_ledger::observability::{init_logging, init_metrics, LogConfig, LogFormat};
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;

    // Initialize logging and metrics
    init_logging(&LogConfig {
        level: settings.application.log_level.clone(),
        format: LogFormat::from(settings.application.log_format.as_str()),
        ..LogConfig::default()
    });
    let metrics_handle = init_metrics()?;
    info!("Configuration loaded");

    // Connect to PostgreSQL
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(settings.database.pool_size)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&settings.database.url)
        .await
        .context("failed to connect to database")?;

    info!("Database connection established");

    // Run migrations
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations applied successfully");

    // Serve the API
    let state = AppState::new(pool).with_metrics(metrics_handle);
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", settings.application.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Statement ledger listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
