// Budget Stats - Web Server

use anyhow::{Context, Result};
use budget_stats::api::{app_router, AppState};
use budget_stats::telemetry::init_tracing;
use budget_stats::{BudgetService, Config, SqliteRepository};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.log_format);

    let repo = SqliteRepository::open(&config.db_path)
        .with_context(|| format!("Failed to open database at {}", config.db_path))?;
    tracing::info!(db_path = %config.db_path, "database opened");

    let state = AppState::new(BudgetService::new(Arc::new(repo)));
    let app = app_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen_addr))?;
    tracing::info!(version = budget_stats::VERSION, "listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
