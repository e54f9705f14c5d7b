// REST API over the budget service

mod author;
mod budget;
pub mod error;

use crate::config::Config;
use crate::service::BudgetService;
use axum::{
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use error::{ApiError, ApiResult};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: BudgetService,
}

impl AppState {
    pub fn new(service: BudgetService) -> Self {
        AppState { service }
    }

    /// Runs a blocking storage call off the async runtime
    pub(crate) async fn run<T, F>(&self, f: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&BudgetService) -> crate::error::Result<T> + Send + 'static,
    {
        let service = self.service.clone();
        tokio::task::spawn_blocking(move || f(&service))
            .await
            .map_err(|e| ApiError::Internal(format!("worker task failed: {}", e)))?
            .map_err(ApiError::from)
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// GET /health
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

pub fn app_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/author/add", post(author::add_author))
        .route("/budget/add", post(budget::add_record))
        .route("/budget/year/:year/stats", get(budget::year_stats))
        .with_state(state)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
