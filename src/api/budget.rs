use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::entities::BudgetRecord;
use crate::stats::{StatsQuery, YearStats};
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

/// Query string of the stats endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsParams {
    pub limit: u32,
    pub offset: u32,
    pub fio_filter: Option<String>,
}

/// POST /budget/add
pub async fn add_record(
    State(state): State<AppState>,
    body: Result<Json<BudgetRecord>, JsonRejection>,
) -> ApiResult<Json<BudgetRecord>> {
    let Json(record) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let stored = state.run(move |service| service.add_record(&record)).await?;
    Ok(Json(stored))
}

/// GET /budget/year/:year/stats?limit=&offset=&fioFilter=
pub async fn year_stats(
    State(state): State<AppState>,
    year: Result<Path<i32>, PathRejection>,
    params: Result<Query<StatsParams>, QueryRejection>,
) -> ApiResult<Json<YearStats>> {
    let Path(year) = year.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let query = StatsQuery {
        year,
        limit: params.limit,
        offset: params.offset,
        fio_filter: params.fio_filter,
    };
    let stats = state.run(move |service| service.year_stats(&query)).await?;
    Ok(Json(stats))
}
