use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::entities::{AuthorRecord, AuthorRecordResponse};
use axum::{extract::rejection::JsonRejection, extract::State, Json};

/// POST /author/add
pub async fn add_author(
    State(state): State<AppState>,
    body: Result<Json<AuthorRecord>, JsonRejection>,
) -> ApiResult<Json<AuthorRecordResponse>> {
    let Json(record) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let response = state.run(move |service| service.add_author(&record)).await?;
    Ok(Json(response))
}
