//! Placement endpoints

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use magang_core::domain::Placement;
use magang_core::services::PlacementInput;

use super::{ok, ApiResult};
use crate::error::ApiError;
use crate::extractors::{ApiJson, ApiPath, CurrentUser};
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /placements (supervisors only see their own)
pub async fn list(State(state): State<AppState>, CurrentUser(caller): CurrentUser) -> ApiResult<Vec<Placement>> {
    ok(state.placements.list(&caller).await?)
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Placement> {
    ok(state.placements.get(&caller, &id).await?)
}

/// GET /placements/me; `data` is null while the participant is unplaced.
pub async fn mine(State(state): State<AppState>, CurrentUser(caller): CurrentUser) -> ApiResult<Option<Placement>> {
    ok(state.placements.mine(&caller).await?)
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiJson(payload): ApiJson<PlacementInput>,
) -> Result<(StatusCode, Json<ApiResponse<Placement>>), ApiError> {
    let placement = state.placements.create(&caller, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(placement))))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<PlacementInput>,
) -> ApiResult<Placement> {
    ok(state.placements.update(&caller, &id, payload).await?)
}

/// DELETE /placements/{id}: the participant goes back to locked.
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Placement> {
    ok(state.placements.remove(&caller, &id).await?)
}
