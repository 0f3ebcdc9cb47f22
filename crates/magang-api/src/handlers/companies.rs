//! Company endpoints

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use magang_core::domain::Company;
use magang_core::services::CompanyInput;

use super::{ok, ApiResult};
use crate::error::ApiError;
use crate::extractors::{ApiJson, ApiPath, CurrentUser};
use crate::response::{ApiResponse, Deleted};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>, CurrentUser(caller): CurrentUser) -> ApiResult<Vec<Company>> {
    ok(state.companies.list(&caller).await?)
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Company> {
    ok(state.companies.get(&caller, &id).await?)
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiJson(payload): ApiJson<CompanyInput>,
) -> Result<(StatusCode, Json<ApiResponse<Company>>), ApiError> {
    let company = state.companies.create(&caller, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(company))))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CompanyInput>,
) -> ApiResult<Company> {
    ok(state.companies.update(&caller, &id, payload).await?)
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Deleted> {
    state.companies.delete(&caller, &id).await?;
    ok(Deleted { id })
}
