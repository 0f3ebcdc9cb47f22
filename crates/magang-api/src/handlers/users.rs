//! User administration (admin only)

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use magang_core::domain::{Role, User};
use magang_core::services::{NewUserInput, UpdateUserInput};

use super::{ok, ApiResult};
use crate::error::ApiError;
use crate::extractors::{ApiJson, ApiPath, CurrentUser};
use crate::response::{ApiResponse, Deleted};
use crate::state::AppState;

/// GET /users
pub async fn list(State(state): State<AppState>, CurrentUser(caller): CurrentUser) -> ApiResult<Vec<User>> {
    ok(state.users.list(&caller, None).await?)
}

/// GET /users/{role} (`peserta` and `pembimbing` are accepted too)
pub async fn list_by_role(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiPath(role): ApiPath<String>,
) -> ApiResult<Vec<User>> {
    let role = Role::parse(&role)?;
    ok(state.users.list(&caller, Some(role)).await?)
}

/// GET /users/detail/{id}
pub async fn get(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<User> {
    ok(state.users.get(&caller, &id).await?)
}

/// POST /users
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiJson(payload): ApiJson<NewUserInput>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let user = state.users.create(&caller, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

/// PUT /users/{id}
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateUserInput>,
) -> ApiResult<User> {
    ok(state.users.update(&caller, &id, payload).await?)
}

/// DELETE /users/{id}
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Deleted> {
    state.users.delete(&caller, &id).await?;
    ok(Deleted { id })
}
