// ============================================================================
// Magang API - Auth Handlers
// File: crates/magang-api/src/handlers/auth.rs
// ============================================================================
//! Login, registration and the caller's own profile

use axum::{extract::multipart::MultipartRejection, extract::{Multipart, State}, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use magang_core::domain::User;
use magang_core::error::ValidationError;
use magang_core::services::{Profile, ProfileUpdate, RegisterInput};

use super::form::FormData;
use super::{ok, ApiResult};
use crate::error::ApiError;
use crate::extractors::{ApiJson, CurrentUser};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    if payload.username.trim().is_empty() {
        return Err(ValidationError::MissingField("username".into()).into());
    }
    if payload.password.is_empty() {
        return Err(ValidationError::MissingField("password".into()).into());
    }

    let result = state.identity.authenticate(&payload.username, &payload.password).await?;
    ok(LoginResponse {
        token: result.token,
        token_type: "Bearer",
        expires_in: result.expires_in,
        user: result.user,
    })
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterInput>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterResponse>>), ApiError> {
    let user = state.identity.register(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(RegisterResponse { id: user.id }))))
}

/// GET /auth/me
pub async fn me(State(state): State<AppState>, CurrentUser(caller): CurrentUser) -> ApiResult<Profile> {
    ok(state.users.profile(&caller).await?)
}

/// PUT /auth/me
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiJson(payload): ApiJson<ProfileUpdate>,
) -> ApiResult<User> {
    ok(state.users.update_profile(&caller, payload).await?)
}

/// PUT /auth/password
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> ApiResult<()> {
    state
        .users
        .change_password(&caller, &payload.current_password, &payload.new_password)
        .await?;
    ok(())
}

/// POST /auth/me/photo (multipart field `foto`)
pub async fn upload_photo(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<User> {
    let mut form = FormData::read(multipart?).await?;
    let photo = form
        .take_file("foto")
        .ok_or_else(|| ValidationError::MissingField("foto".into()))?;

    ok(state.users.update_photo(&caller, photo).await?)
}
