//! HTTP handlers

pub mod auth;
pub mod companies;
pub mod form;
pub mod health;
pub mod logbook;
pub mod placements;
pub mod stats;
pub mod users;

use axum::Json;

use crate::error::ApiError;
use crate::response::ApiResponse;

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub(crate) fn ok<T: serde::Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}
