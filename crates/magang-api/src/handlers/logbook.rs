// ============================================================================
// Magang API - Logbook Handlers
// File: crates/magang-api/src/handlers/logbook.rs
// ============================================================================
//! Logbook submission (multipart), listings and review status

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use magang_core::domain::{Attendance, LogbookEntry};
use magang_core::error::ValidationError;
use magang_core::services::{EditLogbook, SubmitLogbook};

use super::form::FormData;
use super::{ok, ApiResult};
use crate::error::ApiError;
use crate::extractors::{ApiJson, ApiPath, CurrentUser};
use crate::response::{ApiResponse, Deleted};
use crate::state::AppState;

const FIELD_DESCRIPTION: &str = "kegiatan";
const FIELD_DATE: &str = "tanggal";
const FIELD_ATTENDANCE: &str = "kehadiran";
const FIELD_EVIDENCE: &str = "bukti_foto";

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ValidationError::Invalid(format!("{} must be YYYY-MM-DD, got {}", FIELD_DATE, value)))
}

fn parse_attendance(value: &str) -> Result<Attendance, ValidationError> {
    Attendance::from_str(value)
        .ok_or_else(|| ValidationError::Invalid(format!("{} must be hadir, izin or sakit", FIELD_ATTENDANCE)))
}

fn submission(mut form: FormData) -> Result<SubmitLogbook, ValidationError> {
    let activity_date = form
        .text(FIELD_DATE)
        .ok_or_else(|| ValidationError::MissingField(FIELD_DATE.into()))
        .and_then(parse_date)?;

    Ok(SubmitLogbook {
        activity_date,
        description: form.text(FIELD_DESCRIPTION).unwrap_or_default().to_string(),
        attendance: form.text(FIELD_ATTENDANCE).map(parse_attendance).transpose()?,
        evidence: form.take_file(FIELD_EVIDENCE),
    })
}

fn edit(mut form: FormData) -> Result<EditLogbook, ValidationError> {
    Ok(EditLogbook {
        activity_date: form.text(FIELD_DATE).map(parse_date).transpose()?,
        description: form.text(FIELD_DESCRIPTION).map(str::to_string),
        attendance: form.text(FIELD_ATTENDANCE).map(parse_attendance).transpose()?,
        evidence: form.take_file(FIELD_EVIDENCE),
    })
}

/// POST /logbook
pub async fn submit(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ApiResponse<LogbookEntry>>), ApiError> {
    let form = FormData::read(multipart?).await?;
    let entry = state.logbook.submit(&caller, submission(form)?).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(entry))))
}

/// GET /logbook (admin)
pub async fn list_all(State(state): State<AppState>, CurrentUser(caller): CurrentUser) -> ApiResult<Vec<LogbookEntry>> {
    ok(state.logbook.list_all(&caller).await?)
}

/// GET /logbook/me
pub async fn list_mine(State(state): State<AppState>, CurrentUser(caller): CurrentUser) -> ApiResult<Vec<LogbookEntry>> {
    ok(state.logbook.list_mine(&caller).await?)
}

/// GET /logbook/supervisor
pub async fn list_supervised(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> ApiResult<Vec<LogbookEntry>> {
    ok(state.logbook.list_supervised(&caller).await?)
}

/// GET /logbook/{id}
pub async fn get(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<LogbookEntry> {
    ok(state.logbook.get(&caller, &id).await?)
}

/// PUT /logbook/{id} (owner, multipart, pending entries only)
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<LogbookEntry> {
    let form = FormData::read(multipart?).await?;
    ok(state.logbook.update_content(&caller, &id, edit(form)?).await?)
}

/// PUT /logbook-status/{id}
pub async fn update_status(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<StatusRequest>,
) -> ApiResult<LogbookEntry> {
    ok(state.logbook.update_status(&caller, &id, &payload.status).await?)
}

/// DELETE /logbook/{id}
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Deleted> {
    state.logbook.remove(&caller, &id).await?;
    ok(Deleted { id })
}
