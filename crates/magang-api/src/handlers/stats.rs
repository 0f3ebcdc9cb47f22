//! Dashboard counters

use axum::extract::State;

use magang_core::services::{AdminStats, ParticipantStats, SupervisorStats};

use super::{ok, ApiResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;

/// GET /admin/stats
pub async fn admin(State(state): State<AppState>, CurrentUser(caller): CurrentUser) -> ApiResult<AdminStats> {
    ok(state.stats.admin(&caller).await?)
}

/// GET /supervisor/stats
pub async fn supervisor(State(state): State<AppState>, CurrentUser(caller): CurrentUser) -> ApiResult<SupervisorStats> {
    ok(state.stats.supervisor(&caller).await?)
}

/// GET /participant/stats
pub async fn participant(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> ApiResult<ParticipantStats> {
    ok(state.stats.participant(&caller).await?)
}
