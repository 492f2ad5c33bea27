// ABOUTME: HTTP request handler for the synthesized calendar agenda
// ABOUTME: Events come from database rows, not from the external calendar

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

const DEFAULT_MAX_RESULTS: usize = 50;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaQuery {
    pub max_results: Option<usize>,
}

/// The requesting user's agenda: plannings, evidences, and progress entries
pub async fn list_events(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<AgendaQuery>,
) -> Result<impl IntoResponse, AppError> {
    let max_results = query.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
    let events = planea_calendar::build_agenda(&state.db, &user, max_results).await?;
    Ok(Json(ApiResponse::success(events)))
}
