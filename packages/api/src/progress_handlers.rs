// ABOUTME: HTTP request handlers for partial-progress reporting
// ABOUTME: Entries are gated by the parent planning's approval status

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use planea_planning::{ProgressCreateInput, ProgressUpdateInput};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Record a progress entry; the parent planning must be approved
pub async fn create_progress(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<ProgressCreateInput>,
) -> Result<impl IntoResponse, AppError> {
    info!("Recording progress for planning {}", input.planning_id);

    let progress = state.progress.create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(progress))))
}

/// List progress entries under a planning
pub async fn list_progress_for_planning(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(planning_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entries = state.progress.list_for_planning(&user, &planning_id).await?;
    Ok(Json(ApiResponse::success(entries)))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProgressStatsQuery {
    pub partial: Option<i64>,
}

/// Aggregate progress statistics (reviewers only)
pub async fn progress_stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ProgressStatsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let stats = state.progress.stats(&user, query.partial).await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// Update a progress entry; the status is re-derived from the percentage
pub async fn update_progress(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<ProgressUpdateInput>,
) -> Result<impl IntoResponse, AppError> {
    info!("Updating progress {}", id);

    let progress = state.progress.update(&user, &id, input).await?;
    Ok(Json(ApiResponse::success(progress)))
}

/// Soft-delete a progress entry
pub async fn delete_progress(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    info!("Deleting progress {}", id);

    state.progress.delete(&user, &id).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({"message": "Progress deleted"}),
    )))
}
