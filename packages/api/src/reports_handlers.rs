// ABOUTME: HTTP request handlers for aggregate reports
// ABOUTME: Reviewer-only JSON summaries over plannings, progress, and training

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use planea_planning::DateRange;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ComplianceQuery {
    pub cycle: Option<String>,
    pub partial: Option<i64>,
}

/// Planning counts by review status plus the compliance rate
pub async fn planning_compliance(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ComplianceQuery>,
) -> Result<impl IntoResponse, AppError> {
    let report = state
        .reports
        .planning_compliance(&user, query.cycle, query.partial)
        .await?;
    Ok(Json(ApiResponse::success(report)))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProgressReportQuery {
    pub partial: Option<i64>,
}

/// Progress totals with a per-professor breakdown
pub async fn progress_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ProgressReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let report = state.reports.progress(&user, query.partial).await?;
    Ok(Json(ApiResponse::success(report)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReportQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Approved training hours with a per-professor breakdown
pub async fn training_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<TrainingReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let range = DateRange { start: query.start_date, end: query.end_date };
    let report = state.reports.training(&user, range).await?;
    Ok(Json(ApiResponse::success(report)))
}
