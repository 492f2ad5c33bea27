// ABOUTME: HTTP request handlers for the planning review workflow
// ABOUTME: Submission, listing, history, update, review decision, soft delete

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use planea_planning::{
    PlanningCreateInput, PlanningFilter, PlanningReviewInput, PlanningStatus, PlanningUpdateInput,
};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Query filters for listing plannings. A professorId supplied by a
/// professor is silently overridden with their own id in the workflow.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningListQuery {
    pub course_name: Option<String>,
    pub partial: Option<i64>,
    pub status: Option<PlanningStatus>,
    pub cycle: Option<String>,
    pub professor_id: Option<String>,
}

impl From<PlanningListQuery> for PlanningFilter {
    fn from(query: PlanningListQuery) -> Self {
        PlanningFilter {
            professor_id: query.professor_id,
            course_name: query.course_name,
            partial: query.partial,
            status: query.status,
            cycle: query.cycle,
        }
    }
}

/// Submit a planning (professors only)
pub async fn create_planning(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<PlanningCreateInput>,
) -> Result<impl IntoResponse, AppError> {
    info!("Submitting planning for course {}", input.course_name);

    let planning = state.plannings.create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(planning))))
}

/// List plannings visible to the requester
pub async fn list_plannings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PlanningListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let plannings = state.plannings.list(&user, query.into()).await?;
    Ok(Json(ApiResponse::success(plannings)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub exclude_cycle: Option<String>,
}

/// Plannings for a course across past cycles
pub async fn planning_history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(course_name): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let plannings = state
        .plannings
        .history(&user, &course_name, query.exclude_cycle.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(plannings)))
}

/// Get a single planning
pub async fn get_planning(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let planning = state.plannings.get(&user, &id).await?;
    Ok(Json(ApiResponse::success(planning)))
}

/// Update a planning's content (owning professor only)
pub async fn update_planning(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<PlanningUpdateInput>,
) -> Result<impl IntoResponse, AppError> {
    info!("Updating planning {}", id);

    let planning = state.plannings.update(&user, &id, input).await?;
    Ok(Json(ApiResponse::success(planning)))
}

/// Record a review decision (reviewers only, feedback required)
pub async fn review_planning(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<PlanningReviewInput>,
) -> Result<impl IntoResponse, AppError> {
    info!("Reviewing planning {}", id);

    let planning = state.plannings.review(&user, &id, input).await?;
    Ok(Json(ApiResponse::success(planning)))
}

/// Soft-delete a planning
pub async fn delete_planning(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    info!("Deleting planning {}", id);

    state.plannings.delete(&user, &id).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({"message": "Planning deleted"}),
    )))
}
