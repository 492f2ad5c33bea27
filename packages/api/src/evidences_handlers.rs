// ABOUTME: HTTP request handlers for the training-evidence workflow
// ABOUTME: Mirrors the planning surface with a binary review outcome

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use planea_planning::{
    EvidenceCreateInput, EvidenceFilter, EvidenceReviewInput, EvidenceStatus, EvidenceUpdateInput,
};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceListQuery {
    pub status: Option<EvidenceStatus>,
    pub professor_id: Option<String>,
}

impl From<EvidenceListQuery> for EvidenceFilter {
    fn from(query: EvidenceListQuery) -> Self {
        EvidenceFilter {
            professor_id: query.professor_id,
            status: query.status,
        }
    }
}

/// Submit a training evidence (professors only; a file is required)
pub async fn create_evidence(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<EvidenceCreateInput>,
) -> Result<impl IntoResponse, AppError> {
    info!("Submitting evidence for course {}", input.course_name);

    let evidence = state.evidences.create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(evidence))))
}

/// List evidences visible to the requester
pub async fn list_evidences(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<EvidenceListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let evidences = state.evidences.list(&user, query.into()).await?;
    Ok(Json(ApiResponse::success(evidences)))
}

/// Get a single evidence
pub async fn get_evidence(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let evidence = state.evidences.get(&user, &id).await?;
    Ok(Json(ApiResponse::success(evidence)))
}

/// Update an evidence (owning professor only)
pub async fn update_evidence(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<EvidenceUpdateInput>,
) -> Result<impl IntoResponse, AppError> {
    info!("Updating evidence {}", id);

    let evidence = state.evidences.update(&user, &id, input).await?;
    Ok(Json(ApiResponse::success(evidence)))
}

/// Record a review decision (reviewers only, feedback required)
pub async fn review_evidence(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<EvidenceReviewInput>,
) -> Result<impl IntoResponse, AppError> {
    info!("Reviewing evidence {}", id);

    let evidence = state.evidences.review(&user, &id, input).await?;
    Ok(Json(ApiResponse::success(evidence)))
}

/// Soft-delete an evidence
pub async fn delete_evidence(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    info!("Deleting evidence {}", id);

    state.evidences.delete(&user, &id).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({"message": "Evidence deleted"}),
    )))
}
