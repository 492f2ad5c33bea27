// ABOUTME: HTTP request handlers for user account management
// ABOUTME: Admin-managed accounts with self-service profile updates

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use planea_planning::{UserCreateInput, UserUpdateInput};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Create a user account (admin only)
pub async fn create_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<UserCreateInput>,
) -> Result<impl IntoResponse, AppError> {
    info!("Creating user {}", input.email);

    let created = state.users.create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// List active users (reviewers only)
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let users = state.users.list(&user).await?;
    Ok(Json(ApiResponse::success(users)))
}

/// List active professors (reviewers only)
pub async fn list_professors(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let professors = state.users.list_professors(&user).await?;
    Ok(Json(ApiResponse::success(professors)))
}

/// Get a user; reviewers any, professors only themselves
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let found = state.users.get(&user, &user_id).await?;
    Ok(Json(ApiResponse::success(found)))
}

/// Update a user; role and activation changes are admin-only
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<String>,
    Json(input): Json<UserUpdateInput>,
) -> Result<impl IntoResponse, AppError> {
    info!("Updating user {}", user_id);

    let updated = state.users.update(&user, &user_id, input).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Soft-delete a user and revoke their sessions (admin only)
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    info!("Deleting user {}", user_id);

    state.users.delete(&user, &user_id).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({"message": "User deactivated"}),
    )))
}
