// ABOUTME: HTTP request handlers for login, logout, and identity lookup
// ABOUTME: Login is the only unauthenticated operation besides the health check

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use tracing::info;

use crate::auth::{BearerToken, CurrentUser};
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Verify credentials and issue a bearer session
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.users.login(&request.email, &request.password).await?;

    match session {
        Some(session) => Ok(Json(ApiResponse::success(session)).into_response()),
        None => Ok((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Invalid email or password")),
        )
            .into_response()),
    }
}

/// Revoke the session behind the presented token
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    BearerToken(token): BearerToken,
) -> Result<impl IntoResponse, AppError> {
    state.users.logout(&token).await?;
    info!("User {} logged out", user.email);

    Ok(Json(ApiResponse::success(
        serde_json::json!({"message": "Session revoked"}),
    )))
}

/// The identity resolved from the presented token
pub async fn me(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    Json(ApiResponse::success(user))
}
