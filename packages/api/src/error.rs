// ABOUTME: API error type mapping workflow errors to HTTP responses
// ABOUTME: Upstream/storage details are logged, never sent to the client

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use planea_planning::WorkflowError;

use crate::response::ApiResponse;

/// Error type returned by every handler and the auth middleware
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthenticated(&'static str),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Unauthenticated(message) => {
                (StatusCode::UNAUTHORIZED, ApiResponse::error(message))
            }
            AppError::Workflow(err) => match err {
                WorkflowError::Validation(errors) => (
                    StatusCode::BAD_REQUEST,
                    ApiResponse::validation("Validation failed", errors),
                ),
                WorkflowError::Forbidden(message) => {
                    (StatusCode::FORBIDDEN, ApiResponse::error(message))
                }
                WorkflowError::NotFound(what) => (
                    StatusCode::NOT_FOUND,
                    ApiResponse::error(format!("{} not found", what)),
                ),
                WorkflowError::Conflict(message) => {
                    (StatusCode::CONFLICT, ApiResponse::error(message))
                }
                WorkflowError::Upstream(e) => {
                    error!("File storage failure: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiResponse::error("File storage is unavailable"),
                    )
                }
                WorkflowError::Password(e) => {
                    error!("Password hashing failure: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiResponse::error("Internal server error"),
                    )
                }
                WorkflowError::Storage(e) => {
                    error!("Storage failure: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiResponse::error("Internal server error"),
                    )
                }
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planea_planning::ValidationError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                AppError::Unauthenticated("Missing bearer token"),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::Workflow(WorkflowError::Validation(vec![ValidationError::new(
                    "feedback",
                    "feedback is required",
                )])),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Workflow(WorkflowError::Forbidden("no")),
                StatusCode::FORBIDDEN,
            ),
            (
                AppError::Workflow(WorkflowError::NotFound("Planning")),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::Workflow(WorkflowError::Conflict("duplicate email".into())),
                StatusCode::CONFLICT,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
