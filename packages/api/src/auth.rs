// ABOUTME: Bearer-token authentication middleware and the CurrentUser extractor
// ABOUTME: Resolves tokens through the user workflow; whitelists health and login

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use planea_auth::AuthUser;

use crate::error::AppError;
use crate::state::AppState;

/// Paths that don't require authentication
const WHITELISTED_PATHS: &[&str] = &["/api/health", "/api/auth/login"];

/// The raw bearer token, kept around so logout can revoke its own session
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Bearer-token validation middleware applied to every /api route
pub async fn bearer_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path();

    if WHITELISTED_PATHS.contains(&path) {
        debug!(path = %path, "Path whitelisted, skipping token validation");
        return Ok(next.run(request).await);
    }

    let Some(token) = bearer_token(&request) else {
        warn!(path = %path, "Missing bearer token");
        return Err(AppError::Unauthenticated(
            "Bearer token required. Please include an Authorization header.",
        ));
    };
    let token = token.to_string();

    let user = state
        .users
        .resolve(&token)
        .await?
        .ok_or(AppError::Unauthenticated("Invalid or expired session"))?;

    debug!(path = %path, user = %user.email, "Bearer token validated");

    request.extensions_mut().insert(user);
    request.extensions_mut().insert(BearerToken(token));

    Ok(next.run(request).await)
}

/// Extractor for the authenticated identity resolved by the middleware
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::Unauthenticated("Authentication required"))
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<BearerToken>()
            .cloned()
            .ok_or(AppError::Unauthenticated("Authentication required"))
    }
}
