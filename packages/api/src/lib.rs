// ABOUTME: HTTP API layer for Planea providing REST endpoints and routing
// ABOUTME: Integration layer that depends on the domain packages

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

pub mod auth;
pub mod auth_handlers;
pub mod calendar_handlers;
pub mod error;
pub mod evidences_handlers;
pub mod health;
pub mod plannings_handlers;
pub mod progress_handlers;
pub mod reports_handlers;
pub mod response;
pub mod state;
pub mod users_handlers;

pub use state::AppState;

/// Creates the auth API router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth_handlers::login))
        .route("/logout", post(auth_handlers::logout))
        .route("/me", get(auth_handlers::me))
}

/// Creates the users API router
pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/", post(users_handlers::create_user))
        .route("/", get(users_handlers::list_users))
        .route("/professors", get(users_handlers::list_professors))
        .route("/{id}", get(users_handlers::get_user))
        .route("/{id}", put(users_handlers::update_user))
        .route("/{id}", delete(users_handlers::delete_user))
}

/// Creates the plannings API router
pub fn create_plannings_router() -> Router<AppState> {
    Router::new()
        .route("/", post(plannings_handlers::create_planning))
        .route("/", get(plannings_handlers::list_plannings))
        .route(
            "/history/{course_name}",
            get(plannings_handlers::planning_history),
        )
        .route("/{id}", get(plannings_handlers::get_planning))
        .route("/{id}", put(plannings_handlers::update_planning))
        .route("/{id}/review", put(plannings_handlers::review_planning))
        .route("/{id}", delete(plannings_handlers::delete_planning))
}

/// Creates the evidences API router
pub fn create_evidences_router() -> Router<AppState> {
    Router::new()
        .route("/", post(evidences_handlers::create_evidence))
        .route("/", get(evidences_handlers::list_evidences))
        .route("/{id}", get(evidences_handlers::get_evidence))
        .route("/{id}", put(evidences_handlers::update_evidence))
        .route("/{id}/review", put(evidences_handlers::review_evidence))
        .route("/{id}", delete(evidences_handlers::delete_evidence))
}

/// Creates the progress API router
pub fn create_progress_router() -> Router<AppState> {
    Router::new()
        .route("/", post(progress_handlers::create_progress))
        .route(
            "/planning/{planning_id}",
            get(progress_handlers::list_progress_for_planning),
        )
        .route("/stats", get(progress_handlers::progress_stats))
        .route("/{id}", put(progress_handlers::update_progress))
        .route("/{id}", delete(progress_handlers::delete_progress))
}

/// Creates the reports API router
pub fn create_reports_router() -> Router<AppState> {
    Router::new()
        .route(
            "/planning-compliance",
            get(reports_handlers::planning_compliance),
        )
        .route("/progress", get(reports_handlers::progress_report))
        .route("/training", get(reports_handlers::training_report))
}

/// Creates the calendar API router
pub fn create_calendar_router() -> Router<AppState> {
    Router::new().route("/events", get(calendar_handlers::list_events))
}

/// Assembles the full /api surface with bearer authentication applied.
/// Only /api/health and /api/auth/login skip the token check.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .nest("/api/auth", create_auth_router())
        .nest("/api/users", create_users_router())
        .nest("/api/plannings", create_plannings_router())
        .nest("/api/evidences", create_evidences_router())
        .nest("/api/progress", create_progress_router())
        .nest("/api/reports", create_reports_router())
        .nest("/api/calendar", create_calendar_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::bearer_auth_middleware,
        ))
        .with_state(state)
}
