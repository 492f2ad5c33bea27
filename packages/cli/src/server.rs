// ABOUTME: Server bootstrap: wires storage, collaborators, and the API router
// ABOUTME: Collaborators are chosen from configuration; nothing is global

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use chrono::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use planea_api::{create_api_router, AppState};
use planea_calendar::GoogleCalendarNotifier;
use planea_files::{DriveFileStore, FileStore, LocalFileStore};
use planea_planning::workflow::notify::{CalendarNotifier, NoopNotifier};
use planea_planning::DbState;

use crate::config::Config;

fn file_store(config: &Config) -> Arc<dyn FileStore> {
    match &config.drive_access_token {
        Some(token) => {
            info!("Attachments stored in Google Drive");
            Arc::new(DriveFileStore::new(
                token.clone(),
                config.drive_folder_id.clone(),
            ))
        }
        None => {
            info!("Attachments stored locally at {}", config.upload_dir.display());
            Arc::new(LocalFileStore::new(config.upload_dir.clone()))
        }
    }
}

fn calendar_notifier(config: &Config) -> Arc<dyn CalendarNotifier> {
    match (&config.calendar_access_token, &config.calendar_id) {
        (Some(token), Some(calendar_id)) => {
            info!("Calendar notifications enabled for {}", calendar_id);
            Arc::new(GoogleCalendarNotifier::new(token.clone(), calendar_id.clone()))
        }
        _ => Arc::new(NoopNotifier),
    }
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let db = DbState::init_with_path(config.database_path.clone()).await?;
    let state = AppState::new(
        db,
        file_store(&config),
        calendar_notifier(&config),
        Duration::hours(config.session_ttl_hours),
    );

    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = create_api_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
