// ABOUTME: End-to-end tests for the REST surface using in-memory SQLite
// ABOUTME: Drives the routers with tower::oneshot, from login to progress

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use planea_api::{create_api_router, AppState};
use planea_auth::hash_password;
use planea_files::{FileStore, LocalFileStore};
use planea_planning::workflow::notify::NoopNotifier;
use planea_planning::DbState;

struct TestApp {
    app: Router,
    _upload_dir: tempfile::TempDir,
}

async fn setup() -> TestApp {
    let db = DbState::in_memory().await.unwrap();

    // Bootstrap administrator, as the create-admin command would
    let password_hash = hash_password("admin-pass-123").unwrap();
    db.users
        .create("Admin", "admin@planea.edu", &password_hash, planea_auth::Role::Admin)
        .await
        .unwrap();

    let upload_dir = tempfile::tempdir().unwrap();
    let files: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(upload_dir.path().to_path_buf()));
    let state = AppState::new(db, files, Arc::new(NoopNotifier), chrono::Duration::hours(24));

    TestApp {
        app: create_api_router(state),
        _upload_dir: upload_dir,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": email, "password": password})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create_user(app: &Router, admin_token: &str, name: &str, email: &str, role: &str) {
    let (status, _) = send(
        app,
        request(
            "POST",
            "/api/users",
            Some(admin_token),
            Some(json!({
                "name": name,
                "email": email,
                "password": "secret-pass-123",
                "role": role,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

fn planning_body(course: &str) -> Value {
    json!({
        "courseName": course,
        "partial": 1,
        "cycle": "2024-2025",
        "content": "Linear equations and systems",
        "objectives": "Solve systems of two unknowns",
        "methodology": "Workshops and guided practice",
        "evaluation": "Weekly quizzes",
    })
}

#[tokio::test]
async fn health_is_open_everything_else_requires_a_token() {
    let env = setup().await;

    let (status, body) = send(&env.app, request("GET", "/api/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&env.app, request("GET", "/api/plannings", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &env.app,
        request("GET", "/api/plannings", Some("not-a-real-token"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let env = setup().await;

    let (status, body) = send(
        &env.app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "admin@planea.edu", "password": "wrong"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let env = setup().await;
    let token = login(&env.app, "admin@planea.edu", "admin-pass-123").await;

    let (status, _) = send(&env.app, request("GET", "/api/auth/me", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&env.app, request("POST", "/api/auth/logout", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&env.app, request("GET", "/api/auth/me", Some(&token), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn only_admins_create_users() {
    let env = setup().await;
    let admin_token = login(&env.app, "admin@planea.edu", "admin-pass-123").await;
    create_user(&env.app, &admin_token, "Ana Lopez", "ana@planea.edu", "professor").await;
    let ana_token = login(&env.app, "ana@planea.edu", "secret-pass-123").await;

    let (status, _) = send(
        &env.app,
        request(
            "POST",
            "/api/users",
            Some(&ana_token),
            Some(json!({
                "name": "Eve",
                "email": "eve@planea.edu",
                "password": "secret-pass-123",
                "role": "admin",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Duplicate email is a conflict
    let (status, _) = send(
        &env.app,
        request(
            "POST",
            "/api/users",
            Some(&admin_token),
            Some(json!({
                "name": "Ana Again",
                "email": "ana@planea.edu",
                "password": "secret-pass-123",
                "role": "professor",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn full_review_workflow_over_http() {
    let env = setup().await;
    let admin_token = login(&env.app, "admin@planea.edu", "admin-pass-123").await;
    create_user(&env.app, &admin_token, "Ana Lopez", "ana@planea.edu", "professor").await;
    create_user(&env.app, &admin_token, "Luis Rios", "luis@planea.edu", "professor").await;
    create_user(&env.app, &admin_token, "Coordinator", "coord@planea.edu", "coordinator").await;

    let ana_token = login(&env.app, "ana@planea.edu", "secret-pass-123").await;
    let luis_token = login(&env.app, "luis@planea.edu", "secret-pass-123").await;
    let coord_token = login(&env.app, "coord@planea.edu", "secret-pass-123").await;

    // Submission starts pending
    let (status, body) = send(
        &env.app,
        request("POST", "/api/plannings", Some(&ana_token), Some(planning_body("Algebra"))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
    let planning_id = body["data"]["id"].as_str().unwrap().to_string();

    // Coordinators may not submit plannings
    let (status, _) = send(
        &env.app,
        request("POST", "/api/plannings", Some(&coord_token), Some(planning_body("Physics"))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Progress is locked until approval
    let progress_body = json!({
        "planningId": planning_id,
        "partial": 1,
        "progressPercentage": 85,
        "achievements": "Covered systems of equations",
    });
    let (status, _) = send(
        &env.app,
        request("POST", "/api/progress", Some(&ana_token), Some(progress_body.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Review without feedback is a validation error, never a silent no-op
    let (status, body) = send(
        &env.app,
        request(
            "PUT",
            &format!("/api/plannings/{}/review", planning_id),
            Some(&coord_token),
            Some(json!({"status": "approved"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "feedback");

    // A professor attempting review is forbidden regardless of ownership
    let (status, _) = send(
        &env.app,
        request(
            "PUT",
            &format!("/api/plannings/{}/review", planning_id),
            Some(&ana_token),
            Some(json!({"status": "approved", "feedback": "OK"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &env.app,
        request(
            "PUT",
            &format!("/api/plannings/{}/review", planning_id),
            Some(&coord_token),
            Some(json!({"status": "approved", "feedback": "OK"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "approved");

    // Approved parent unlocks progress; status derives server-side
    let (status, body) = send(
        &env.app,
        request("POST", "/api/progress", Some(&ana_token), Some(progress_body)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "partial");

    // A foreign professor cannot see the planning
    let (status, _) = send(
        &env.app,
        request(
            "GET",
            &format!("/api/plannings/{}", planning_id),
            Some(&luis_token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn professors_cannot_widen_list_scope_with_filters() {
    let env = setup().await;
    let admin_token = login(&env.app, "admin@planea.edu", "admin-pass-123").await;
    create_user(&env.app, &admin_token, "Ana Lopez", "ana@planea.edu", "professor").await;
    create_user(&env.app, &admin_token, "Luis Rios", "luis@planea.edu", "professor").await;

    let ana_token = login(&env.app, "ana@planea.edu", "secret-pass-123").await;
    let luis_token = login(&env.app, "luis@planea.edu", "secret-pass-123").await;

    let (_, body) = send(
        &env.app,
        request("POST", "/api/plannings", Some(&luis_token), Some(planning_body("Geometry"))),
    )
    .await;
    let luis_id = body["data"]["professorId"].as_str().unwrap().to_string();

    send(
        &env.app,
        request("POST", "/api/plannings", Some(&ana_token), Some(planning_body("Algebra"))),
    )
    .await;

    // Forged professorId: silently scoped back to Ana's own rows
    let (status, body) = send(
        &env.app,
        request(
            "GET",
            &format!("/api/plannings?professorId={}", luis_id),
            Some(&ana_token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["courseName"], "Algebra");

    // Admins can filter by professor
    let (status, body) = send(
        &env.app,
        request(
            "GET",
            &format!("/api/plannings?professorId={}", luis_id),
            Some(&admin_token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["courseName"], "Geometry");
}

#[tokio::test]
async fn reports_are_reviewer_only() {
    let env = setup().await;
    let admin_token = login(&env.app, "admin@planea.edu", "admin-pass-123").await;
    create_user(&env.app, &admin_token, "Ana Lopez", "ana@planea.edu", "professor").await;
    let ana_token = login(&env.app, "ana@planea.edu", "secret-pass-123").await;

    send(
        &env.app,
        request("POST", "/api/plannings", Some(&ana_token), Some(planning_body("Algebra"))),
    )
    .await;

    let (status, _) = send(
        &env.app,
        request("GET", "/api/reports/planning-compliance", Some(&ana_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &env.app,
        request("GET", "/api/reports/planning-compliance", Some(&admin_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["pending"], 1);
    assert_eq!(body["data"]["complianceRate"], 0.0);
}

#[tokio::test]
async fn calendar_agenda_reflects_visible_rows() {
    let env = setup().await;
    let admin_token = login(&env.app, "admin@planea.edu", "admin-pass-123").await;
    create_user(&env.app, &admin_token, "Ana Lopez", "ana@planea.edu", "professor").await;
    create_user(&env.app, &admin_token, "Luis Rios", "luis@planea.edu", "professor").await;

    let ana_token = login(&env.app, "ana@planea.edu", "secret-pass-123").await;
    let luis_token = login(&env.app, "luis@planea.edu", "secret-pass-123").await;

    send(
        &env.app,
        request("POST", "/api/plannings", Some(&ana_token), Some(planning_body("Algebra"))),
    )
    .await;

    // Ana sees her planning; Luis sees nothing
    let (status, body) = send(
        &env.app,
        request("GET", "/api/calendar/events", Some(&ana_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let events = body["data"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["kind"], "planning");
    assert_eq!(events[0]["status"], "pending");

    let (_, body) = send(
        &env.app,
        request("GET", "/api/calendar/events", Some(&luis_token), None),
    )
    .await;
    assert!(body["data"].as_array().unwrap().is_empty());

    // Reviewers see everything
    let (_, body) = send(
        &env.app,
        request("GET", "/api/calendar/events", Some(&admin_token), None),
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn evidence_upload_roundtrip_and_review() {
    let env = setup().await;
    let admin_token = login(&env.app, "admin@planea.edu", "admin-pass-123").await;
    create_user(&env.app, &admin_token, "Ana Lopez", "ana@planea.edu", "professor").await;
    let ana_token = login(&env.app, "ana@planea.edu", "secret-pass-123").await;

    let content = base64::Engine::encode(
        &base64::engine::general_purpose::STANDARD,
        b"certificate bytes",
    );
    let (status, body) = send(
        &env.app,
        request(
            "POST",
            "/api/evidences",
            Some(&ana_token),
            Some(json!({
                "courseName": "Active learning",
                "institution": "UNAM",
                "date": "2025-02-10T00:00:00Z",
                "hours": 20,
                "attachment": {"fileName": "certificate.pdf", "contentBase64": content},
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["storageType"], "local");
    let evidence_id = body["data"]["id"].as_str().unwrap().to_string();

    // Missing attachment is a validation error
    let (status, _) = send(
        &env.app,
        request(
            "POST",
            "/api/evidences",
            Some(&ana_token),
            Some(json!({
                "courseName": "Another course",
                "institution": "IPN",
                "date": "2025-03-01T00:00:00Z",
                "hours": 10,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &env.app,
        request(
            "PUT",
            &format!("/api/evidences/{}/review", evidence_id),
            Some(&admin_token),
            Some(json!({"status": "rejected", "feedback": "Certificate is unreadable"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "rejected");
}
