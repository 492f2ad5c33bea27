// ABOUTME: Integration tests for the review workflows against in-memory SQLite
// ABOUTME: Covers ownership scoping, review gates, progress gating, soft deletion

use std::sync::Arc;

use planea_auth::{AuthUser, Role};
use planea_files::{FileError, FileStore, LocalFileStore, StorageKind, StoredFile};
use planea_planning::workflow::notify::NoopNotifier;
use planea_planning::{
    DbState, EvidenceCreateInput, EvidenceWorkflow, PlanningCreateInput, PlanningFilter,
    PlanningReviewInput, PlanningStatus, PlanningUpdateInput, PlanningWorkflow,
    ProgressCreateInput, ProgressStatus, ProgressWorkflow, WorkflowError,
};

struct TestEnv {
    db: DbState,
    plannings: PlanningWorkflow,
    evidences: EvidenceWorkflow,
    progress: ProgressWorkflow,
    admin: AuthUser,
    coordinator: AuthUser,
    professor: AuthUser,
    other_professor: AuthUser,
    _upload_dir: tempfile::TempDir,
}

async fn seed_user(db: &DbState, name: &str, email: &str, role: Role) -> AuthUser {
    let user = db
        .users
        .create(name, email, "$argon2id$test-hash", role)
        .await
        .unwrap();
    AuthUser {
        id: user.id,
        role: user.role,
        email: user.email,
        name: user.name,
    }
}

async fn setup() -> TestEnv {
    let db = DbState::in_memory().await.unwrap();
    let upload_dir = tempfile::tempdir().unwrap();
    let files: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(upload_dir.path().to_path_buf()));
    let notifier = Arc::new(NoopNotifier);

    let admin = seed_user(&db, "Admin", "admin@planea.edu", Role::Admin).await;
    let coordinator = seed_user(&db, "Coordinator", "coord@planea.edu", Role::Coordinator).await;
    let professor = seed_user(&db, "Ana Lopez", "ana@planea.edu", Role::Professor).await;
    let other_professor = seed_user(&db, "Luis Rios", "luis@planea.edu", Role::Professor).await;

    TestEnv {
        plannings: PlanningWorkflow::new(db.clone(), Arc::clone(&files), notifier.clone()),
        evidences: EvidenceWorkflow::new(db.clone(), Arc::clone(&files), notifier.clone()),
        progress: ProgressWorkflow::new(db.clone(), notifier),
        db,
        admin,
        coordinator,
        professor,
        other_professor,
        _upload_dir: upload_dir,
    }
}

fn planning_input(course: &str) -> PlanningCreateInput {
    PlanningCreateInput {
        course_name: course.to_string(),
        partial: 1,
        cycle: "2024-2025".to_string(),
        content: "Linear equations and systems".to_string(),
        objectives: "Solve systems of two unknowns".to_string(),
        methodology: "Workshops and guided practice".to_string(),
        evaluation: "Weekly quizzes".to_string(),
        resources: None,
        attachment: None,
    }
}

#[tokio::test]
async fn professor_listing_never_returns_foreign_rows() {
    let env = setup().await;

    env.plannings.create(&env.professor, planning_input("Algebra")).await.unwrap();
    env.plannings
        .create(&env.other_professor, planning_input("Geometry"))
        .await
        .unwrap();

    // A forged professorId is silently overridden, not an error
    let filter = PlanningFilter {
        professor_id: Some(env.other_professor.id.clone()),
        ..Default::default()
    };
    let rows = env.plannings.list(&env.professor, filter).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert!(rows.iter().all(|p| p.professor_id == env.professor.id));

    // Reviewers see everything
    let rows = env
        .plannings
        .list(&env.coordinator, PlanningFilter::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn review_requires_feedback_and_reviewer_role() {
    let env = setup().await;
    let planning = env.plannings.create(&env.professor, planning_input("Algebra")).await.unwrap();

    let missing_feedback = PlanningReviewInput {
        status: PlanningStatus::Approved,
        feedback: None,
    };
    let err = env
        .plannings
        .review(&env.coordinator, &planning.id, missing_feedback)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));

    let blank_feedback = PlanningReviewInput {
        status: PlanningStatus::Approved,
        feedback: Some("   ".to_string()),
    };
    let err = env
        .plannings
        .review(&env.coordinator, &planning.id, blank_feedback)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));

    // Professors never review, not even their own plannings
    let review = PlanningReviewInput {
        status: PlanningStatus::Approved,
        feedback: Some("Looks fine".to_string()),
    };
    let err = env
        .plannings
        .review(&env.professor, &planning.id, review)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));
}

#[tokio::test]
async fn review_overwrites_status_and_feedback() {
    let env = setup().await;
    let planning = env.plannings.create(&env.professor, planning_input("Algebra")).await.unwrap();

    let reviewed = env
        .plannings
        .review(
            &env.coordinator,
            &planning.id,
            PlanningReviewInput {
                status: PlanningStatus::AdjustmentsRequired,
                feedback: Some("Objectives are too vague".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(reviewed.status, PlanningStatus::AdjustmentsRequired);
    assert_eq!(reviewed.feedback.as_deref(), Some("Objectives are too vague"));

    // Any current state may be re-reviewed
    let reviewed = env
        .plannings
        .review(
            &env.admin,
            &planning.id,
            PlanningReviewInput {
                status: PlanningStatus::Approved,
                feedback: Some("Fixed".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(reviewed.status, PlanningStatus::Approved);
}

#[tokio::test]
async fn editing_after_adjustments_resubmits_as_pending() {
    let env = setup().await;
    let planning = env.plannings.create(&env.professor, planning_input("Algebra")).await.unwrap();

    env.plannings
        .review(
            &env.coordinator,
            &planning.id,
            PlanningReviewInput {
                status: PlanningStatus::AdjustmentsRequired,
                feedback: Some("Rework the evaluation section".to_string()),
            },
        )
        .await
        .unwrap();

    let updated = env
        .plannings
        .update(
            &env.professor,
            &planning.id,
            PlanningUpdateInput {
                evaluation: Some("Weekly quizzes and a final project".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, PlanningStatus::Pending);
    assert!(updated.feedback.is_none());
}

#[tokio::test]
async fn approved_plannings_are_immutable_except_via_review() {
    let env = setup().await;
    let planning = env.plannings.create(&env.professor, planning_input("Algebra")).await.unwrap();

    env.plannings
        .review(
            &env.coordinator,
            &planning.id,
            PlanningReviewInput {
                status: PlanningStatus::Approved,
                feedback: Some("OK".to_string()),
            },
        )
        .await
        .unwrap();

    let err = env
        .plannings
        .update(
            &env.professor,
            &planning.id,
            PlanningUpdateInput {
                content: Some("New content".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));

    // Reviewers never edit content either; review is the only path
    let err = env
        .plannings
        .update(
            &env.admin,
            &planning.id,
            PlanningUpdateInput {
                content: Some("New content".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));
}

#[tokio::test]
async fn owner_deletes_only_approved_plannings() {
    let env = setup().await;
    let planning = env.plannings.create(&env.professor, planning_input("Algebra")).await.unwrap();

    let err = env.plannings.delete(&env.professor, &planning.id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));

    env.plannings
        .review(
            &env.coordinator,
            &planning.id,
            PlanningReviewInput {
                status: PlanningStatus::Approved,
                feedback: Some("OK".to_string()),
            },
        )
        .await
        .unwrap();

    env.plannings.delete(&env.professor, &planning.id).await.unwrap();

    // Reviewers may delete regardless of status
    let second = env.plannings.create(&env.professor, planning_input("Geometry")).await.unwrap();
    env.plannings.delete(&env.coordinator, &second.id).await.unwrap();
}

#[tokio::test]
async fn soft_deleted_rows_are_invisible_but_not_removed() {
    let env = setup().await;
    let planning = env.plannings.create(&env.professor, planning_input("Algebra")).await.unwrap();

    env.plannings
        .review(
            &env.coordinator,
            &planning.id,
            PlanningReviewInput {
                status: PlanningStatus::Approved,
                feedback: Some("OK".to_string()),
            },
        )
        .await
        .unwrap();
    env.plannings.delete(&env.professor, &planning.id).await.unwrap();

    let err = env.plannings.get(&env.coordinator, &planning.id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound(_)));

    let rows = env
        .plannings
        .list(&env.coordinator, PlanningFilter::default())
        .await
        .unwrap();
    assert!(rows.is_empty());

    // The row still exists in storage
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM plannings WHERE id = ?")
        .bind(&planning.id)
        .fetch_one(&env.db.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn progress_is_gated_by_parent_approval() {
    let env = setup().await;
    let planning = env.plannings.create(&env.professor, planning_input("Algebra")).await.unwrap();

    let input = ProgressCreateInput {
        planning_id: planning.id.clone(),
        partial: 1,
        progress_percentage: 85,
        achievements: Some("Covered systems of equations".to_string()),
        challenges: None,
        adjustments: None,
    };

    // Pending parent: the owner may not record progress yet
    let err = env.progress.create(&env.professor, input.clone()).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));

    env.plannings
        .review(
            &env.coordinator,
            &planning.id,
            PlanningReviewInput {
                status: PlanningStatus::Approved,
                feedback: Some("OK".to_string()),
            },
        )
        .await
        .unwrap();

    let progress = env.progress.create(&env.professor, input).await.unwrap();
    assert_eq!(progress.status, ProgressStatus::Partial);

    // Visible to the owner, never to a foreign professor
    let entries = env
        .progress
        .list_for_planning(&env.professor, &planning.id)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);

    let err = env
        .progress
        .list_for_planning(&env.other_professor, &planning.id)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));
}

#[tokio::test]
async fn foreign_professor_cannot_read_a_planning() {
    let env = setup().await;
    let planning = env.plannings.create(&env.professor, planning_input("Algebra")).await.unwrap();

    let err = env
        .plannings
        .get(&env.other_professor, &planning.id)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));

    // Reviewers read any row, with the owner attached
    let found = env.plannings.get(&env.admin, &planning.id).await.unwrap();
    assert_eq!(found.professor.unwrap().email, env.professor.email);
}

#[tokio::test]
async fn evidence_requires_a_supporting_file() {
    let env = setup().await;

    let input = EvidenceCreateInput {
        course_name: "Active learning".to_string(),
        institution: "UNAM".to_string(),
        date: chrono::Utc::now(),
        hours: 20,
        attachment: None,
    };
    let err = env.evidences.create(&env.professor, input).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));
}

struct FailingStore;

#[async_trait::async_trait]
impl FileStore for FailingStore {
    fn kind(&self) -> StorageKind {
        StorageKind::Local
    }

    async fn save(&self, _file_name: &str, _bytes: &[u8]) -> Result<StoredFile, FileError> {
        Err(FileError::Upload("disk full".to_string()))
    }

    async fn delete(&self, _stored: &StoredFile) -> Result<(), FileError> {
        Ok(())
    }
}

#[tokio::test]
async fn failed_upload_prevents_the_database_write() {
    let env = setup().await;
    let plannings = PlanningWorkflow::new(
        env.db.clone(),
        Arc::new(FailingStore),
        Arc::new(NoopNotifier),
    );

    let mut input = planning_input("Algebra");
    input.attachment = Some(planea_planning::AttachmentInput {
        file_name: "plan.pdf".to_string(),
        content_base64: Some(base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            b"contents",
        )),
        drive_file_id: None,
        file_url: None,
    });

    let err = plannings.create(&env.professor, input).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Upstream(_)));

    let rows = env
        .plannings
        .list(&env.coordinator, PlanningFilter::default())
        .await
        .unwrap();
    assert!(rows.is_empty());
}
