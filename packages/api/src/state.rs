// ABOUTME: Shared application state for the API routers
// ABOUTME: Workflows are constructed once and injected; no hidden singletons

use std::sync::Arc;

use chrono::Duration;

use planea_files::FileStore;
use planea_planning::workflow::notify::CalendarNotifier;
use planea_planning::{
    DbState, EvidenceWorkflow, PlanningWorkflow, ProgressWorkflow, ReportWorkflow, UserWorkflow,
};

#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub users: Arc<UserWorkflow>,
    pub plannings: Arc<PlanningWorkflow>,
    pub evidences: Arc<EvidenceWorkflow>,
    pub progress: Arc<ProgressWorkflow>,
    pub reports: Arc<ReportWorkflow>,
}

impl AppState {
    pub fn new(
        db: DbState,
        files: Arc<dyn FileStore>,
        notifier: Arc<dyn CalendarNotifier>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            users: Arc::new(UserWorkflow::new(db.clone(), session_ttl)),
            plannings: Arc::new(PlanningWorkflow::new(
                db.clone(),
                Arc::clone(&files),
                Arc::clone(&notifier),
            )),
            evidences: Arc::new(EvidenceWorkflow::new(
                db.clone(),
                Arc::clone(&files),
                Arc::clone(&notifier),
            )),
            progress: Arc::new(ProgressWorkflow::new(db.clone(), Arc::clone(&notifier))),
            reports: Arc::new(ReportWorkflow::new(db.clone())),
            db,
        }
    }
}
