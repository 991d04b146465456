use credence::credibility::{
    ClientId, FreelancerId, MemoryWorkStore, Project, ProjectId, StoreError, VerifiedWork,
    WorkHistoryId, WorkHistoryRecord, WorkStatus,
};
use credence::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Parse a JSON array of verified work items for offline scoring.
pub(crate) fn load_verified_work(path: &Path) -> Result<Vec<VerifiedWork>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    parse_verified_work(&raw)
}

pub(crate) fn parse_verified_work(raw: &str) -> Result<Vec<VerifiedWork>, AppError> {
    Ok(serde_json::from_str(raw)?)
}

/// One submission awaiting review in the demo data set.
pub(crate) struct DemoSubmission {
    pub(crate) work_history_id: &'static str,
    pub(crate) freelancer_id: &'static str,
    pub(crate) project_title: &'static str,
    pub(crate) complexity: Option<u8>,
}

pub(crate) const DEMO_CLIENT: &str = "client-northwind";

pub(crate) const DEMO_SUBMISSIONS: [DemoSubmission; 5] = [
    DemoSubmission {
        work_history_id: "wh-001",
        freelancer_id: "freelancer-ada",
        project_title: "Checkout redesign",
        complexity: Some(4),
    },
    DemoSubmission {
        work_history_id: "wh-002",
        freelancer_id: "freelancer-ada",
        project_title: "Payment webhooks",
        complexity: Some(5),
    },
    DemoSubmission {
        work_history_id: "wh-003",
        freelancer_id: "freelancer-ada",
        project_title: "Copy refresh",
        complexity: None,
    },
    DemoSubmission {
        work_history_id: "wh-004",
        freelancer_id: "freelancer-grace",
        project_title: "Data migration",
        complexity: Some(3),
    },
    DemoSubmission {
        work_history_id: "wh-005",
        freelancer_id: "freelancer-grace",
        project_title: "Landing page",
        complexity: Some(2),
    },
];

pub(crate) fn seed_demo_store() -> Result<MemoryWorkStore, StoreError> {
    let store = MemoryWorkStore::default();
    for (index, submission) in DEMO_SUBMISSIONS.iter().enumerate() {
        let project_id = ProjectId(format!("proj-{:03}", index + 1));
        store.insert_project(Project {
            id: project_id.clone(),
            title: submission.project_title.to_string(),
            client_id: ClientId::from(DEMO_CLIENT),
            complexity: submission.complexity,
        })?;
        store.insert_work_history(WorkHistoryRecord {
            id: WorkHistoryId::from(submission.work_history_id),
            project_id,
            freelancer_id: FreelancerId::from(submission.freelancer_id),
            client_id: ClientId::from(DEMO_CLIENT),
            status: WorkStatus::Submitted,
            delivered_on_time: None,
            quality_rating: None,
            submitted_at: Some(chrono::Utc::now()),
            verified_at: None,
            submission_notes: Some(format!("Delivered {}", submission.project_title)),
        })?;
    }
    Ok(store)
}
