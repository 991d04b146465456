use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::credibility::calculator::ScoreSet;
use crate::credibility::domain::{
    ClientId, CredibilityScore, DecisionUpdate, FreelancerId, Project, ProjectId, VerifiedWork,
    WorkHistoryEntry, WorkHistoryId, WorkHistoryRecord, WorkStatus,
};
use crate::credibility::repository::{StoreError, WorkRecordStore};
use crate::credibility::store::MemoryWorkStore;
use crate::credibility::{credibility_router, CredibilityService};

pub(super) const FREELANCER: &str = "freelancer-ada";
pub(super) const CLIENT: &str = "client-acme";

pub(super) fn submitted_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn work(on_time: Option<bool>, rating: Option<u8>, complexity: u8) -> VerifiedWork {
    VerifiedWork {
        delivered_on_time: on_time,
        quality_rating: rating,
        project_complexity: complexity,
    }
}

pub(super) fn project(id: &str, complexity: Option<u8>) -> Project {
    Project {
        id: ProjectId::from(id),
        title: format!("Project {id}"),
        client_id: ClientId::from(CLIENT),
        complexity,
    }
}

pub(super) fn record(
    id: &str,
    project_id: &str,
    status: WorkStatus,
    on_time: Option<bool>,
    rating: Option<u8>,
) -> WorkHistoryRecord {
    WorkHistoryRecord {
        id: WorkHistoryId::from(id),
        project_id: ProjectId::from(project_id),
        freelancer_id: FreelancerId::from(FREELANCER),
        client_id: ClientId::from(CLIENT),
        status,
        delivered_on_time: on_time,
        quality_rating: rating,
        submitted_at: Some(submitted_at()),
        verified_at: None,
        submission_notes: Some("final handoff".to_string()),
    }
}

/// Two verified records (A: on time, 5 stars, complexity 4; B: late, 3 stars,
/// complexity 2) plus one submission still awaiting review.
pub(super) fn seeded_store() -> MemoryWorkStore {
    let store = MemoryWorkStore::default();
    store.insert_project(project("proj-a", Some(4))).expect("seed");
    store.insert_project(project("proj-b", Some(2))).expect("seed");
    store.insert_project(project("proj-c", Some(5))).expect("seed");
    store
        .insert_work_history(record(
            "wh-a",
            "proj-a",
            WorkStatus::Verified,
            Some(true),
            Some(5),
        ))
        .expect("seed");
    store
        .insert_work_history(record(
            "wh-b",
            "proj-b",
            WorkStatus::Verified,
            Some(false),
            Some(3),
        ))
        .expect("seed");
    store
        .insert_work_history(record("wh-c", "proj-c", WorkStatus::Submitted, None, None))
        .expect("seed");
    store
}

pub(super) fn build_service() -> (CredibilityService<MemoryWorkStore>, Arc<MemoryWorkStore>) {
    let store = Arc::new(seeded_store());
    (CredibilityService::new(store.clone()), store)
}

pub(super) fn router_with_seeded_store() -> (axum::Router, Arc<MemoryWorkStore>) {
    let (service, store) = build_service();
    (credibility_router(Arc::new(service)), store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose every operation fails as if the database were offline.
pub(super) struct UnavailableStore;

fn offline() -> StoreError {
    StoreError::Unavailable("database offline".to_string())
}

impl WorkRecordStore for UnavailableStore {
    async fn read_work_history(
        &self,
        _id: &WorkHistoryId,
    ) -> Result<Option<WorkHistoryEntry>, StoreError> {
        Err(offline())
    }

    async fn read_verified_work_history(
        &self,
        _freelancer_id: &FreelancerId,
    ) -> Result<Vec<WorkHistoryEntry>, StoreError> {
        Err(offline())
    }

    async fn upsert_credibility_score(
        &self,
        _freelancer_id: &FreelancerId,
        _scores: &ScoreSet,
        _calculated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        Err(offline())
    }

    async fn apply_decision(
        &self,
        _id: &WorkHistoryId,
        _update: &DecisionUpdate,
    ) -> Result<bool, StoreError> {
        Err(offline())
    }

    async fn read_credibility_score(
        &self,
        _freelancer_id: &FreelancerId,
    ) -> Result<Option<CredibilityScore>, StoreError> {
        Err(offline())
    }
}

/// Wraps the memory store, counting calls and optionally failing some of them.
#[derive(Default)]
pub(super) struct InstrumentedStore {
    pub(super) inner: MemoryWorkStore,
    pub(super) reads: AtomicUsize,
    pub(super) writes: AtomicUsize,
    pub(super) fail_verified_read: bool,
    pub(super) fail_upsert: bool,
}

impl InstrumentedStore {
    pub(super) fn wrapping(inner: MemoryWorkStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub(super) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub(super) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl WorkRecordStore for InstrumentedStore {
    async fn read_work_history(
        &self,
        id: &WorkHistoryId,
    ) -> Result<Option<WorkHistoryEntry>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_work_history(id).await
    }

    async fn read_verified_work_history(
        &self,
        freelancer_id: &FreelancerId,
    ) -> Result<Vec<WorkHistoryEntry>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_verified_read {
            return Err(offline());
        }
        self.inner.read_verified_work_history(freelancer_id).await
    }

    async fn upsert_credibility_score(
        &self,
        freelancer_id: &FreelancerId,
        scores: &ScoreSet,
        calculated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_upsert {
            return Err(StoreError::Rejected(
                "credibility_scores constraint violated".to_string(),
            ));
        }
        self.inner
            .upsert_credibility_score(freelancer_id, scores, calculated_at)
            .await
    }

    async fn apply_decision(
        &self,
        id: &WorkHistoryId,
        update: &DecisionUpdate,
    ) -> Result<bool, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.apply_decision(id, update).await
    }

    async fn read_credibility_score(
        &self,
        freelancer_id: &FreelancerId,
    ) -> Result<Option<CredibilityScore>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_credibility_score(freelancer_id).await
    }
}
