use std::future::Future;

use chrono::{DateTime, Utc};

use super::calculator::ScoreSet;
use super::domain::{
    CredibilityScore, DecisionUpdate, FreelancerId, WorkHistoryEntry, WorkHistoryId,
};

/// Storage abstraction over the work history, project and score tables so the
/// service can be exercised without a database.
pub trait WorkRecordStore: Send + Sync {
    /// Load one work history row joined with its project.
    fn read_work_history(
        &self,
        id: &WorkHistoryId,
    ) -> impl Future<Output = Result<Option<WorkHistoryEntry>, StoreError>> + Send;

    /// Load every verified work history row for a freelancer, joined with projects.
    fn read_verified_work_history(
        &self,
        freelancer_id: &FreelancerId,
    ) -> impl Future<Output = Result<Vec<WorkHistoryEntry>, StoreError>> + Send;

    /// Insert or wholesale replace the freelancer's score row.
    fn upsert_credibility_score(
        &self,
        freelancer_id: &FreelancerId,
        scores: &ScoreSet,
        calculated_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Apply a decision to a row that is still `submitted`. Returns `false`
    /// when no submitted row matched.
    fn apply_decision(
        &self,
        id: &WorkHistoryId,
        update: &DecisionUpdate,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn read_credibility_score(
        &self,
        freelancer_id: &FreelancerId,
    ) -> impl Future<Output = Result<Option<CredibilityScore>, StoreError>> + Send;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store rejected the write: {0}")]
    Rejected(String),
    #[error("could not decode stored row: {0}")]
    Decode(String),
}
