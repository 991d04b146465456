//! Credibility scoring over client-verified work history.
//!
//! The calculator is a pure function of a freelancer's verified records. The
//! service wraps it with the store reads and the single score upsert, and the
//! router exposes the service over HTTP. The stored score row is a derived
//! cache: dropping it and recalculating always yields the same values.

pub mod calculator;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use calculator::{compute, ScoreSet, ScoreTier, ScoreWeights};
pub use domain::{
    ClientId, CredibilityScore, DecisionUpdate, FreelancerId, Project, ProjectId,
    VerificationDecision, VerifiedWork, WorkHistoryEntry, WorkHistoryId, WorkHistoryRecord,
    WorkStatus, DEFAULT_COMPLEXITY,
};
pub use repository::{StoreError, WorkRecordStore};
pub use router::{credibility_router, CredibilityScoreView, DecisionRequest, RecalculateRequest};
pub use service::{CredibilityService, CredibilityServiceError, DecisionOutcome};
pub use store::{MemoryWorkStore, PgWorkStore};
