use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::calculator::compute;
use super::domain::{
    CredibilityScore, FreelancerId, VerificationDecision, VerifiedWork, WorkHistoryId, WorkStatus,
};
use super::repository::{StoreError, WorkRecordStore};

/// Ratings a client may attach to an approval.
const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Service recomputing credibility scores from verified work history.
///
/// Holds no state of its own; every call re-reads the store, so concurrent or
/// repeated calls converge on the same stored row.
pub struct CredibilityService<S> {
    store: Arc<S>,
}

impl<S> CredibilityService<S>
where
    S: WorkRecordStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Recompute and persist the score of the freelancer who owns `work_history_id`.
    ///
    /// Two reads then one upsert; nothing is written if either read fails.
    pub async fn recalculate(
        &self,
        work_history_id: &WorkHistoryId,
    ) -> Result<CredibilityScore, CredibilityServiceError> {
        let entry = self
            .store
            .read_work_history(work_history_id)
            .await
            .map_err(CredibilityServiceError::TransientRead)?
            .ok_or_else(|| CredibilityServiceError::NotFound(work_history_id.clone()))?;
        let freelancer_id = entry.record.freelancer_id;

        let verified = self
            .store
            .read_verified_work_history(&freelancer_id)
            .await
            .map_err(CredibilityServiceError::TransientRead)?;
        let inputs: Vec<VerifiedWork> = verified.iter().map(|entry| entry.scoring_input()).collect();

        let scores = compute(&inputs);
        let calculated_at = Utc::now();

        self.store
            .upsert_credibility_score(&freelancer_id, &scores, calculated_at)
            .await
            .map_err(CredibilityServiceError::Persistence)?;

        info!(
            %work_history_id,
            %freelancer_id,
            overall = scores.overall_score,
            delivery = scores.delivery_score,
            quality = scores.quality_score,
            consistency = scores.consistency_score,
            skill_match = scores.skill_match_score,
            total_projects = scores.total_projects,
            "credibility score recalculated"
        );

        Ok(CredibilityScore {
            freelancer_id,
            scores,
            last_calculated_at: calculated_at,
        })
    }

    /// Record a client's approve/reject ruling on a submitted deliverable.
    ///
    /// Approvals trigger a recalculation. A failed recalculation is reported in
    /// the outcome but leaves the decision in place; it can be retried on its own.
    pub async fn record_decision(
        &self,
        work_history_id: &WorkHistoryId,
        decision: VerificationDecision,
    ) -> Result<DecisionOutcome, CredibilityServiceError> {
        if let VerificationDecision::Approve { quality_rating } = decision {
            if !RATING_RANGE.contains(&quality_rating) {
                return Err(CredibilityServiceError::InvalidRating(i64::from(
                    quality_rating,
                )));
            }
        }

        let entry = self
            .store
            .read_work_history(work_history_id)
            .await
            .map_err(CredibilityServiceError::TransientRead)?
            .ok_or_else(|| CredibilityServiceError::NotFound(work_history_id.clone()))?;

        if entry.record.status != WorkStatus::Submitted {
            return Err(CredibilityServiceError::InvalidTransition {
                id: work_history_id.clone(),
                status: entry.record.status,
            });
        }

        let update = decision.update(Utc::now());
        let applied = self
            .store
            .apply_decision(work_history_id, &update)
            .await
            .map_err(CredibilityServiceError::Persistence)?;
        if !applied {
            return Err(CredibilityServiceError::Conflict(work_history_id.clone()));
        }

        info!(
            %work_history_id,
            freelancer_id = %entry.record.freelancer_id,
            status = %update.status,
            "verification decision recorded"
        );

        let mut outcome = DecisionOutcome {
            work_history_id: work_history_id.clone(),
            freelancer_id: entry.record.freelancer_id,
            status: update.status,
            score: None,
            score_error: None,
        };

        if decision.is_approval() {
            match self.recalculate(work_history_id).await {
                Ok(score) => outcome.score = Some(score),
                Err(err) => {
                    warn!(%work_history_id, error = %err, "score recalculation after approval failed");
                    outcome.score_error = Some(err.to_string());
                }
            }
        }

        Ok(outcome)
    }

    /// Current stored score for a freelancer, if one has been calculated.
    pub async fn score_for(
        &self,
        freelancer_id: &FreelancerId,
    ) -> Result<Option<CredibilityScore>, CredibilityServiceError> {
        self.store
            .read_credibility_score(freelancer_id)
            .await
            .map_err(CredibilityServiceError::TransientRead)
    }
}

/// Result of applying a verification decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionOutcome {
    pub work_history_id: WorkHistoryId,
    pub freelancer_id: FreelancerId,
    pub status: WorkStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<CredibilityScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_error: Option<String>,
}

/// Error raised by the credibility service.
#[derive(Debug, thiserror::Error)]
pub enum CredibilityServiceError {
    #[error("work history {0} not found")]
    NotFound(WorkHistoryId),
    #[error("failed to read work history: {0}")]
    TransientRead(#[source] StoreError),
    #[error("failed to persist: {0}")]
    Persistence(#[source] StoreError),
    #[error("work history {id} is {status} and no longer accepts a decision")]
    InvalidTransition { id: WorkHistoryId, status: WorkStatus },
    #[error("work history {0} was decided concurrently")]
    Conflict(WorkHistoryId),
    #[error("quality rating {0} is outside the 1-5 scale")]
    InvalidRating(i64),
    #[error("quality_rating is required when approving work")]
    MissingRating,
    #[error("no credibility score calculated for freelancer {0}")]
    NoScore(FreelancerId),
}
