use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use super::calculator::ScoreTier;
use super::domain::{CredibilityScore, FreelancerId, VerificationDecision, WorkHistoryId};
use super::repository::WorkRecordStore;
use super::service::{CredibilityService, CredibilityServiceError};
use crate::error::AppError;

/// Body of the recalculation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecalculateRequest {
    pub work_history_id: String,
}

/// Body of a client's verification ruling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub approved: bool,
    #[serde(default)]
    pub quality_rating: Option<i64>,
}

impl DecisionRequest {
    /// Ratings are decoded wide so any off-scale value is reported as a rating error.
    pub fn into_decision(self) -> Result<VerificationDecision, CredibilityServiceError> {
        if !self.approved {
            return Ok(VerificationDecision::Reject);
        }
        let raw = self
            .quality_rating
            .ok_or(CredibilityServiceError::MissingRating)?;
        let quality_rating =
            u8::try_from(raw).map_err(|_| CredibilityServiceError::InvalidRating(raw))?;
        Ok(VerificationDecision::Approve { quality_rating })
    }
}

/// Stored score as exposed to dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct CredibilityScoreView {
    #[serde(flatten)]
    pub score: CredibilityScore,
    pub tier: ScoreTier,
    pub tier_label: &'static str,
}

impl From<CredibilityScore> for CredibilityScoreView {
    fn from(score: CredibilityScore) -> Self {
        let tier = score.tier();
        Self {
            score,
            tier,
            tier_label: tier.label(),
        }
    }
}

/// Router builder exposing the recalculation, decision and score endpoints.
///
/// Callers are first-party browser clients, so CORS is fully permissive.
pub fn credibility_router<S>(service: Arc<CredibilityService<S>>) -> Router
where
    S: WorkRecordStore + 'static,
{
    Router::new()
        .route(
            "/functions/v1/calculate-credibility",
            post(recalculate_handler::<S>),
        )
        .route(
            "/api/v1/credibility/recalculate",
            post(recalculate_handler::<S>),
        )
        .route(
            "/api/v1/work-history/:work_history_id/decision",
            post(decision_handler::<S>),
        )
        .route(
            "/api/v1/freelancers/:freelancer_id/credibility",
            get(score_handler::<S>),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(service)
}

pub(crate) async fn recalculate_handler<S>(
    State(service): State<Arc<CredibilityService<S>>>,
    payload: Result<Json<RecalculateRequest>, JsonRejection>,
) -> Result<Response, AppError>
where
    S: WorkRecordStore + 'static,
{
    let Json(request) = payload?;

    let score = service
        .recalculate(&WorkHistoryId(request.work_history_id))
        .await?;
    let payload = json!({
        "success": true,
        "overall_score": score.overall_score(),
    });
    Ok((StatusCode::OK, Json(payload)).into_response())
}

pub(crate) async fn decision_handler<S>(
    State(service): State<Arc<CredibilityService<S>>>,
    Path(work_history_id): Path<String>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> Result<Response, AppError>
where
    S: WorkRecordStore + 'static,
{
    let Json(request) = payload?;
    let decision = request.into_decision()?;

    let outcome = service
        .record_decision(&WorkHistoryId(work_history_id), decision)
        .await?;
    Ok((StatusCode::OK, Json(outcome)).into_response())
}

pub(crate) async fn score_handler<S>(
    State(service): State<Arc<CredibilityService<S>>>,
    Path(freelancer_id): Path<String>,
) -> Result<Response, AppError>
where
    S: WorkRecordStore + 'static,
{
    let id = FreelancerId(freelancer_id);
    let score = service
        .score_for(&id)
        .await?
        .ok_or(CredibilityServiceError::NoScore(id))?;
    Ok((StatusCode::OK, Json(CredibilityScoreView::from(score))).into_response())
}
