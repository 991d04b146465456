mod rules;
mod tier;
mod weights;

pub use tier::ScoreTier;
pub use weights::ScoreWeights;

use super::domain::VerifiedWork;
use rules::{
    consistency_score, delivery_score, quality_score, round_to_cents, skill_match_score, WorkTally,
};
use serde::{Deserialize, Serialize};

/// Composite credibility score and the sub-scores it is built from.
///
/// Every score field is on a 0-100 scale, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub overall_score: f64,
    pub delivery_score: f64,
    pub quality_score: f64,
    pub consistency_score: f64,
    pub skill_match_score: f64,
    pub total_projects: u32,
    pub on_time_deliveries: u32,
}

impl ScoreSet {
    pub fn tier(&self) -> ScoreTier {
        ScoreTier::from_score(self.overall_score)
    }
}

/// Score a freelancer's complete set of verified work.
///
/// The caller is responsible for passing only verified records. Total for any
/// input, including an empty slice, and insensitive to ordering.
pub fn compute(verified_work: &[VerifiedWork]) -> ScoreSet {
    let tally = WorkTally::from_work(verified_work);
    let weights = ScoreWeights::STANDARD;

    let delivery = delivery_score(&tally);
    let quality = quality_score(&tally);
    let consistency = consistency_score(&tally);
    let skill_match = skill_match_score(&tally);

    let overall = delivery * weights.delivery
        + quality * weights.quality
        + consistency * weights.consistency
        + skill_match * weights.skill_match;

    ScoreSet {
        overall_score: round_to_cents(overall),
        delivery_score: round_to_cents(delivery),
        quality_score: round_to_cents(quality),
        consistency_score: round_to_cents(consistency),
        skill_match_score: round_to_cents(skill_match),
        total_projects: tally.total,
        on_time_deliveries: tally.on_time,
    }
}
