use serde::Serialize;

/// Contribution of each sub-score to the overall credibility score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreWeights {
    pub delivery: f64,
    pub quality: f64,
    pub consistency: f64,
    pub skill_match: f64,
}

impl ScoreWeights {
    /// Weights applied to every freelancer. They sum to exactly 1.0, so an
    /// overall score built from sub-scores in [0, 100] stays in [0, 100].
    pub const STANDARD: Self = Self {
        delivery: 0.30,
        quality: 0.35,
        consistency: 0.15,
        skill_match: 0.20,
    };

    pub fn total(&self) -> f64 {
        self.delivery + self.quality + self.consistency + self.skill_match
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::STANDARD
    }
}
