use serde::{Deserialize, Serialize};

/// Band an overall score falls into when shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Excellent,
    Good,
    Average,
    NeedsWork,
    GettingStarted,
}

impl ScoreTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Excellent
        } else if score >= 75.0 {
            Self::Good
        } else if score >= 50.0 {
            Self::Average
        } else if score >= 25.0 {
            Self::NeedsWork
        } else {
            Self::GettingStarted
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::NeedsWork => "Needs Work",
            Self::GettingStarted => "Getting Started",
        }
    }
}
