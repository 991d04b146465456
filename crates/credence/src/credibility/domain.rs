use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::calculator::{ScoreSet, ScoreTier};

/// Complexity assumed for work whose project is missing or unrated.
pub const DEFAULT_COMPLEXITY: u8 = 3;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of a single deliverable submission.
    WorkHistoryId
);
string_id!(
    /// Identifier of the freelancer who submitted work; also keys the score row.
    FreelancerId
);
string_id!(ProjectId);
string_id!(ClientId);

/// Review state of a work submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    Pending,
    Submitted,
    Verified,
    Rejected,
}

impl WorkStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Submitted => "submitted",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "submitted" => Some(Self::Submitted),
            "verified" => Some(Self::Verified),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engagement definition; only the complexity feeds scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub client_id: ClientId,
    pub complexity: Option<u8>,
}

/// One freelancer deliverable submission.
///
/// `quality_rating` and `delivered_on_time` are only meaningful once a client
/// has verified the work; scoring never reads them from other statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkHistoryRecord {
    pub id: WorkHistoryId,
    pub project_id: ProjectId,
    pub freelancer_id: FreelancerId,
    pub client_id: ClientId,
    pub status: WorkStatus,
    pub delivered_on_time: Option<bool>,
    pub quality_rating: Option<u8>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub submission_notes: Option<String>,
}

/// A work history row joined with its owning project, as the store returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkHistoryEntry {
    pub record: WorkHistoryRecord,
    pub project: Option<Project>,
}

impl WorkHistoryEntry {
    /// Complexity of the owning project, falling back to the default when the
    /// project or its rating is absent. Zero counts as unrated.
    pub fn project_complexity(&self) -> u8 {
        self.project
            .as_ref()
            .and_then(|project| project.complexity)
            .filter(|complexity| *complexity > 0)
            .unwrap_or(DEFAULT_COMPLEXITY)
    }

    pub fn scoring_input(&self) -> VerifiedWork {
        VerifiedWork {
            delivered_on_time: self.record.delivered_on_time,
            quality_rating: self.record.quality_rating,
            project_complexity: self.project_complexity(),
        }
    }
}

/// Calculator input: the three facts of a verified record that scoring uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedWork {
    #[serde(default)]
    pub delivered_on_time: Option<bool>,
    #[serde(default)]
    pub quality_rating: Option<u8>,
    #[serde(default = "default_complexity")]
    pub project_complexity: u8,
}

fn default_complexity() -> u8 {
    DEFAULT_COMPLEXITY
}

/// Persisted projection of a freelancer's verified history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredibilityScore {
    pub freelancer_id: FreelancerId,
    #[serde(flatten)]
    pub scores: ScoreSet,
    pub last_calculated_at: DateTime<Utc>,
}

impl CredibilityScore {
    pub fn overall_score(&self) -> f64 {
        self.scores.overall_score
    }

    pub fn tier(&self) -> ScoreTier {
        ScoreTier::from_score(self.scores.overall_score)
    }
}

/// A client's ruling on a submitted deliverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum VerificationDecision {
    Approve { quality_rating: u8 },
    Reject,
}

impl VerificationDecision {
    pub fn is_approval(&self) -> bool {
        matches!(self, Self::Approve { .. })
    }

    /// Field values the decision writes onto the work history row.
    pub fn update(&self, decided_at: DateTime<Utc>) -> DecisionUpdate {
        match *self {
            Self::Approve { quality_rating } => DecisionUpdate {
                status: WorkStatus::Verified,
                quality_rating: Some(quality_rating),
                delivered_on_time: Some(true),
                verified_at: decided_at,
            },
            Self::Reject => DecisionUpdate {
                status: WorkStatus::Rejected,
                quality_rating: None,
                delivered_on_time: Some(false),
                verified_at: decided_at,
            },
        }
    }
}

/// Column values applied to a work history row when a decision lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionUpdate {
    pub status: WorkStatus,
    pub quality_rating: Option<u8>,
    pub delivered_on_time: Option<bool>,
    pub verified_at: DateTime<Utc>,
}
