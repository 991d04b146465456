//! PostgreSQL-backed work record store.
//!
//! Speaks the hosted platform schema directly: `work_history` rows joined with
//! `projects`, and one `credibility_scores` row per freelancer keyed by
//! `user_id`. Identifier columns are `uuid` in the database and opaque strings
//! on this side, so every query casts at the boundary.

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::debug;

use super::super::calculator::ScoreSet;
use super::super::domain::{
    ClientId, CredibilityScore, DecisionUpdate, FreelancerId, Project, ProjectId,
    WorkHistoryEntry, WorkHistoryId, WorkHistoryRecord, WorkStatus,
};
use super::super::repository::{StoreError, WorkRecordStore};

/// Postgres reports malformed uuid text with this SQLSTATE.
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

const WORK_HISTORY_SELECT: &str = "SELECT wh.id::text AS id,
        wh.project_id::text AS project_id,
        wh.freelancer_id::text AS freelancer_id,
        wh.client_id::text AS client_id,
        wh.status::text AS status,
        wh.delivered_on_time,
        wh.quality_rating,
        wh.submitted_at,
        wh.verified_at,
        wh.submission_notes,
        p.id::text AS joined_project_id,
        p.title AS project_title,
        p.client_id::text AS project_client_id,
        p.complexity AS project_complexity
   FROM work_history wh
   LEFT JOIN projects p ON p.id = wh.project_id";

#[derive(sqlx::FromRow)]
struct WorkHistoryRow {
    id: String,
    project_id: String,
    freelancer_id: String,
    client_id: String,
    status: String,
    delivered_on_time: Option<bool>,
    quality_rating: Option<i32>,
    submitted_at: Option<DateTime<Utc>>,
    verified_at: Option<DateTime<Utc>>,
    submission_notes: Option<String>,
    joined_project_id: Option<String>,
    project_title: Option<String>,
    project_client_id: Option<String>,
    project_complexity: Option<i32>,
}

fn small_int(column: &str, value: Option<i32>) -> Result<Option<u8>, StoreError> {
    value
        .map(|raw| {
            u8::try_from(raw)
                .map_err(|_| StoreError::Decode(format!("{column} value {raw} is out of range")))
        })
        .transpose()
}

impl TryFrom<WorkHistoryRow> for WorkHistoryEntry {
    type Error = StoreError;

    fn try_from(row: WorkHistoryRow) -> Result<Self, Self::Error> {
        let status = WorkStatus::parse(&row.status)
            .ok_or_else(|| StoreError::Decode(format!("unknown work status '{}'", row.status)))?;

        let project = match row.joined_project_id {
            Some(id) => Some(Project {
                id: ProjectId(id),
                title: row.project_title.unwrap_or_default(),
                client_id: ClientId(row.project_client_id.unwrap_or_default()),
                complexity: small_int("projects.complexity", row.project_complexity)?,
            }),
            None => None,
        };

        Ok(WorkHistoryEntry {
            record: WorkHistoryRecord {
                id: WorkHistoryId(row.id),
                project_id: ProjectId(row.project_id),
                freelancer_id: FreelancerId(row.freelancer_id),
                client_id: ClientId(row.client_id),
                status,
                delivered_on_time: row.delivered_on_time,
                quality_rating: small_int("work_history.quality_rating", row.quality_rating)?,
                submitted_at: row.submitted_at,
                verified_at: row.verified_at,
                submission_notes: row.submission_notes,
            },
            project,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ScoreRow {
    user_id: String,
    overall_score: f64,
    delivery_score: f64,
    quality_score: f64,
    consistency_score: f64,
    skill_match_score: f64,
    total_projects: i32,
    on_time_deliveries: i32,
    last_calculated_at: DateTime<Utc>,
}

impl TryFrom<ScoreRow> for CredibilityScore {
    type Error = StoreError;

    fn try_from(row: ScoreRow) -> Result<Self, Self::Error> {
        let count = |column: &str, raw: i32| {
            u32::try_from(raw)
                .map_err(|_| StoreError::Decode(format!("{column} value {raw} is negative")))
        };

        Ok(CredibilityScore {
            freelancer_id: FreelancerId(row.user_id),
            scores: ScoreSet {
                overall_score: row.overall_score,
                delivery_score: row.delivery_score,
                quality_score: row.quality_score,
                consistency_score: row.consistency_score,
                skill_match_score: row.skill_match_score,
                total_projects: count("total_projects", row.total_projects)?,
                on_time_deliveries: count("on_time_deliveries", row.on_time_deliveries)?,
            },
            last_calculated_at: row.last_calculated_at,
        })
    }
}

fn is_malformed_id(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(INVALID_TEXT_REPRESENTATION),
        _ => false,
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let message = err.to_string();
        match err {
            sqlx::Error::Database(_) => StoreError::Rejected(message),
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::TypeNotFound { .. } => StoreError::Decode(message),
            _ => StoreError::Unavailable(message),
        }
    }
}

/// Store backed by a `sqlx` connection pool.
#[derive(Clone)]
pub struct PgWorkStore {
    pool: PgPool,
}

impl PgWorkStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl WorkRecordStore for PgWorkStore {
    async fn read_work_history(
        &self,
        id: &WorkHistoryId,
    ) -> Result<Option<WorkHistoryEntry>, StoreError> {
        let query = format!("{WORK_HISTORY_SELECT} WHERE wh.id = $1::uuid");
        let row = sqlx::query_as::<_, WorkHistoryRow>(&query)
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await;

        match row {
            Ok(Some(row)) => Ok(Some(row.try_into()?)),
            Ok(None) => Ok(None),
            Err(err) if is_malformed_id(&err) => {
                debug!(work_history_id = %id, "malformed work history id");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn read_verified_work_history(
        &self,
        freelancer_id: &FreelancerId,
    ) -> Result<Vec<WorkHistoryEntry>, StoreError> {
        let query = format!(
            "{WORK_HISTORY_SELECT} WHERE wh.freelancer_id = $1::uuid AND wh.status = 'verified'"
        );
        let rows = sqlx::query_as::<_, WorkHistoryRow>(&query)
            .bind(&freelancer_id.0)
            .fetch_all(&self.pool)
            .await?;

        debug!(%freelancer_id, rows = rows.len(), "loaded verified work history");
        rows.into_iter().map(WorkHistoryEntry::try_from).collect()
    }

    async fn upsert_credibility_score(
        &self,
        freelancer_id: &FreelancerId,
        scores: &ScoreSet,
        calculated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let total_projects = i32::try_from(scores.total_projects)
            .map_err(|_| StoreError::Rejected("total_projects exceeds column range".to_string()))?;
        let on_time_deliveries = i32::try_from(scores.on_time_deliveries).map_err(|_| {
            StoreError::Rejected("on_time_deliveries exceeds column range".to_string())
        })?;

        sqlx::query(
            "INSERT INTO credibility_scores (user_id, overall_score, delivery_score, quality_score,
                                             consistency_score, skill_match_score, total_projects,
                                             on_time_deliveries, last_calculated_at)
             VALUES ($1::uuid, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (user_id) DO UPDATE SET
               overall_score = EXCLUDED.overall_score,
               delivery_score = EXCLUDED.delivery_score,
               quality_score = EXCLUDED.quality_score,
               consistency_score = EXCLUDED.consistency_score,
               skill_match_score = EXCLUDED.skill_match_score,
               total_projects = EXCLUDED.total_projects,
               on_time_deliveries = EXCLUDED.on_time_deliveries,
               last_calculated_at = EXCLUDED.last_calculated_at,
               updated_at = NOW()",
        )
        .bind(&freelancer_id.0)
        .bind(scores.overall_score)
        .bind(scores.delivery_score)
        .bind(scores.quality_score)
        .bind(scores.consistency_score)
        .bind(scores.skill_match_score)
        .bind(total_projects)
        .bind(on_time_deliveries)
        .bind(calculated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn apply_decision(
        &self,
        id: &WorkHistoryId,
        update: &DecisionUpdate,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE work_history
                SET status = $2::work_status,
                    quality_rating = $3,
                    delivered_on_time = $4,
                    verified_at = $5,
                    updated_at = NOW()
              WHERE id = $1::uuid AND status = 'submitted'",
        )
        .bind(&id.0)
        .bind(update.status.as_str())
        .bind(update.quality_rating.map(i32::from))
        .bind(update.delivered_on_time)
        .bind(update.verified_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() == 1),
            Err(err) if is_malformed_id(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn read_credibility_score(
        &self,
        freelancer_id: &FreelancerId,
    ) -> Result<Option<CredibilityScore>, StoreError> {
        let row = sqlx::query_as::<_, ScoreRow>(
            "SELECT user_id::text AS user_id,
                    overall_score::float8 AS overall_score,
                    delivery_score::float8 AS delivery_score,
                    quality_score::float8 AS quality_score,
                    consistency_score::float8 AS consistency_score,
                    skill_match_score::float8 AS skill_match_score,
                    total_projects,
                    on_time_deliveries,
                    last_calculated_at
               FROM credibility_scores
              WHERE user_id = $1::uuid",
        )
        .bind(&freelancer_id.0)
        .fetch_optional(&self.pool)
        .await;

        match row {
            Ok(row) => row.map(CredibilityScore::try_from).transpose(),
            Err(err) if is_malformed_id(&err) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
