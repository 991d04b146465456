use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::super::calculator::ScoreSet;
use super::super::domain::{
    CredibilityScore, DecisionUpdate, FreelancerId, Project, ProjectId, WorkHistoryEntry,
    WorkHistoryId, WorkHistoryRecord, WorkStatus,
};
use super::super::repository::{StoreError, WorkRecordStore};

#[derive(Default)]
struct Tables {
    projects: HashMap<ProjectId, Project>,
    work_history: BTreeMap<WorkHistoryId, WorkHistoryRecord>,
    scores: HashMap<FreelancerId, CredibilityScore>,
}

impl Tables {
    fn joined(&self, record: &WorkHistoryRecord) -> WorkHistoryEntry {
        WorkHistoryEntry {
            record: record.clone(),
            project: self.projects.get(&record.project_id).cloned(),
        }
    }
}

/// Process-local store used by tests, the demo command, and `serve` without a database.
#[derive(Default, Clone)]
pub struct MemoryWorkStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryWorkStore {
    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    pub fn insert_project(&self, project: Project) -> Result<(), StoreError> {
        self.lock()?.projects.insert(project.id.clone(), project);
        Ok(())
    }

    /// Insert or replace a work history row.
    pub fn insert_work_history(&self, record: WorkHistoryRecord) -> Result<(), StoreError> {
        self.lock()?.work_history.insert(record.id.clone(), record);
        Ok(())
    }

    pub fn work_history(&self, id: &WorkHistoryId) -> Result<Option<WorkHistoryRecord>, StoreError> {
        Ok(self.lock()?.work_history.get(id).cloned())
    }

    pub fn scores(&self) -> Result<Vec<CredibilityScore>, StoreError> {
        let tables = self.lock()?;
        let mut scores: Vec<_> = tables.scores.values().cloned().collect();
        scores.sort_by(|left, right| left.freelancer_id.cmp(&right.freelancer_id));
        Ok(scores)
    }

    /// Drop a cached score row; it can always be rebuilt by recalculating.
    pub fn clear_score(&self, freelancer_id: &FreelancerId) -> Result<(), StoreError> {
        self.lock()?.scores.remove(freelancer_id);
        Ok(())
    }
}

impl WorkRecordStore for MemoryWorkStore {
    async fn read_work_history(
        &self,
        id: &WorkHistoryId,
    ) -> Result<Option<WorkHistoryEntry>, StoreError> {
        let tables = self.lock()?;
        Ok(tables.work_history.get(id).map(|record| tables.joined(record)))
    }

    async fn read_verified_work_history(
        &self,
        freelancer_id: &FreelancerId,
    ) -> Result<Vec<WorkHistoryEntry>, StoreError> {
        let tables = self.lock()?;
        Ok(tables
            .work_history
            .values()
            .filter(|record| {
                &record.freelancer_id == freelancer_id && record.status == WorkStatus::Verified
            })
            .map(|record| tables.joined(record))
            .collect())
    }

    async fn upsert_credibility_score(
        &self,
        freelancer_id: &FreelancerId,
        scores: &ScoreSet,
        calculated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.lock()?.scores.insert(
            freelancer_id.clone(),
            CredibilityScore {
                freelancer_id: freelancer_id.clone(),
                scores: *scores,
                last_calculated_at: calculated_at,
            },
        );
        Ok(())
    }

    async fn apply_decision(
        &self,
        id: &WorkHistoryId,
        update: &DecisionUpdate,
    ) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        match tables.work_history.get_mut(id) {
            Some(record) if record.status == WorkStatus::Submitted => {
                record.status = update.status;
                record.quality_rating = update.quality_rating;
                record.delivered_on_time = update.delivered_on_time;
                record.verified_at = Some(update.verified_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn read_credibility_score(
        &self,
        freelancer_id: &FreelancerId,
    ) -> Result<Option<CredibilityScore>, StoreError> {
        Ok(self.lock()?.scores.get(freelancer_id).cloned())
    }
}
