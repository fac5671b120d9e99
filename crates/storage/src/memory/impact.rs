use async_trait::async_trait;
use chrono::Utc;
use pmos_core::{
    ImpactQueueItem, ImpactQueueStats, ImpactQueueStatus, ImpactRun, ImpactRunDetail,
};
use uuid::Uuid;

use super::{MemoryStorage, newest_first};
use crate::error::StorageError;
use crate::traits::ImpactStore;
use crate::types::max_retry_count;

#[async_trait]
impl ImpactStore for MemoryStorage {
    async fn enqueue_impact(&self, item: &ImpactQueueItem) -> Result<(), StorageError> {
        let mut state = self.lock().await;
        if state.queue.contains_key(&item.id) {
            return Err(StorageError::Duplicate(format!("impact_queue {}", item.id)));
        }
        state.queue.insert(item.id, item.clone());
        Ok(())
    }

    async fn enqueue_or_merge_impact(&self, item: &ImpactQueueItem) -> Result<bool, StorageError> {
        let mut state = self.lock().await;
        if item.source_artifact_id.is_some() {
            let pending = state.queue.values_mut().find(|row| {
                row.status == ImpactQueueStatus::Pending
                    && row.artifact_id == item.artifact_id
                    && row.source_artifact_id == item.source_artifact_id
            });
            if let Some(row) = pending {
                row.document_name.clone_from(&item.document_name);
                row.document_text.clone_from(&item.document_text);
                row.scheduled_at = item.scheduled_at;
                return Ok(true);
            }
        }
        state.queue.insert(item.id, item.clone());
        Ok(false)
    }

    async fn claim_impact_items(
        &self,
        limit: usize,
        visibility_timeout_secs: i64,
    ) -> Result<Vec<ImpactQueueItem>, StorageError> {
        let now = Utc::now();
        let mut state = self.lock().await;
        let mut due: Vec<&mut ImpactQueueItem> = state
            .queue
            .values_mut()
            .filter(|item| item.is_claimable(now, visibility_timeout_secs))
            .collect();
        due.sort_by_key(|item| item.scheduled_at);
        Ok(due
            .into_iter()
            .take(limit)
            .map(|item| {
                item.status = ImpactQueueStatus::Processing;
                item.claimed_at = Some(now);
                item.clone()
            })
            .collect())
    }

    async fn finish_impact_item(
        &self,
        id: Uuid,
        status: ImpactQueueStatus,
    ) -> Result<(), StorageError> {
        let mut state = self.lock().await;
        if let Some(item) = state.queue.get_mut(&id) {
            item.status = status;
            item.completed_at = Some(Utc::now());
            item.last_error = None;
        }
        Ok(())
    }

    async fn fail_impact_item(
        &self,
        id: Uuid,
        error: &str,
    ) -> Result<ImpactQueueStatus, StorageError> {
        let mut state = self.lock().await;
        let item =
            state.queue.get_mut(&id).ok_or_else(|| StorageError::not_found("impact_queue", id))?;
        item.attempts += 1;
        item.claimed_at = None;
        item.last_error = Some(error.to_owned());
        item.status = if item.attempts >= max_retry_count() {
            ImpactQueueStatus::Failed
        } else {
            ImpactQueueStatus::Pending
        };
        Ok(item.status)
    }

    async fn release_stale_impact_items(
        &self,
        visibility_timeout_secs: i64,
    ) -> Result<usize, StorageError> {
        let now = Utc::now();
        let mut state = self.lock().await;
        let mut released = 0usize;
        for item in state.queue.values_mut().filter(|i| i.status == ImpactQueueStatus::Processing) {
            if item.is_claimable(now, visibility_timeout_secs) {
                item.status = ImpactQueueStatus::Pending;
                item.claimed_at = None;
                released += 1;
            }
        }
        Ok(released)
    }

    async fn impact_queue_stats(&self) -> Result<ImpactQueueStats, StorageError> {
        let state = self.lock().await;
        let mut stats = ImpactQueueStats::default();
        for item in state.queue.values() {
            let counter = match item.status {
                ImpactQueueStatus::Pending => &mut stats.pending,
                ImpactQueueStatus::Processing => &mut stats.processing,
                ImpactQueueStatus::Completed => &mut stats.completed,
                ImpactQueueStatus::Skipped => &mut stats.skipped,
                ImpactQueueStatus::Failed => &mut stats.failed,
            };
            *counter += 1;
        }
        Ok(stats)
    }

    async fn retry_failed_impact_items(&self) -> Result<usize, StorageError> {
        let now = Utc::now();
        let mut state = self.lock().await;
        let mut retried = 0usize;
        for item in state.queue.values_mut().filter(|i| i.status == ImpactQueueStatus::Failed) {
            item.status = ImpactQueueStatus::Pending;
            item.attempts = 0;
            item.claimed_at = None;
            item.scheduled_at = now;
            retried += 1;
        }
        Ok(retried)
    }

    async fn clear_failed_impact_items(&self) -> Result<usize, StorageError> {
        let mut state = self.lock().await;
        let before = state.queue.len();
        state.queue.retain(|_, item| item.status != ImpactQueueStatus::Failed);
        Ok(before - state.queue.len())
    }

    async fn list_impact_queue(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ImpactQueueItem>, StorageError> {
        let state = self.lock().await;
        let rows = state.queue.values().filter(|i| i.user_id == user_id).cloned().collect();
        Ok(newest_first(rows, |i| i.created_at, limit))
    }

    async fn save_impact_run(&self, detail: &ImpactRunDetail) -> Result<bool, StorageError> {
        let mut state = self.lock().await;
        if let Some(queue_id) = detail.run.queue_id
            && state.runs.values().any(|r| r.queue_id == Some(queue_id))
        {
            tracing::debug!(%queue_id, "impact run already recorded for queue row");
            return Ok(false);
        }
        state.runs.insert(detail.run.id, detail.run.clone());
        state.items.insert(detail.run.id, detail.items.clone());
        Ok(true)
    }

    async fn get_impact_run(&self, id: Uuid) -> Result<Option<ImpactRunDetail>, StorageError> {
        let state = self.lock().await;
        Ok(state.runs.get(&id).map(|run| {
            let mut items = state.items.get(&id).cloned().unwrap_or_default();
            items.sort_by(|a, b| b.score.cmp(&a.score));
            ImpactRunDetail { run: run.clone(), items }
        }))
    }

    async fn list_impact_runs(
        &self,
        user_id: Uuid,
        artifact_id: Option<Uuid>,
        limit: usize,
    ) -> Result<Vec<ImpactRun>, StorageError> {
        let state = self.lock().await;
        let rows = state
            .runs
            .values()
            .filter(|r| r.user_id == user_id)
            .filter(|r| artifact_id.is_none_or(|id| r.artifact_id == id))
            .cloned()
            .collect();
        Ok(newest_first(rows, |r| r.created_at, limit))
    }
}
