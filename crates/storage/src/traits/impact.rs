use async_trait::async_trait;
use pmos_core::{ImpactQueueItem, ImpactQueueStats, ImpactQueueStatus, ImpactRun, ImpactRunDetail};
use uuid::Uuid;

use crate::error::StorageError;

/// Impact-analysis queue and the runs it produces.
#[async_trait]
pub trait ImpactStore: Send + Sync {
    async fn enqueue_impact(&self, item: &ImpactQueueItem) -> Result<(), StorageError>;

    /// Fold `item` into a pending row for the same artifact and source, taking
    /// its document and schedule, or queue it when there is none. Returns
    /// `true` when an existing row absorbed it.
    async fn enqueue_or_merge_impact(&self, item: &ImpactQueueItem) -> Result<bool, StorageError>;

    /// Atomically claim due `pending` rows and abandoned `processing` rows.
    /// A row is handed to at most one caller per claim.
    async fn claim_impact_items(
        &self,
        limit: usize,
        visibility_timeout_secs: i64,
    ) -> Result<Vec<ImpactQueueItem>, StorageError>;

    /// Finish a claimed row as `completed` or `skipped`.
    async fn finish_impact_item(
        &self,
        id: Uuid,
        status: ImpactQueueStatus,
    ) -> Result<(), StorageError>;

    /// Record a failed attempt. Back to `pending` until `max_retry_count()`
    /// attempts, then `failed`. Returns the resulting status.
    async fn fail_impact_item(
        &self,
        id: Uuid,
        error: &str,
    ) -> Result<ImpactQueueStatus, StorageError>;

    /// Release abandoned `processing` rows back to `pending`.
    async fn release_stale_impact_items(
        &self,
        visibility_timeout_secs: i64,
    ) -> Result<usize, StorageError>;

    async fn impact_queue_stats(&self) -> Result<ImpactQueueStats, StorageError>;

    /// Reset `failed` rows to `pending` with zero attempts.
    async fn retry_failed_impact_items(&self) -> Result<usize, StorageError>;

    async fn clear_failed_impact_items(&self) -> Result<usize, StorageError>;

    /// The user's queue rows, newest first.
    async fn list_impact_queue(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ImpactQueueItem>, StorageError>;

    /// Persist a run with its items. Returns `false` without writing when a
    /// run already exists for the same queue row.
    async fn save_impact_run(&self, detail: &ImpactRunDetail) -> Result<bool, StorageError>;

    async fn get_impact_run(&self, id: Uuid) -> Result<Option<ImpactRunDetail>, StorageError>;

    async fn list_impact_runs(
        &self,
        user_id: Uuid,
        artifact_id: Option<Uuid>,
        limit: usize,
    ) -> Result<Vec<ImpactRun>, StorageError>;
}
