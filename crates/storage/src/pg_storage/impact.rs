//! ImpactStore implementation for PgStorage.

use super::*;

use crate::traits::ImpactStore;
use crate::types::{clamp_limit, max_retry_count, usize_to_i64};
use async_trait::async_trait;
use pmos_core::{ImpactQueueStats, ImpactQueueStatus, ImpactRunDetail};

#[async_trait]
impl ImpactStore for PgStorage {
    async fn enqueue_impact(&self, item: &ImpactQueueItem) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO impact_queue
               (id, user_id, artifact_id, source_artifact_id, document_name, document_text,
                status, attempts, scheduled_at, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, 'pending', 0, $7, $8)",
        )
        .bind(item.id)
        .bind(item.user_id)
        .bind(item.artifact_id)
        .bind(item.source_artifact_id)
        .bind(&item.document_name)
        .bind(&item.document_text)
        .bind(item.scheduled_at)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn enqueue_or_merge_impact(&self, item: &ImpactQueueItem) -> Result<bool, StorageError> {
        if item.source_artifact_id.is_some() {
            let merged = sqlx::query(
                "UPDATE impact_queue
                   SET document_name = $3, document_text = $4, scheduled_at = $5
                   WHERE id = (
                       SELECT id FROM impact_queue
                       WHERE artifact_id = $1 AND source_artifact_id = $2
                         AND status = 'pending'
                       ORDER BY scheduled_at ASC
                       LIMIT 1
                       FOR UPDATE SKIP LOCKED
                   )",
            )
            .bind(item.artifact_id)
            .bind(item.source_artifact_id)
            .bind(&item.document_name)
            .bind(&item.document_text)
            .bind(item.scheduled_at)
            .execute(&self.pool)
            .await?;
            if merged.rows_affected() > 0 {
                return Ok(true);
            }
        }
        self.enqueue_impact(item).await?;
        Ok(false)
    }

    async fn claim_impact_items(
        &self,
        limit: usize,
        visibility_timeout_secs: i64,
    ) -> Result<Vec<ImpactQueueItem>, StorageError> {
        let rows = sqlx::query(&format!(
            "UPDATE impact_queue
               SET status = 'processing', claimed_at = NOW()
               WHERE id IN (
                   SELECT id FROM impact_queue
                   WHERE (status = 'pending' AND scheduled_at <= NOW())
                      OR (status = 'processing'
                          AND claimed_at < NOW() - make_interval(secs => $1))
                   ORDER BY scheduled_at ASC
                   LIMIT $2
                   FOR UPDATE SKIP LOCKED
               )
               RETURNING {QUEUE_COLUMNS}"
        ))
        .bind(visibility_timeout_secs as f64)
        .bind(usize_to_i64(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_queue_item).collect()
    }

    async fn finish_impact_item(
        &self,
        id: Uuid,
        status: ImpactQueueStatus,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "UPDATE impact_queue SET status = $2, completed_at = NOW(), last_error = NULL
               WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fail_impact_item(
        &self,
        id: Uuid,
        error: &str,
    ) -> Result<ImpactQueueStatus, StorageError> {
        let row = sqlx::query(
            "UPDATE impact_queue
               SET attempts = attempts + 1,
                   status = CASE
                       WHEN attempts + 1 >= $1 THEN 'failed'
                       ELSE 'pending'
                   END,
                   claimed_at = NULL,
                   last_error = $3
               WHERE id = $2
               RETURNING status",
        )
        .bind(max_retry_count())
        .bind(id)
        .bind(error)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StorageError::not_found("impact_queue", id))?;
        parse_column(&row, "status")
    }

    async fn release_stale_impact_items(
        &self,
        visibility_timeout_secs: i64,
    ) -> Result<usize, StorageError> {
        let result = sqlx::query(
            "UPDATE impact_queue
               SET status = 'pending', claimed_at = NULL
               WHERE status = 'processing'
                 AND claimed_at <= NOW() - make_interval(secs => $1)",
        )
        .bind(visibility_timeout_secs as f64)
        .execute(&self.pool)
        .await?;
        Ok(usize::try_from(result.rows_affected()).unwrap_or(usize::MAX))
    }

    async fn impact_queue_stats(&self) -> Result<ImpactQueueStats, StorageError> {
        let row = sqlx::query(
            "SELECT
               COUNT(*) FILTER (WHERE status = 'pending') AS pending,
               COUNT(*) FILTER (WHERE status = 'processing') AS processing,
               COUNT(*) FILTER (WHERE status = 'completed') AS completed,
               COUNT(*) FILTER (WHERE status = 'skipped') AS skipped,
               COUNT(*) FILTER (WHERE status = 'failed') AS failed
             FROM impact_queue",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(ImpactQueueStats {
            pending: row.try_get("pending")?,
            processing: row.try_get("processing")?,
            completed: row.try_get("completed")?,
            skipped: row.try_get("skipped")?,
            failed: row.try_get("failed")?,
        })
    }

    async fn retry_failed_impact_items(&self) -> Result<usize, StorageError> {
        let result = sqlx::query(
            "UPDATE impact_queue
               SET status = 'pending', attempts = 0, claimed_at = NULL, scheduled_at = NOW()
               WHERE status = 'failed'",
        )
        .execute(&self.pool)
        .await?;
        Ok(usize::try_from(result.rows_affected()).unwrap_or(usize::MAX))
    }

    async fn clear_failed_impact_items(&self) -> Result<usize, StorageError> {
        let result = sqlx::query("DELETE FROM impact_queue WHERE status = 'failed'")
            .execute(&self.pool)
            .await?;
        Ok(usize::try_from(result.rows_affected()).unwrap_or(usize::MAX))
    }

    async fn list_impact_queue(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ImpactQueueItem>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {QUEUE_COLUMNS} FROM impact_queue
               WHERE user_id = $1
               ORDER BY created_at DESC
               LIMIT $2"
        ))
        .bind(user_id)
        .bind(usize_to_i64(clamp_limit(limit)))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_queue_item).collect()
    }

    async fn save_impact_run(&self, detail: &ImpactRunDetail) -> Result<bool, StorageError> {
        let run = &detail.run;
        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query(
            "INSERT INTO impact_runs
               (id, user_id, artifact_id, queue_id, document_name, total_score, risk_level,
                summary, item_count, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               ON CONFLICT (queue_id) DO NOTHING",
        )
        .bind(run.id)
        .bind(run.user_id)
        .bind(run.artifact_id)
        .bind(run.queue_id)
        .bind(&run.document_name)
        .bind(run.total_score)
        .bind(run.risk_level.as_str())
        .bind(&run.summary)
        .bind(run.item_count)
        .bind(run.created_at)
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            tracing::debug!(queue_id = ?run.queue_id, "impact run already recorded for queue row");
            return Ok(false);
        }
        for item in &detail.items {
            sqlx::query(
                "INSERT INTO impact_items
                   (id, run_id, section, change_kind, severity, score, description, suggested_action)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(item.id)
            .bind(item.run_id)
            .bind(&item.section)
            .bind(item.change_kind.as_str())
            .bind(item.severity.as_str())
            .bind(item.score)
            .bind(&item.description)
            .bind(item.suggested_action.as_deref())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(true)
    }

    async fn get_impact_run(&self, id: Uuid) -> Result<Option<ImpactRunDetail>, StorageError> {
        let row = sqlx::query(&format!("SELECT {RUN_COLUMNS} FROM impact_runs WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let run = row_to_run(&row)?;
        let items = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM impact_items WHERE run_id = $1 ORDER BY score DESC, id"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        let items = items.iter().map(row_to_item).collect::<Result<Vec<_>, _>>()?;
        Ok(Some(ImpactRunDetail { run, items }))
    }

    async fn list_impact_runs(
        &self,
        user_id: Uuid,
        artifact_id: Option<Uuid>,
        limit: usize,
    ) -> Result<Vec<ImpactRun>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {RUN_COLUMNS} FROM impact_runs
               WHERE user_id = $1 AND ($2::UUID IS NULL OR artifact_id = $2)
               ORDER BY created_at DESC
               LIMIT $3"
        ))
        .bind(user_id)
        .bind(artifact_id)
        .bind(usize_to_i64(clamp_limit(limit)))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_run).collect()
    }
}
