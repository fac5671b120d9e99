use futures_util::StreamExt;
use futures_util::stream;
use pmos_core::{DrainReport, ImpactQueueItem, ImpactQueueStatus};
use pmos_storage::traits::{ArtifactStore, ImpactStore};

use super::ImpactService;
use crate::ServiceError;

enum ItemOutcome {
    Completed,
    Skipped,
    Failed,
}

impl ImpactService {
    /// Claim due queue rows and analyze them, at most `workers` at a time.
    ///
    /// Claims are exclusive, so concurrent drains split the queue between
    /// them. A row whose artifact is gone is `skipped`; a failed analysis goes
    /// back to `pending` until it runs out of attempts.
    pub async fn drain(&self, limit: Option<usize>) -> Result<DrainReport, ServiceError> {
        self.llm()?;
        let limit = limit.unwrap_or(self.drain_limit).clamp(1, self.drain_limit);
        let items =
            self.storage.claim_impact_items(limit, self.visibility_timeout_secs).await?;
        let mut report = DrainReport { claimed: items.len(), ..DrainReport::default() };
        if items.is_empty() {
            return Ok(report);
        }

        let outcomes: Vec<ItemOutcome> = stream::iter(items)
            .map(|item| self.process_item(item))
            .buffer_unordered(self.workers)
            .collect()
            .await;
        for outcome in outcomes {
            match outcome {
                ItemOutcome::Completed => report.completed += 1,
                ItemOutcome::Skipped => report.skipped += 1,
                ItemOutcome::Failed => report.failed += 1,
            }
        }
        tracing::info!(
            claimed = report.claimed,
            completed = report.completed,
            skipped = report.skipped,
            failed = report.failed,
            "impact queue drained"
        );
        Ok(report)
    }

    async fn process_item(&self, item: ImpactQueueItem) -> ItemOutcome {
        match self.analyze_item(&item).await {
            Ok(status) => {
                if let Err(e) = self.storage.finish_impact_item(item.id, status).await {
                    tracing::error!(queue_id = %item.id, error = %e, "failed to finish impact row");
                    return ItemOutcome::Failed;
                }
                if status == ImpactQueueStatus::Skipped {
                    ItemOutcome::Skipped
                } else {
                    ItemOutcome::Completed
                }
            },
            Err(e) => {
                let message = e.to_string();
                match self.storage.fail_impact_item(item.id, &message).await {
                    Ok(ImpactQueueStatus::Failed) => tracing::error!(
                        queue_id = %item.id,
                        attempts = item.attempts + 1,
                        error = %message,
                        "impact analysis failed permanently"
                    ),
                    Ok(_) => tracing::warn!(
                        queue_id = %item.id,
                        attempts = item.attempts + 1,
                        error = %message,
                        "impact analysis failed, will retry"
                    ),
                    Err(store_err) => tracing::error!(
                        queue_id = %item.id,
                        error = %store_err,
                        "failed to record impact failure"
                    ),
                }
                ItemOutcome::Failed
            },
        }
    }

    async fn analyze_item(&self, item: &ImpactQueueItem) -> Result<ImpactQueueStatus, ServiceError> {
        let Some(artifact) = self.storage.get_artifact(item.artifact_id).await? else {
            tracing::debug!(queue_id = %item.id, artifact_id = %item.artifact_id, "artifact gone, skipping");
            return Ok(ImpactQueueStatus::Skipped);
        };
        self.run_analysis(&artifact, &item.document_name, &item.document_text, Some(item.id))
            .await?;
        Ok(ImpactQueueStatus::Completed)
    }
}
