//! Impact analysis: scoring how an updated document affects an artifact.
//!
//! Analyses run either directly (the `analyze-impact` function) or from the
//! queue that artifact updates feed. A run is stored at most once per queue
//! row, so overlapping drains cannot double-count.

mod drain;

use std::sync::Arc;

use chrono::{Duration, Utc};
use pmos_core::{
    Artifact, ArtifactContent, DEFAULT_IMPACT_DRAIN_LIMIT, DEFAULT_QUERY_LIMIT, DetectedChange,
    ImpactQueueItem, ImpactQueueStats, ImpactReport, ImpactRun, ImpactRunDetail,
    MAX_DOCUMENT_CHARS, MAX_QUERY_LIMIT, MissionKind, RealtimeEvent, RiskLevel, XpSource,
    env_parse_with_default,
};
use pmos_llm::LlmClient;
use pmos_storage::traits::ImpactStore;
use pmos_storage::{StorageBackend, default_visibility_timeout_secs};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::ServiceError;
use crate::artifact_service::{ArtifactService, NewArtifact};
use crate::error::ensure_owner;
use crate::events::publish;
use crate::gamification_service::GamificationService;
use crate::mission_service::MissionService;

/// Response of a direct analysis.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysis {
    pub run_id: Uuid,
    pub changes: Vec<DetectedChange>,
    pub total_score: i64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedReport {
    pub artifact_id: Uuid,
    pub report: ImpactReport,
}

pub struct ImpactService {
    pub(crate) storage: Arc<StorageBackend>,
    pub(crate) llm: Option<Arc<LlmClient>>,
    pub(crate) artifacts: Arc<ArtifactService>,
    pub(crate) gamification: Arc<GamificationService>,
    pub(crate) missions: Arc<MissionService>,
    pub(crate) event_tx: broadcast::Sender<RealtimeEvent>,
    pub(crate) drain_limit: usize,
    pub(crate) workers: usize,
    pub(crate) visibility_timeout_secs: i64,
}

impl ImpactService {
    #[must_use]
    pub fn new(
        storage: Arc<StorageBackend>,
        llm: Option<Arc<LlmClient>>,
        artifacts: Arc<ArtifactService>,
        gamification: Arc<GamificationService>,
        missions: Arc<MissionService>,
        event_tx: broadcast::Sender<RealtimeEvent>,
    ) -> Self {
        let drain_limit =
            env_parse_with_default("PMOS_IMPACT_DRAIN_LIMIT", DEFAULT_IMPACT_DRAIN_LIMIT).max(1);
        let workers = env_parse_with_default("PMOS_IMPACT_WORKERS", 4usize).max(1);
        Self {
            storage,
            llm,
            artifacts,
            gamification,
            missions,
            event_tx,
            drain_limit,
            workers,
            visibility_timeout_secs: default_visibility_timeout_secs(),
        }
    }

    /// Upper bound on analyses one drain runs at the same time.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    pub(crate) fn llm(&self) -> Result<&LlmClient, ServiceError> {
        self.llm
            .as_deref()
            .ok_or_else(|| ServiceError::NotConfigured("LLM gateway (set PMOS_LLM_API_KEY)".into()))
    }

    /// Queue an analysis of `artifact_id` against a document, due after `delay`.
    pub async fn enqueue(
        &self,
        user_id: Uuid,
        artifact_id: Uuid,
        document_name: &str,
        document_text: String,
        source_artifact_id: Option<Uuid>,
        delay: Duration,
    ) -> Result<ImpactQueueItem, ServiceError> {
        self.artifacts.get(user_id, artifact_id).await?;
        let item = ImpactQueueItem::new(
            user_id,
            artifact_id,
            source_artifact_id,
            document_name,
            document_text,
            Utc::now() + delay,
        )?;
        self.storage.enqueue_impact(&item).await?;
        tracing::debug!(%user_id, %artifact_id, queue_id = %item.id, "impact analysis queued");
        Ok(item)
    }

    /// Analyze `artifact_id` against `document_text` right away.
    pub async fn analyze(
        &self,
        user_id: Uuid,
        artifact_id: Uuid,
        document_name: &str,
        document_text: &str,
    ) -> Result<ImpactAnalysis, ServiceError> {
        validate_document(document_name, document_text)?;
        let artifact = self.artifacts.get(user_id, artifact_id).await?;
        let (detail, changes) =
            self.run_analysis(&artifact, document_name, document_text, None).await?;
        Ok(ImpactAnalysis {
            run_id: detail.run.id,
            changes,
            total_score: detail.run.total_score,
            risk_level: detail.run.risk_level,
        })
    }

    /// Detect, score and store one run, then reward the owner.
    ///
    /// When a run already exists for `queue_id` nothing is written or
    /// rewarded and the freshly built detail is returned as is.
    pub(crate) async fn run_analysis(
        &self,
        artifact: &Artifact,
        document_name: &str,
        document_text: &str,
        queue_id: Option<Uuid>,
    ) -> Result<(ImpactRunDetail, Vec<DetectedChange>), ServiceError> {
        let llm = self.llm()?;
        let set = llm
            .detect_changes(&artifact.content.to_plain_text(), document_name, document_text)
            .await?;
        let detail = ImpactRunDetail::build(
            artifact.user_id,
            artifact.id,
            queue_id,
            document_name,
            set.summary,
            &set.changes,
        );
        if !self.storage.save_impact_run(&detail).await? {
            tracing::info!(
                artifact_id = %artifact.id,
                queue_id = ?queue_id,
                "impact run already stored for queue row"
            );
            return Ok((detail, set.changes));
        }

        let user_id = artifact.user_id;
        tracing::info!(
            %user_id,
            artifact_id = %artifact.id,
            run_id = %detail.run.id,
            score = detail.run.total_score,
            risk = %detail.run.risk_level,
            "impact run stored"
        );
        publish(
            &self.event_tx,
            RealtimeEvent::ImpactRunCompleted {
                user_id,
                run_id: detail.run.id,
                artifact_id: artifact.id,
                risk_level: detail.run.risk_level,
                total_score: detail.run.total_score,
            },
        );
        self.gamification.record_action(user_id, XpSource::ImpactAnalysis).await?;
        self.missions.record_mission_progress(user_id, MissionKind::RunImpactAnalysis).await?;
        Ok((detail, set.changes))
    }

    /// Write a narrative report for a stored run and save it as an artifact.
    pub async fn generate_report(
        &self,
        user_id: Uuid,
        run_id: Uuid,
    ) -> Result<GeneratedReport, ServiceError> {
        let detail = self.get_run(user_id, run_id).await?;
        let draft = self.llm()?.write_impact_report(&detail).await?;
        let report = ImpactReport {
            run_id,
            artifact_id: detail.run.artifact_id,
            document_name: detail.run.document_name.clone(),
            risk_level: detail.run.risk_level,
            total_score: detail.run.total_score,
            summary: draft.summary,
            findings: draft.findings,
            next_steps: draft.next_steps,
        };
        let artifact = self
            .artifacts
            .create(
                user_id,
                NewArtifact {
                    title: format!("Impact report: {}", detail.run.document_name),
                    content: ArtifactContent::ImpactReport(report.clone()),
                    product_context_id: None,
                    prd_id: None,
                },
            )
            .await?;
        Ok(GeneratedReport { artifact_id: artifact.id, report })
    }

    // ── Listing ──

    pub async fn list_queue(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<ImpactQueueItem>, ServiceError> {
        let limit = limit.unwrap_or(DEFAULT_QUERY_LIMIT).clamp(1, MAX_QUERY_LIMIT);
        Ok(self.storage.list_impact_queue(user_id, limit).await?)
    }

    pub async fn list_runs(
        &self,
        user_id: Uuid,
        artifact_id: Option<Uuid>,
        limit: Option<usize>,
    ) -> Result<Vec<ImpactRun>, ServiceError> {
        let limit = limit.unwrap_or(DEFAULT_QUERY_LIMIT).clamp(1, MAX_QUERY_LIMIT);
        Ok(self.storage.list_impact_runs(user_id, artifact_id, limit).await?)
    }

    pub async fn get_run(&self, user_id: Uuid, run_id: Uuid) -> Result<ImpactRunDetail, ServiceError> {
        let detail = self
            .storage
            .get_impact_run(run_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("impact run {run_id}")))?;
        ensure_owner(detail.run.user_id, user_id, "impact run")?;
        Ok(detail)
    }

    // ── Admin ──

    pub async fn queue_stats(&self) -> Result<ImpactQueueStats, ServiceError> {
        Ok(self.storage.impact_queue_stats().await?)
    }

    pub async fn retry_failed(&self) -> Result<usize, ServiceError> {
        let count = self.storage.retry_failed_impact_items().await?;
        tracing::info!(count, "failed impact rows requeued");
        Ok(count)
    }

    pub async fn clear_failed(&self) -> Result<usize, ServiceError> {
        let count = self.storage.clear_failed_impact_items().await?;
        tracing::info!(count, "failed impact rows cleared");
        Ok(count)
    }

    /// Hand abandoned `processing` rows back to the queue.
    pub async fn release_stale(&self) -> Result<usize, ServiceError> {
        let count = self.storage.release_stale_impact_items(self.visibility_timeout_secs).await?;
        if count > 0 {
            tracing::info!(count, "released stale impact rows");
        }
        Ok(count)
    }
}

fn validate_document(name: &str, text: &str) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::InvalidInput("documentName must not be empty".into()));
    }
    if text.trim().is_empty() {
        return Err(ServiceError::InvalidInput("documentText must not be empty".into()));
    }
    if text.chars().count() > MAX_DOCUMENT_CHARS {
        return Err(ServiceError::InvalidInput(format!(
            "documentText exceeds {MAX_DOCUMENT_CHARS} characters"
        )));
    }
    Ok(())
}
