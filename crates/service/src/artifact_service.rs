use std::sync::Arc;

use chrono::{Duration, Utc};
use pmos_core::{
    Artifact, ArtifactContent, ArtifactType, DEFAULT_QUERY_LIMIT, ImpactQueueItem,
    MAX_QUERY_LIMIT, MissionKind, RealtimeEvent, XpSource, env_parse_with_default,
};
use pmos_storage::traits::{ArtifactStore, GamificationStore, ImpactStore};
use pmos_storage::StorageBackend;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::ServiceError;
use crate::error::ensure_owner;
use crate::events::publish;
use crate::gamification_service::GamificationService;
use crate::mission_service::MissionService;

/// Fields for a new artifact.
#[derive(Debug, Clone)]
pub struct NewArtifact {
    pub title: String,
    pub content: ArtifactContent,
    pub product_context_id: Option<Uuid>,
    pub prd_id: Option<Uuid>,
}

pub struct ArtifactService {
    storage: Arc<StorageBackend>,
    gamification: Arc<GamificationService>,
    missions: Arc<MissionService>,
    event_tx: broadcast::Sender<RealtimeEvent>,
    impact_debounce_secs: i64,
}

impl ArtifactService {
    #[must_use]
    pub fn new(
        storage: Arc<StorageBackend>,
        gamification: Arc<GamificationService>,
        missions: Arc<MissionService>,
        event_tx: broadcast::Sender<RealtimeEvent>,
    ) -> Self {
        let impact_debounce_secs = env_parse_with_default("PMOS_IMPACT_DEBOUNCE_SECS", 60i64).max(0);
        Self { storage, gamification, missions, event_tx, impact_debounce_secs }
    }

    /// Validate, store and reward a new artifact.
    pub async fn create(&self, user_id: Uuid, input: NewArtifact) -> Result<Artifact, ServiceError> {
        if let Some(prd_id) = input.prd_id {
            let source = self.get(user_id, prd_id).await?;
            if source.artifact_type != ArtifactType::Prd {
                return Err(ServiceError::InvalidInput(format!(
                    "prdId must reference a prd artifact, not {}",
                    source.artifact_type
                )));
            }
        }
        let artifact = Artifact::new(
            user_id,
            &input.title,
            input.content,
            input.product_context_id,
            input.prd_id,
        )?;
        self.storage.save_artifact(&artifact).await?;
        let created = self.storage.increment_artifacts_created(user_id).await?;
        tracing::info!(
            %user_id,
            artifact_id = %artifact.id,
            artifact_type = %artifact.artifact_type,
            total = created,
            "artifact created"
        );

        publish(
            &self.event_tx,
            RealtimeEvent::ArtifactCreated {
                user_id,
                artifact_id: artifact.id,
                artifact_type: artifact.artifact_type,
                title: artifact.title.clone(),
            },
        );
        self.gamification.record_action(user_id, XpSource::ArtifactCreated).await?;
        self.missions.record_mission_progress(user_id, MissionKind::CreateArtifact).await?;
        Ok(artifact)
    }

    pub async fn get(&self, user_id: Uuid, artifact_id: Uuid) -> Result<Artifact, ServiceError> {
        let artifact = self
            .storage
            .get_artifact(artifact_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("artifact {artifact_id}")))?;
        ensure_owner(artifact.user_id, user_id, "artifact")?;
        Ok(artifact)
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        artifact_type: Option<ArtifactType>,
        limit: Option<usize>,
    ) -> Result<Vec<Artifact>, ServiceError> {
        let limit = limit.unwrap_or(DEFAULT_QUERY_LIMIT).clamp(1, MAX_QUERY_LIMIT);
        Ok(self.storage.list_artifacts(user_id, artifact_type, limit).await?)
    }

    /// Replace an artifact's content and queue impact analysis for every
    /// artifact derived from it. A pending row for the same dependent takes
    /// the newer text instead of queueing another.
    pub async fn update(
        &self,
        user_id: Uuid,
        artifact_id: Uuid,
        content: ArtifactContent,
    ) -> Result<Artifact, ServiceError> {
        let mut artifact = self.get(user_id, artifact_id).await?;
        artifact.replace_content(content)?;
        let rows = self.dependent_queue_rows(&artifact).await?;
        if !self.storage.update_artifact(&artifact).await? {
            return Err(ServiceError::NotFound(format!("artifact {artifact_id}")));
        }
        publish(&self.event_tx, RealtimeEvent::ArtifactUpdated { user_id, artifact_id });

        let mut merged = 0usize;
        for row in &rows {
            if self.storage.enqueue_or_merge_impact(row).await? {
                merged += 1;
            }
        }
        tracing::info!(%user_id, %artifact_id, queued = rows.len(), merged, "artifact updated");
        Ok(artifact)
    }

    async fn dependent_queue_rows(
        &self,
        source: &Artifact,
    ) -> Result<Vec<ImpactQueueItem>, ServiceError> {
        let dependents = self.storage.list_dependent_artifacts(source.id).await?;
        if dependents.is_empty() {
            return Ok(Vec::new());
        }
        let scheduled_at = Utc::now() + Duration::seconds(self.impact_debounce_secs);
        let document_text = source.content.to_impact_document();
        let rows = dependents
            .iter()
            .map(|dependent| {
                ImpactQueueItem::new(
                    dependent.user_id,
                    dependent.id,
                    Some(source.id),
                    &source.title,
                    document_text.clone(),
                    scheduled_at,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub async fn delete(&self, user_id: Uuid, artifact_id: Uuid) -> Result<(), ServiceError> {
        self.get(user_id, artifact_id).await?;
        self.storage.delete_artifact(artifact_id).await?;
        tracing::debug!(%user_id, %artifact_id, "artifact deleted");
        Ok(())
    }
}
