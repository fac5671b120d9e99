use async_trait::async_trait;
use pmos_core::{Artifact, ArtifactType};
use uuid::Uuid;

use super::{MemoryStorage, newest_first};
use crate::error::StorageError;
use crate::traits::ArtifactStore;

#[async_trait]
impl ArtifactStore for MemoryStorage {
    async fn save_artifact(&self, artifact: &Artifact) -> Result<(), StorageError> {
        let mut state = self.lock().await;
        if state.artifacts.contains_key(&artifact.id) {
            return Err(StorageError::Duplicate(format!("artifact {}", artifact.id)));
        }
        state.artifacts.insert(artifact.id, artifact.clone());
        Ok(())
    }

    async fn get_artifact(&self, id: Uuid) -> Result<Option<Artifact>, StorageError> {
        Ok(self.lock().await.artifacts.get(&id).cloned())
    }

    async fn list_artifacts(
        &self,
        user_id: Uuid,
        artifact_type: Option<ArtifactType>,
        limit: usize,
    ) -> Result<Vec<Artifact>, StorageError> {
        let state = self.lock().await;
        let rows = state
            .artifacts
            .values()
            .filter(|a| a.user_id == user_id)
            .filter(|a| artifact_type.is_none_or(|t| a.artifact_type == t))
            .cloned()
            .collect();
        Ok(newest_first(rows, |a| a.created_at, limit))
    }

    async fn update_artifact(&self, artifact: &Artifact) -> Result<bool, StorageError> {
        let mut state = self.lock().await;
        let Some(stored) = state.artifacts.get_mut(&artifact.id) else {
            return Ok(false);
        };
        stored.title.clone_from(&artifact.title);
        stored.content = artifact.content.clone();
        stored.updated_at = artifact.updated_at;
        Ok(true)
    }

    async fn delete_artifact(&self, id: Uuid) -> Result<bool, StorageError> {
        Ok(self.lock().await.artifacts.remove(&id).is_some())
    }

    async fn list_dependent_artifacts(
        &self,
        source_id: Uuid,
    ) -> Result<Vec<Artifact>, StorageError> {
        let state = self.lock().await;
        let mut rows: Vec<Artifact> = state
            .artifacts
            .values()
            .filter(|a| a.prd_id == Some(source_id) && a.id != source_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.created_at);
        Ok(rows)
    }
}
