use async_trait::async_trait;
use pmos_core::{Artifact, ArtifactType};
use uuid::Uuid;

use crate::error::StorageError;

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn save_artifact(&self, artifact: &Artifact) -> Result<(), StorageError>;

    async fn get_artifact(&self, id: Uuid) -> Result<Option<Artifact>, StorageError>;

    /// Newest first, optionally filtered by type.
    async fn list_artifacts(
        &self,
        user_id: Uuid,
        artifact_type: Option<ArtifactType>,
        limit: usize,
    ) -> Result<Vec<Artifact>, StorageError>;

    /// Persist title, content and `updated_at`. Returns `false` if the row is gone.
    async fn update_artifact(&self, artifact: &Artifact) -> Result<bool, StorageError>;

    async fn delete_artifact(&self, id: Uuid) -> Result<bool, StorageError>;

    /// Artifacts whose `prd_id` points at `source_id`.
    async fn list_dependent_artifacts(&self, source_id: Uuid)
    -> Result<Vec<Artifact>, StorageError>;
}
