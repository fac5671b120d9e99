//! ArtifactStore implementation for PgStorage.

use super::*;

use crate::traits::ArtifactStore;
use crate::types::{clamp_limit, usize_to_i64};
use async_trait::async_trait;
use pmos_core::ArtifactType;

#[async_trait]
impl ArtifactStore for PgStorage {
    async fn save_artifact(&self, artifact: &Artifact) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO artifacts
               (id, user_id, title, artifact_type, content, product_context_id, prd_id,
                created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(artifact.id)
        .bind(artifact.user_id)
        .bind(&artifact.title)
        .bind(artifact.artifact_type.as_str())
        .bind(serde_json::to_value(&artifact.content)?)
        .bind(artifact.product_context_id)
        .bind(artifact.prd_id)
        .bind(artifact.created_at)
        .bind(artifact.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_artifact(&self, id: Uuid) -> Result<Option<Artifact>, StorageError> {
        let row = sqlx::query(&format!("SELECT {ARTIFACT_COLUMNS} FROM artifacts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_artifact).transpose()
    }

    async fn list_artifacts(
        &self,
        user_id: Uuid,
        artifact_type: Option<ArtifactType>,
        limit: usize,
    ) -> Result<Vec<Artifact>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {ARTIFACT_COLUMNS} FROM artifacts
               WHERE user_id = $1 AND ($2::TEXT IS NULL OR artifact_type = $2)
               ORDER BY created_at DESC
               LIMIT $3"
        ))
        .bind(user_id)
        .bind(artifact_type.map(|t| t.as_str()))
        .bind(usize_to_i64(clamp_limit(limit)))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_artifact).collect()
    }

    async fn update_artifact(&self, artifact: &Artifact) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "UPDATE artifacts SET title = $2, content = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(artifact.id)
        .bind(&artifact.title)
        .bind(serde_json::to_value(&artifact.content)?)
        .bind(artifact.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_artifact(&self, id: Uuid) -> Result<bool, StorageError> {
        let result =
            sqlx::query("DELETE FROM artifacts WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_dependent_artifacts(
        &self,
        source_id: Uuid,
    ) -> Result<Vec<Artifact>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {ARTIFACT_COLUMNS} FROM artifacts
               WHERE prd_id = $1 AND id <> $1
               ORDER BY created_at ASC"
        ))
        .bind(source_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_artifact).collect()
    }
}
