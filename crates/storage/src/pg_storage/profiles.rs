//! ProfileStore implementation for PgStorage.

use super::*;

use crate::traits::ProfileStore;
use crate::types::ProfileUpdate;
use async_trait::async_trait;

#[async_trait]
impl ProfileStore for PgStorage {
    async fn create_profile(
        &self,
        profile: &Profile,
        token_hash: &str,
    ) -> Result<GamificationStats, StorageError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO profiles (id, display_name, role, token_hash, created_at)
               VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(profile.id)
        .bind(&profile.display_name)
        .bind(profile.role.as_str())
        .bind(token_hash)
        .bind(profile.created_at)
        .execute(&mut *tx)
        .await?;
        let row = sqlx::query(&format!(
            "INSERT INTO gamification_stats (user_id) VALUES ($1) RETURNING {STATS_COLUMNS}"
        ))
        .bind(profile.id)
        .fetch_one(&mut *tx)
        .await?;
        let stats = row_to_stats(&row)?;
        tx.commit().await?;
        Ok(stats)
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StorageError> {
        let row = sqlx::query(&format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_profile).transpose()
    }

    async fn find_profile_by_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<Profile>, StorageError> {
        let row =
            sqlx::query(&format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE token_hash = $1"))
                .bind(token_hash)
                .fetch_optional(&self.pool)
                .await?;
        row.as_ref().map(row_to_profile).transpose()
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Profile, StorageError> {
        let row = sqlx::query(&format!(
            "UPDATE profiles
               SET display_name = COALESCE($2, display_name),
                   role = COALESCE($3, role)
               WHERE id = $1
               RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(id)
        .bind(update.display_name.as_deref())
        .bind(update.role.map(|r| r.as_str()))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StorageError::not_found("profile", id))?;
        row_to_profile(&row)
    }
}
