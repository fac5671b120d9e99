use async_trait::async_trait;
use pmos_core::{GamificationStats, Profile};
use uuid::Uuid;

use crate::error::StorageError;
use crate::types::ProfileUpdate;

/// Profiles and the bearer-token digests that authenticate them.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert a profile with its token digest and a fresh stats row, atomically.
    async fn create_profile(
        &self,
        profile: &Profile,
        token_hash: &str,
    ) -> Result<GamificationStats, StorageError>;

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StorageError>;

    /// Look up the profile owning a token digest.
    async fn find_profile_by_token(&self, token_hash: &str)
    -> Result<Option<Profile>, StorageError>;

    /// Apply a partial update. `NotFound` if the profile does not exist.
    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Profile, StorageError>;
}
