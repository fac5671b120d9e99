use async_trait::async_trait;
use pmos_core::{GamificationStats, Profile};
use uuid::Uuid;

use super::MemoryStorage;
use crate::error::StorageError;
use crate::traits::ProfileStore;
use crate::types::ProfileUpdate;

#[async_trait]
impl ProfileStore for MemoryStorage {
    async fn create_profile(
        &self,
        profile: &Profile,
        token_hash: &str,
    ) -> Result<GamificationStats, StorageError> {
        let mut state = self.lock().await;
        if state.profiles.contains_key(&profile.id) {
            return Err(StorageError::Duplicate(format!("profile {}", profile.id)));
        }
        if state.tokens.contains_key(token_hash) {
            return Err(StorageError::Duplicate("token".to_owned()));
        }
        let stats = GamificationStats::new(profile.id);
        state.profiles.insert(profile.id, profile.clone());
        state.tokens.insert(token_hash.to_owned(), profile.id);
        state.stats.insert(profile.id, stats.clone());
        Ok(stats)
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StorageError> {
        Ok(self.lock().await.profiles.get(&id).cloned())
    }

    async fn find_profile_by_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<Profile>, StorageError> {
        let state = self.lock().await;
        Ok(state.tokens.get(token_hash).and_then(|id| state.profiles.get(id)).cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Profile, StorageError> {
        let mut state = self.lock().await;
        let profile =
            state.profiles.get_mut(&id).ok_or_else(|| StorageError::not_found("profile", id))?;
        if let Some(name) = &update.display_name {
            profile.display_name.clone_from(name);
        }
        if let Some(role) = update.role {
            profile.role = role;
        }
        Ok(profile.clone())
    }
}
