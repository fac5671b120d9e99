use std::sync::Arc;

use pmos_core::{Profile, ProfileView, UserRole, token_digest, validate_display_name};
use pmos_storage::traits::{GamificationStore, ProfileStore};
use pmos_storage::{ProfileUpdate, StorageBackend};
use serde::Serialize;
use uuid::Uuid;

use crate::ServiceError;

/// Sign-up response. `token` is shown once and never stored in clear.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUp {
    #[serde(flatten)]
    pub view: ProfileView,
    pub token: String,
}

pub struct ProfileService {
    storage: Arc<StorageBackend>,
}

fn new_token() -> String {
    format!("pmos_{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

impl ProfileService {
    #[must_use]
    pub fn new(storage: Arc<StorageBackend>) -> Self {
        Self { storage }
    }

    pub async fn sign_up(
        &self,
        display_name: &str,
        role: Option<UserRole>,
    ) -> Result<SignUp, ServiceError> {
        let display_name = validate_display_name(display_name)?;
        let profile = Profile::new(display_name, role.unwrap_or_default());
        let token = new_token();
        let stats = self.storage.create_profile(&profile, &token_digest(&token)).await?;
        tracing::info!(user_id = %profile.id, role = %profile.role, "profile created");
        Ok(SignUp { view: ProfileView::new(profile, stats), token })
    }

    /// Resolve a bearer token. `None` for unknown tokens.
    pub async fn authenticate(&self, token: &str) -> Result<Option<Profile>, ServiceError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(self.storage.find_profile_by_token(&token_digest(token)).await?)
    }

    pub async fn view(&self, user_id: Uuid) -> Result<ProfileView, ServiceError> {
        let profile = self
            .storage
            .get_profile(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("profile {user_id}")))?;
        let stats = self
            .storage
            .get_stats(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("stats for user {user_id}")))?;
        Ok(ProfileView::new(profile, stats))
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        display_name: Option<&str>,
        role: Option<UserRole>,
    ) -> Result<ProfileView, ServiceError> {
        let update = ProfileUpdate {
            display_name: display_name.map(validate_display_name).transpose()?,
            role,
        };
        if update != ProfileUpdate::default() {
            self.storage.update_profile(user_id, &update).await?;
        }
        self.view(user_id).await
    }
}
