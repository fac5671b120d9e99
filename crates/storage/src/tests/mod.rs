//! Test utilities and module declarations for storage tests.
//!
//! These run against the in-memory backend through `StorageBackend`, so the
//! dispatch layer is exercised as well.

mod artifact_tests;
mod gamification_tests;
mod impact_tests;
mod profile_tests;
mod squad_tests;

use chrono::NaiveDate;
use pmos_core::{
    Artifact, ArtifactContent, DailyMission, Epic, MISSION_TEMPLATES, Profile, UserRole,
    token_digest,
};
use uuid::Uuid;

use crate::StorageBackend;
use crate::traits::ProfileStore;

pub fn create_test_storage() -> StorageBackend {
    StorageBackend::new_memory()
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub async fn create_test_user(storage: &StorageBackend) -> Profile {
    let profile = Profile::new("Test PM".to_owned(), UserRole::ProductManager);
    let token = format!("token-{}", profile.id);
    storage.create_profile(&profile, &token_digest(&token)).await.unwrap();
    profile
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_artifact(user_id: Uuid, title: &str, prd_id: Option<Uuid>) -> Artifact {
    let content = ArtifactContent::Epic(Epic {
        title: title.to_owned(),
        description: "A test epic".to_owned(),
        acceptance_criteria: vec!["It works".to_owned()],
    });
    Artifact::new(user_id, title, content, None, prd_id).unwrap()
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 4, 14).unwrap()
}

/// A mission with `target` 1 already at full progress.
pub fn ready_mission(user_id: Uuid) -> DailyMission {
    let template = &MISSION_TEMPLATES[0];
    let mut mission = DailyMission::from_template(user_id, test_date(), template);
    mission.progress = mission.target;
    mission
}
