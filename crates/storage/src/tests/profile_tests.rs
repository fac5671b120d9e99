use pmos_core::{UserRole, token_digest};
use uuid::Uuid;

use super::{create_test_storage, create_test_user};
use crate::StorageError;
use crate::traits::{GamificationStore, ProfileStore};
use crate::types::ProfileUpdate;

#[tokio::test]
async fn test_create_profile_seeds_stats() {
    let storage = create_test_storage();
    let profile = create_test_user(&storage).await;

    let stats = storage.get_stats(profile.id).await.unwrap().unwrap();
    assert_eq!(stats.xp, 0);
    assert_eq!(stats.level, 1);
    assert_eq!(stats.current_streak, 0);
}

#[tokio::test]
async fn test_find_profile_by_token() {
    let storage = create_test_storage();
    let profile = create_test_user(&storage).await;

    let token = format!("token-{}", profile.id);
    let found = storage.find_profile_by_token(&token_digest(&token)).await.unwrap();
    assert_eq!(found.map(|p| p.id), Some(profile.id));

    let missing = storage.find_profile_by_token(&token_digest("nope")).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_update_profile_partial() {
    let storage = create_test_storage();
    let profile = create_test_user(&storage).await;

    let update = ProfileUpdate { display_name: None, role: Some(UserRole::Founder) };
    let updated = storage.update_profile(profile.id, &update).await.unwrap();
    assert_eq!(updated.role, UserRole::Founder);
    assert_eq!(updated.display_name, profile.display_name);

    let err = storage.update_profile(Uuid::new_v4(), &update).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}
