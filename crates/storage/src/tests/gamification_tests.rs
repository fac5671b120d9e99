use std::sync::Arc;

use pmos_core::{Badge, BadgeKind, BoxSource, MysteryBox, Rarity};

use super::{create_test_storage, create_test_user, test_date};
use crate::traits::GamificationStore;
use crate::types::RewardClaim;

#[tokio::test]
async fn test_award_xp_recomputes_level() {
    let storage = create_test_storage();
    let user = create_test_user(&storage).await;

    let first = storage.award_xp(user.id, 250, 5).await.unwrap();
    assert_eq!(first.new_level, 1);
    let second = storage.award_xp(user.id, 50, 5).await.unwrap();
    assert_eq!((second.previous_level, second.new_level), (1, 2));

    let stats = storage.get_stats(user.id).await.unwrap().unwrap();
    assert_eq!((stats.xp, stats.level, stats.coins), (300, 2, 10));
}

#[tokio::test]
async fn test_record_activity_builds_streak() {
    let storage = create_test_storage();
    let user = create_test_user(&storage).await;
    let day = test_date();

    storage.record_activity(user.id, day).await.unwrap();
    storage.record_activity(user.id, day.succ_opt().unwrap()).await.unwrap();
    let update = storage
        .record_activity(user.id, day.succ_opt().unwrap().succ_opt().unwrap())
        .await
        .unwrap();
    assert_eq!(update.current_streak, 3);
    assert_eq!(update.milestone, Some(Rarity::Common));
}

#[tokio::test]
async fn test_award_badge_is_idempotent() {
    let storage = create_test_storage();
    let user = create_test_user(&storage).await;

    assert!(storage.award_badge(&Badge::new(user.id, BadgeKind::FirstArtifact)).await.unwrap());
    assert!(!storage.award_badge(&Badge::new(user.id, BadgeKind::FirstArtifact)).await.unwrap());
    assert_eq!(storage.list_badges(user.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_open_mystery_box_once() {
    let storage = create_test_storage();
    let user = create_test_user(&storage).await;
    let mystery_box = MysteryBox::new(user.id, Rarity::Rare, BoxSource::StreakMilestone);
    storage.create_mystery_box(&mystery_box).await.unwrap();

    let first = storage.open_mystery_box(user.id, mystery_box.id).await.unwrap();
    let RewardClaim::Awarded { award, .. } = first else {
        panic!("first open should award, got {first:?}");
    };
    assert_eq!(award.xp_gained, 75);

    let second = storage.open_mystery_box(user.id, mystery_box.id).await.unwrap();
    assert!(matches!(second, RewardClaim::AlreadyClaimed(_)));

    let stats = storage.get_stats(user.id).await.unwrap().unwrap();
    assert_eq!((stats.xp, stats.coins), (75, 40));
}

#[tokio::test]
async fn test_open_someone_elses_box_is_not_found() {
    let storage = create_test_storage();
    let owner = create_test_user(&storage).await;
    let thief = create_test_user(&storage).await;
    let mystery_box = MysteryBox::new(owner.id, Rarity::Common, BoxSource::LevelUp);
    storage.create_mystery_box(&mystery_box).await.unwrap();

    let claim = storage.open_mystery_box(thief.id, mystery_box.id).await.unwrap();
    assert_eq!(claim, RewardClaim::NotFound);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_box_opens_award_once() {
    let storage = Arc::new(create_test_storage());
    let user = create_test_user(&storage).await;
    let mystery_box = MysteryBox::new(user.id, Rarity::Legendary, BoxSource::StreakMilestone);
    storage.create_mystery_box(&mystery_box).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let storage = Arc::clone(&storage);
            tokio::spawn(async move { storage.open_mystery_box(user.id, mystery_box.id).await })
        })
        .collect();
    let mut awarded = 0;
    for handle in handles {
        if matches!(handle.await.unwrap().unwrap(), RewardClaim::Awarded { .. }) {
            awarded += 1;
        }
    }
    assert_eq!(awarded, 1);
    assert_eq!(storage.get_stats(user.id).await.unwrap().unwrap().xp, 250);
}
