use pmos_core::{BadgeKind, BoxSource, Rarity, RealtimeEvent, XpSource};

use super::*;

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn test_record_action_awards_base_xp_and_streak() {
    let mut h = harness(None);
    let user = sign_up(&h).await;

    let outcome =
        h.services.gamification.record_action(user, XpSource::ArtifactCreated).await.unwrap();
    let award = outcome.award.unwrap();
    assert_eq!(award.xp_gained, 50);
    assert_eq!(award.coins_gained, 10);
    assert!(!award.leveled_up());

    let stats = h.services.gamification.stats(user).await.unwrap();
    assert_eq!(stats.xp, 50);
    assert_eq!(stats.current_streak, 1);

    let events = drain_events(&mut h.events);
    assert!(events.iter().any(|e| matches!(
        e,
        RealtimeEvent::XpAwarded { source: XpSource::ArtifactCreated, xp_gained: 50, .. }
    )));
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn test_level_up_grants_box_per_level() {
    let mut h = harness(None);
    let user = sign_up(&h).await;

    let outcome = h.services.gamification.grant(user, XpSource::Mission, 750, 0).await.unwrap();
    let award = outcome.award.unwrap();
    assert_eq!((award.previous_level, award.new_level), (1, 3));
    assert_eq!(outcome.boxes.len(), 2);
    assert!(outcome.boxes.iter().all(|b| b.rarity == Rarity::Common));
    assert!(outcome.boxes.iter().all(|b| b.source == BoxSource::LevelUp));

    let events = drain_events(&mut h.events);
    assert!(events.iter().any(|e| matches!(
        e,
        RealtimeEvent::LevelUp { previous_level: 1, new_level: 3, .. }
    )));
    let granted =
        events.iter().filter(|e| matches!(e, RealtimeEvent::MysteryBoxGranted { .. })).count();
    assert_eq!(granted, 2);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn test_open_mystery_box_awards_once() {
    let h = harness(None);
    let user = sign_up(&h).await;
    let outcome = h.services.gamification.grant(user, XpSource::Mission, 300, 0).await.unwrap();
    let box_id = outcome.boxes[0].id;

    let first = h.services.gamification.open_mystery_box(user, box_id).await.unwrap();
    assert!(first.awarded);
    assert_eq!(first.award.unwrap().xp_gained, 25);

    let second = h.services.gamification.open_mystery_box(user, box_id).await.unwrap();
    assert!(!second.awarded);
    assert!(second.award.is_none());

    let stats = h.services.gamification.stats(user).await.unwrap();
    assert_eq!(stats.xp, 325);
}

#[tokio::test]
async fn test_open_unknown_box_is_not_found() {
    let h = harness(None);
    let user = sign_up(&h).await;
    let err = h.services.gamification.open_mystery_box(user, Uuid::new_v4()).await;
    assert!(matches!(err, Err(crate::ServiceError::NotFound(_))));
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn test_badges_are_awarded_once() {
    let h = harness(None);
    let user = sign_up(&h).await;
    h.services.gamification.grant(user, XpSource::Mission, 3000, 0).await.unwrap();

    let fresh = h.services.gamification.evaluate_badges(user).await.unwrap();
    assert_eq!(fresh, vec![BadgeKind::LevelFive]);
    let again = h.services.gamification.evaluate_badges(user).await.unwrap();
    assert!(again.is_empty());
    assert_eq!(h.services.gamification.badges(user).await.unwrap().len(), 1);
}
