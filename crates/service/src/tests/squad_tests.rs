use pmos_core::{BadgeKind, DailyMission, MAX_SQUAD_SIZE, MISSION_TEMPLATES, XpSource};
use pmos_storage::traits::MissionStore;

use super::*;
use crate::ServiceError;
use crate::gamification_service::today;

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn test_locked_agent_is_rejected() {
    let h = harness(None);
    let user = sign_up(&h).await;
    let squad = h.services.squads.create(user, "Core", None).await.unwrap();

    let err = h.services.squads.add_agent(user, squad.id, "forge").await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(ref msg) if msg.starts_with("agent locked")));

    let err = h.services.squads.add_agent(user, squad.id, "nobody").await.unwrap_err();
    assert!(err.is_not_found());

    let squad = h.services.squads.add_agent(user, squad.id, "nova").await.unwrap();
    assert_eq!(squad.agents.len(), 1);
    assert_eq!(squad.agents[0].slug, "nova");
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn test_activate_leaves_one_active_squad() {
    let h = harness(None);
    let user = sign_up(&h).await;
    let first = h.services.squads.create(user, "First", None).await.unwrap();
    let second = h.services.squads.create(user, "Second", None).await.unwrap();

    h.services.squads.activate(user, first.id).await.unwrap();
    h.services.squads.activate(user, second.id).await.unwrap();

    let active: Vec<_> = h
        .services
        .squads
        .list(user)
        .await
        .unwrap()
        .into_iter()
        .filter(|s| s.is_active)
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, second.id);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn test_squad_limits_and_badge() {
    let h = harness(None);
    let user = sign_up(&h).await;
    h.services.gamification.grant(user, XpSource::Mission, 6000, 0).await.unwrap();
    let squad = h.services.squads.create(user, "Everyone", None).await.unwrap();

    let slugs = ["nova", "atlas", "iris", "quill", "prism", "metric", "sage"];
    for slug in &slugs[..MAX_SQUAD_SIZE] {
        h.services.squads.add_agent(user, squad.id, slug).await.unwrap();
    }
    let full = h.services.squads.add_agent(user, squad.id, slugs[MAX_SQUAD_SIZE]).await;
    assert!(matches!(full, Err(ServiceError::Unprocessable(_))));

    h.services.squads.remove_agent(user, squad.id, "nova").await.unwrap();
    let duplicate = h.services.squads.add_agent(user, squad.id, "atlas").await;
    assert!(matches!(duplicate, Err(ServiceError::Unprocessable(_))));

    let badges = h.services.gamification.badges(user).await.unwrap();
    assert!(badges.iter().any(|b| b.kind == BadgeKind::SquadBuilder));
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn test_other_users_squad_is_forbidden() {
    let h = harness(None);
    let owner = sign_up(&h).await;
    let intruder = sign_up(&h).await;
    let squad = h.services.squads.create(owner, "Private", None).await.unwrap();

    let result = h.services.squads.get(intruder, squad.id).await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    let result = h.services.squads.delete(intruder, squad.id).await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn test_activation_xp_is_paid_once_per_squad() {
    let h = harness(None);
    let user = sign_up(&h).await;
    let first = h.services.squads.create(user, "First", None).await.unwrap();
    let second = h.services.squads.create(user, "Second", None).await.unwrap();

    h.services.squads.activate(user, first.id).await.unwrap();
    let after_one = h.services.gamification.stats(user).await.unwrap().xp;
    assert!(after_one >= XpSource::SquadActivated.base_xp());
    h.services.squads.activate(user, second.id).await.unwrap();
    let after_both = h.services.gamification.stats(user).await.unwrap().xp;
    assert!(after_both > after_one);

    for _ in 0..5 {
        h.services.squads.activate(user, first.id).await.unwrap();
        h.services.squads.activate(user, second.id).await.unwrap();
    }
    assert_eq!(h.services.gamification.stats(user).await.unwrap().xp, after_both);
    let squad = h.services.squads.get(user, second.id).await.unwrap();
    assert!(squad.is_active);
    assert!(squad.first_activated_at.is_some());
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn test_activation_counts_toward_squad_mission() {
    let h = harness(None);
    let user = sign_up(&h).await;
    let template = MISSION_TEMPLATES.iter().find(|t| t.key == "assemble").unwrap();
    let mission = DailyMission::from_template(user, today(), template);
    h.storage.insert_missions(std::slice::from_ref(&mission)).await.unwrap();

    let squad = h.services.squads.create(user, "Core", None).await.unwrap();
    h.services.squads.activate(user, squad.id).await.unwrap();

    let missions = h.services.missions.todays_missions(user).await.unwrap();
    let assemble = missions.iter().find(|m| m.id == mission.id).unwrap();
    assert_eq!(assemble.progress, assemble.target);
    let completion = h.services.missions.complete_mission(user, mission.id).await.unwrap();
    assert!(completion.awarded);
}
