use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::DAILY_MISSION_COUNT;

text_enum! {
    /// Activity a mission counts.
    pub enum MissionKind("mission kind") {
        CreateArtifact => "create_artifact",
        ChatWithAgent => "chat_with_agent",
        RunImpactAnalysis => "run_impact_analysis",
        GenerateStories => "generate_stories",
        BuildSquad => "build_squad",
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MissionTemplate {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub kind: MissionKind,
    pub target: i32,
    pub xp_reward: i64,
    pub coin_reward: i64,
}

pub static MISSION_TEMPLATES: &[MissionTemplate] = &[
    MissionTemplate {
        key: "draft_artifact",
        title: "Put it on paper",
        description: "Save one artifact.",
        kind: MissionKind::CreateArtifact,
        target: 1,
        xp_reward: 40,
        coin_reward: 15,
    },
    MissionTemplate {
        key: "chat_three",
        title: "Pick their brains",
        description: "Send three messages to your agents.",
        kind: MissionKind::ChatWithAgent,
        target: 3,
        xp_reward: 30,
        coin_reward: 10,
    },
    MissionTemplate {
        key: "impact_check",
        title: "Mind the ripple",
        description: "Run an impact analysis on a changed document.",
        kind: MissionKind::RunImpactAnalysis,
        target: 1,
        xp_reward: 60,
        coin_reward: 20,
    },
    MissionTemplate {
        key: "story_time",
        title: "Story time",
        description: "Generate user stories from an epic.",
        kind: MissionKind::GenerateStories,
        target: 1,
        xp_reward: 50,
        coin_reward: 15,
    },
    MissionTemplate {
        key: "assemble",
        title: "Assemble the squad",
        description: "Activate a squad or add an agent to one.",
        kind: MissionKind::BuildSquad,
        target: 1,
        xp_reward: 25,
        coin_reward: 10,
    },
    MissionTemplate {
        key: "artifact_trio",
        title: "Prolific planner",
        description: "Save three artifacts in one day.",
        kind: MissionKind::CreateArtifact,
        target: 3,
        xp_reward: 90,
        coin_reward: 35,
    },
    MissionTemplate {
        key: "deep_dive",
        title: "Deep dive",
        description: "Send ten messages to your agents.",
        kind: MissionKind::ChatWithAgent,
        target: 10,
        xp_reward: 80,
        coin_reward: 30,
    },
];

/// Templates offered on `date`.
///
/// A window of consecutive templates, starting at an offset derived from the
/// date's day number, so every user sees the same set on the same day.
#[must_use]
pub fn templates_for_date(date: NaiveDate) -> Vec<&'static MissionTemplate> {
    let len = MISSION_TEMPLATES.len();
    let start = usize::try_from(date.num_days_from_ce()).unwrap_or(0) % len;
    (0..DAILY_MISSION_COUNT.min(len)).map(|i| &MISSION_TEMPLATES[(start + i) % len]).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyMission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mission_date: NaiveDate,
    pub template_key: String,
    pub title: String,
    pub description: String,
    pub kind: MissionKind,
    pub target: i32,
    pub progress: i32,
    pub xp_reward: i64,
    pub coin_reward: i64,
    pub completed_at: Option<DateTime<Utc>>,
}

impl DailyMission {
    #[must_use]
    pub fn from_template(user_id: Uuid, mission_date: NaiveDate, template: &MissionTemplate) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            mission_date,
            template_key: template.key.to_owned(),
            title: template.title.to_owned(),
            description: template.description.to_owned(),
            kind: template.kind,
            target: template.target,
            progress: 0,
            xp_reward: template.xp_reward,
            coin_reward: template.coin_reward,
            completed_at: None,
        }
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Progress has reached the target and the reward has not been claimed.
    #[must_use]
    pub const fn is_claimable(&self) -> bool {
        self.completed_at.is_none() && self.progress >= self.target
    }

    /// Advance progress by one, capped at the target.
    pub fn bump(&mut self) -> bool {
        if self.is_completed() || self.progress >= self.target {
            return false;
        }
        self.progress += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn template_keys_are_unique() {
        let keys: HashSet<_> = MISSION_TEMPLATES.iter().map(|t| t.key).collect();
        assert_eq!(keys.len(), MISSION_TEMPLATES.len());
        assert!(MISSION_TEMPLATES.iter().all(|t| t.target > 0 && t.xp_reward > 0));
    }

    #[test]
    fn daily_selection_is_deterministic_and_rotates() {
        let monday = NaiveDate::from_ymd_opt(2026, 5, 4).unwrap();
        let tuesday = monday.succ_opt().unwrap();
        let a: Vec<_> = templates_for_date(monday).iter().map(|t| t.key).collect();
        let b: Vec<_> = templates_for_date(monday).iter().map(|t| t.key).collect();
        let c: Vec<_> = templates_for_date(tuesday).iter().map(|t| t.key).collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), DAILY_MISSION_COUNT);
        assert_ne!(a, c);
        assert_eq!(a.iter().collect::<HashSet<_>>().len(), DAILY_MISSION_COUNT);
    }

    #[test]
    fn progress_caps_at_target() {
        let template = MISSION_TEMPLATES.iter().find(|t| t.target == 3).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 5, 4).unwrap();
        let mut mission = DailyMission::from_template(Uuid::new_v4(), today, template);
        assert!(!mission.is_claimable());
        for _ in 0..5 {
            mission.bump();
        }
        assert_eq!(mission.progress, 3);
        assert!(mission.is_claimable());
        mission.completed_at = Some(Utc::now());
        assert!(!mission.is_claimable());
        assert!(!mission.bump());
    }
}
