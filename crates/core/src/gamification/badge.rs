use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

text_enum! {
    pub enum BadgeKind("badge kind") {
        FirstArtifact => "first_artifact",
        Prolific => "prolific",
        StreakWeek => "streak_week",
        LevelFive => "level_five",
        MissionMaster => "mission_master",
        SquadBuilder => "squad_builder",
    }
}

/// Counters the badge rules look at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BadgeCounters {
    pub artifacts_created: i32,
    pub longest_streak: i32,
    pub level: i32,
    pub missions_completed: i32,
    pub largest_squad: usize,
}

impl BadgeKind {
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match *self {
            Self::FirstArtifact => "First Draft",
            Self::Prolific => "Prolific",
            Self::StreakWeek => "Week Warrior",
            Self::LevelFive => "Rising Star",
            Self::MissionMaster => "Mission Master",
            Self::SquadBuilder => "Squad Builder",
        }
    }

    #[must_use]
    pub const fn is_earned(&self, c: &BadgeCounters) -> bool {
        match *self {
            Self::FirstArtifact => c.artifacts_created >= 1,
            Self::Prolific => c.artifacts_created >= 10,
            Self::StreakWeek => c.longest_streak >= 7,
            Self::LevelFive => c.level >= 5,
            Self::MissionMaster => c.missions_completed >= 10,
            Self::SquadBuilder => c.largest_squad >= 3,
        }
    }
}

/// Every badge the counters qualify for, earned before or not.
#[must_use]
pub fn earned_badges(counters: &BadgeCounters) -> Vec<BadgeKind> {
    BadgeKind::ALL.iter().copied().filter(|kind| kind.is_earned(counters)).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: BadgeKind,
    pub earned_at: DateTime<Utc>,
}

impl Badge {
    #[must_use]
    pub fn new(user_id: Uuid, kind: BadgeKind) -> Self {
        Self { id: Uuid::new_v4(), user_id, kind, earned_at: Utc::now() }
    }
}
