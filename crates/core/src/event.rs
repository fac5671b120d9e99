use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::artifact::ArtifactType;
use crate::gamification::{BadgeKind, Rarity, XpSource};
use crate::impact::RiskLevel;

/// Change notification pushed to a user's realtime feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum RealtimeEvent {
    XpAwarded { user_id: Uuid, source: XpSource, xp_gained: i64, total_xp: i64 },
    LevelUp { user_id: Uuid, previous_level: i32, new_level: i32 },
    MissionCompleted { user_id: Uuid, mission_id: Uuid, xp_reward: i64, coin_reward: i64 },
    BadgeEarned { user_id: Uuid, badge: BadgeKind },
    MysteryBoxGranted { user_id: Uuid, box_id: Uuid, rarity: Rarity },
    ArtifactCreated { user_id: Uuid, artifact_id: Uuid, artifact_type: ArtifactType, title: String },
    ArtifactUpdated { user_id: Uuid, artifact_id: Uuid },
    SquadActivated { user_id: Uuid, squad_id: Uuid },
    ImpactRunCompleted {
        user_id: Uuid,
        run_id: Uuid,
        artifact_id: Uuid,
        risk_level: RiskLevel,
        total_score: i64,
    },
}

impl RealtimeEvent {
    /// Owner of the event. Feeds only deliver a user's own events.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        match *self {
            Self::XpAwarded { user_id, .. }
            | Self::LevelUp { user_id, .. }
            | Self::MissionCompleted { user_id, .. }
            | Self::BadgeEarned { user_id, .. }
            | Self::MysteryBoxGranted { user_id, .. }
            | Self::ArtifactCreated { user_id, .. }
            | Self::ArtifactUpdated { user_id, .. }
            | Self::SquadActivated { user_id, .. }
            | Self::ImpactRunCompleted { user_id, .. } => user_id,
        }
    }

    /// Event name used as the SSE `event:` field.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match *self {
            Self::XpAwarded { .. } => "xp_awarded",
            Self::LevelUp { .. } => "level_up",
            Self::MissionCompleted { .. } => "mission_completed",
            Self::BadgeEarned { .. } => "badge_earned",
            Self::MysteryBoxGranted { .. } => "mystery_box_granted",
            Self::ArtifactCreated { .. } => "artifact_created",
            Self::ArtifactUpdated { .. } => "artifact_updated",
            Self::SquadActivated { .. } => "squad_activated",
            Self::ImpactRunCompleted { .. } => "impact_run_completed",
        }
    }
}
