use std::sync::Arc;

use chrono::NaiveDate;
use pmos_core::{DailyMission, MissionKind, RealtimeEvent, XpAward, XpSource, templates_for_date};
use pmos_storage::traits::MissionStore;
use pmos_storage::{RewardClaim, StorageBackend};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::ServiceError;
use crate::events::publish;
use crate::gamification_service::{GamificationService, today};

/// Response of a completion attempt. `awarded` is false on repeat claims.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionCompletion {
    pub awarded: bool,
    pub mission: DailyMission,
    pub award: Option<XpAward>,
}

pub struct MissionService {
    storage: Arc<StorageBackend>,
    gamification: Arc<GamificationService>,
    event_tx: broadcast::Sender<RealtimeEvent>,
}

impl MissionService {
    #[must_use]
    pub fn new(
        storage: Arc<StorageBackend>,
        gamification: Arc<GamificationService>,
        event_tx: broadcast::Sender<RealtimeEvent>,
    ) -> Self {
        Self { storage, gamification, event_tx }
    }

    /// The day's missions, created on first request. Safe to call repeatedly.
    pub async fn generate_daily_missions(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<DailyMission>, ServiceError> {
        let missions: Vec<DailyMission> = templates_for_date(date)
            .into_iter()
            .map(|template| DailyMission::from_template(user_id, date, template))
            .collect();
        let inserted = self.storage.insert_missions(&missions).await?;
        if inserted > 0 {
            tracing::debug!(%user_id, %date, inserted, "generated daily missions");
        }
        Ok(self.storage.list_missions(user_id, date).await?)
    }

    pub async fn todays_missions(&self, user_id: Uuid) -> Result<Vec<DailyMission>, ServiceError> {
        self.generate_daily_missions(user_id, today()).await
    }

    /// Count one action of `kind` toward today's open missions.
    pub async fn record_mission_progress(
        &self,
        user_id: Uuid,
        kind: MissionKind,
    ) -> Result<Vec<DailyMission>, ServiceError> {
        let date = today();
        self.generate_daily_missions(user_id, date).await?;
        let changed = self.storage.bump_mission_progress(user_id, date, kind).await?;
        for mission in changed.iter().filter(|m| m.is_claimable()) {
            tracing::debug!(%user_id, mission = %mission.template_key, "mission ready to claim");
        }
        Ok(changed)
    }

    /// Claim a mission's reward exactly once.
    pub async fn complete_mission(
        &self,
        user_id: Uuid,
        mission_id: Uuid,
    ) -> Result<MissionCompletion, ServiceError> {
        match self.storage.complete_mission(user_id, mission_id).await? {
            RewardClaim::Awarded { item, award } => {
                tracing::info!(%user_id, mission = %item.template_key, xp = item.xp_reward, "mission completed");
                publish(
                    &self.event_tx,
                    RealtimeEvent::MissionCompleted {
                        user_id,
                        mission_id,
                        xp_reward: item.xp_reward,
                        coin_reward: item.coin_reward,
                    },
                );
                self.gamification.after_award(user_id, XpSource::Mission, &award).await?;
                self.gamification.evaluate_badges(user_id).await?;
                Ok(MissionCompletion { awarded: true, mission: item, award: Some(award) })
            },
            RewardClaim::AlreadyClaimed(item) => {
                Ok(MissionCompletion { awarded: false, mission: item, award: None })
            },
            RewardClaim::NotReady(item) => Err(ServiceError::Unprocessable(format!(
                "mission progress {}/{} is below target",
                item.progress, item.target
            ))),
            RewardClaim::NotFound => Err(ServiceError::NotFound(format!("mission {mission_id}"))),
        }
    }
}
