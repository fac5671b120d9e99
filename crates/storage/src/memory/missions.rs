use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use pmos_core::{DailyMission, MissionKind};
use uuid::Uuid;

use super::MemoryStorage;
use crate::error::StorageError;
use crate::traits::MissionStore;
use crate::types::RewardClaim;

#[async_trait]
impl MissionStore for MemoryStorage {
    async fn insert_missions(&self, missions: &[DailyMission]) -> Result<usize, StorageError> {
        let mut state = self.lock().await;
        let mut inserted = 0usize;
        for mission in missions {
            let exists = state.missions.values().any(|m| {
                m.user_id == mission.user_id
                    && m.mission_date == mission.mission_date
                    && m.template_key == mission.template_key
            });
            if !exists {
                state.missions.insert(mission.id, mission.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn list_missions(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<DailyMission>, StorageError> {
        let state = self.lock().await;
        let mut missions: Vec<DailyMission> = state
            .missions
            .values()
            .filter(|m| m.user_id == user_id && m.mission_date == date)
            .cloned()
            .collect();
        missions.sort_by(|a, b| a.template_key.cmp(&b.template_key));
        Ok(missions)
    }

    async fn bump_mission_progress(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        kind: MissionKind,
    ) -> Result<Vec<DailyMission>, StorageError> {
        let mut state = self.lock().await;
        let mut changed = Vec::new();
        for mission in state
            .missions
            .values_mut()
            .filter(|m| m.user_id == user_id && m.mission_date == date && m.kind == kind)
        {
            if mission.bump() {
                changed.push(mission.clone());
            }
        }
        Ok(changed)
    }

    async fn complete_mission(
        &self,
        user_id: Uuid,
        mission_id: Uuid,
    ) -> Result<RewardClaim<DailyMission>, StorageError> {
        let mut state = self.lock().await;
        let Some(mission) = state.missions.get_mut(&mission_id).filter(|m| m.user_id == user_id)
        else {
            return Ok(RewardClaim::NotFound);
        };
        if mission.is_completed() {
            return Ok(RewardClaim::AlreadyClaimed(mission.clone()));
        }
        if !mission.is_claimable() {
            return Ok(RewardClaim::NotReady(mission.clone()));
        }
        mission.completed_at = Some(Utc::now());
        let completed = mission.clone();
        let award = state.award(user_id, completed.xp_reward, completed.coin_reward)?;
        state.stats_mut(user_id)?.missions_completed += 1;
        Ok(RewardClaim::Awarded { item: completed, award })
    }
}
