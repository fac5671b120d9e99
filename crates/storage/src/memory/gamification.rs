use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use pmos_core::{Badge, GamificationStats, MysteryBox, StreakUpdate, XpAward};
use uuid::Uuid;

use super::MemoryStorage;
use crate::error::StorageError;
use crate::traits::GamificationStore;
use crate::types::RewardClaim;

#[async_trait]
impl GamificationStore for MemoryStorage {
    async fn get_stats(&self, user_id: Uuid) -> Result<Option<GamificationStats>, StorageError> {
        Ok(self.lock().await.stats.get(&user_id).cloned())
    }

    async fn award_xp(&self, user_id: Uuid, xp: i64, coins: i64) -> Result<XpAward, StorageError> {
        self.lock().await.award(user_id, xp, coins)
    }

    async fn record_activity(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<StreakUpdate, StorageError> {
        let mut state = self.lock().await;
        Ok(state.stats_mut(user_id)?.record_activity(today))
    }

    async fn increment_artifacts_created(&self, user_id: Uuid) -> Result<i32, StorageError> {
        let mut state = self.lock().await;
        let stats = state.stats_mut(user_id)?;
        stats.artifacts_created += 1;
        Ok(stats.artifacts_created)
    }

    async fn list_badges(&self, user_id: Uuid) -> Result<Vec<Badge>, StorageError> {
        let state = self.lock().await;
        let mut badges: Vec<Badge> =
            state.badges.iter().filter(|b| b.user_id == user_id).cloned().collect();
        badges.sort_by_key(|b| b.earned_at);
        Ok(badges)
    }

    async fn award_badge(&self, badge: &Badge) -> Result<bool, StorageError> {
        let mut state = self.lock().await;
        if state.badges.iter().any(|b| b.user_id == badge.user_id && b.kind == badge.kind) {
            return Ok(false);
        }
        state.badges.push(badge.clone());
        Ok(true)
    }

    async fn create_mystery_box(&self, mystery_box: &MysteryBox) -> Result<(), StorageError> {
        self.lock().await.boxes.insert(mystery_box.id, mystery_box.clone());
        Ok(())
    }

    async fn list_mystery_boxes(&self, user_id: Uuid) -> Result<Vec<MysteryBox>, StorageError> {
        let state = self.lock().await;
        let mut boxes: Vec<MysteryBox> =
            state.boxes.values().filter(|b| b.user_id == user_id).cloned().collect();
        boxes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(boxes)
    }

    async fn open_mystery_box(
        &self,
        user_id: Uuid,
        box_id: Uuid,
    ) -> Result<RewardClaim<MysteryBox>, StorageError> {
        let mut state = self.lock().await;
        let Some(mystery_box) = state.boxes.get_mut(&box_id).filter(|b| b.user_id == user_id) else {
            return Ok(RewardClaim::NotFound);
        };
        if mystery_box.is_opened() {
            return Ok(RewardClaim::AlreadyClaimed(mystery_box.clone()));
        }
        mystery_box.opened_at = Some(Utc::now());
        let opened = mystery_box.clone();
        let award = state.award(user_id, opened.reward_xp, opened.reward_coins)?;
        Ok(RewardClaim::Awarded { item: opened, award })
    }
}
