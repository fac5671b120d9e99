use async_trait::async_trait;
use chrono::NaiveDate;
use pmos_core::{Badge, GamificationStats, MysteryBox, StreakUpdate, XpAward};
use uuid::Uuid;

use crate::error::StorageError;
use crate::types::RewardClaim;

/// XP, streaks, badges and mystery boxes.
///
/// Every method that changes `xp` recomputes `level` in the same atomic step.
#[async_trait]
pub trait GamificationStore: Send + Sync {
    async fn get_stats(&self, user_id: Uuid) -> Result<Option<GamificationStats>, StorageError>;

    /// Atomically add xp and coins and recompute the level.
    async fn award_xp(&self, user_id: Uuid, xp: i64, coins: i64) -> Result<XpAward, StorageError>;

    /// Update the streak for activity on `today`.
    async fn record_activity(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<StreakUpdate, StorageError>;

    /// Returns the new `artifacts_created` count.
    async fn increment_artifacts_created(&self, user_id: Uuid) -> Result<i32, StorageError>;

    async fn list_badges(&self, user_id: Uuid) -> Result<Vec<Badge>, StorageError>;

    /// Insert unless the user already holds this badge kind. Returns `true` if new.
    async fn award_badge(&self, badge: &Badge) -> Result<bool, StorageError>;

    async fn create_mystery_box(&self, mystery_box: &MysteryBox) -> Result<(), StorageError>;

    async fn list_mystery_boxes(&self, user_id: Uuid) -> Result<Vec<MysteryBox>, StorageError>;

    /// Open a box and grant its rewards exactly once.
    async fn open_mystery_box(
        &self,
        user_id: Uuid,
        box_id: Uuid,
    ) -> Result<RewardClaim<MysteryBox>, StorageError>;
}
