use async_trait::async_trait;
use chrono::NaiveDate;
use pmos_core::{DailyMission, MissionKind};
use uuid::Uuid;

use crate::error::StorageError;
use crate::types::RewardClaim;

#[async_trait]
pub trait MissionStore: Send + Sync {
    /// Insert missions, skipping any `(user, date, template)` already present.
    /// Returns how many were inserted.
    async fn insert_missions(&self, missions: &[DailyMission]) -> Result<usize, StorageError>;

    async fn list_missions(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<DailyMission>, StorageError>;

    /// Advance every open mission of `kind` on `date` by one, capped at target.
    /// Returns the missions that changed.
    async fn bump_mission_progress(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        kind: MissionKind,
    ) -> Result<Vec<DailyMission>, StorageError>;

    /// Mark the mission completed and grant its reward exactly once.
    async fn complete_mission(
        &self,
        user_id: Uuid,
        mission_id: Uuid,
    ) -> Result<RewardClaim<DailyMission>, StorageError>;
}
