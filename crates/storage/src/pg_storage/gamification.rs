//! GamificationStore implementation for PgStorage.

use super::*;

use crate::traits::GamificationStore;
use crate::types::RewardClaim;
use async_trait::async_trait;
use pmos_core::{StreakUpdate, XpAward};

#[async_trait]
impl GamificationStore for PgStorage {
    async fn get_stats(&self, user_id: Uuid) -> Result<Option<GamificationStats>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {STATS_COLUMNS} FROM gamification_stats WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_stats).transpose()
    }

    async fn award_xp(&self, user_id: Uuid, xp: i64, coins: i64) -> Result<XpAward, StorageError> {
        let mut tx = self.pool.begin().await?;
        let award = award_in_tx(&mut tx, user_id, xp, coins, 0).await?;
        tx.commit().await?;
        Ok(award)
    }

    async fn record_activity(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<StreakUpdate, StorageError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(&format!(
            "SELECT {STATS_COLUMNS} FROM gamification_stats WHERE user_id = $1 FOR UPDATE"
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StorageError::not_found("gamification_stats", user_id))?;
        let mut stats = row_to_stats(&row)?;
        let update = stats.record_activity(today);
        sqlx::query(
            "UPDATE gamification_stats
               SET current_streak = $2, longest_streak = $3, last_active_on = $4
               WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(stats.current_streak)
        .bind(stats.longest_streak)
        .bind(stats.last_active_on)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(update)
    }

    async fn increment_artifacts_created(&self, user_id: Uuid) -> Result<i32, StorageError> {
        let count: Option<i32> = sqlx::query_scalar(
            "UPDATE gamification_stats SET artifacts_created = artifacts_created + 1
               WHERE user_id = $1
               RETURNING artifacts_created",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        count.ok_or_else(|| StorageError::not_found("gamification_stats", user_id))
    }

    async fn list_badges(&self, user_id: Uuid) -> Result<Vec<Badge>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {BADGE_COLUMNS} FROM badges WHERE user_id = $1 ORDER BY earned_at ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_badge).collect()
    }

    async fn award_badge(&self, badge: &Badge) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "INSERT INTO badges (id, user_id, kind, earned_at) VALUES ($1, $2, $3, $4)
               ON CONFLICT (user_id, kind) DO NOTHING",
        )
        .bind(badge.id)
        .bind(badge.user_id)
        .bind(badge.kind.as_str())
        .bind(badge.earned_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_mystery_box(&self, mystery_box: &MysteryBox) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO mystery_boxes
               (id, user_id, rarity, reward_xp, reward_coins, source, created_at, opened_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(mystery_box.id)
        .bind(mystery_box.user_id)
        .bind(mystery_box.rarity.as_str())
        .bind(mystery_box.reward_xp)
        .bind(mystery_box.reward_coins)
        .bind(mystery_box.source.as_str())
        .bind(mystery_box.created_at)
        .bind(mystery_box.opened_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_mystery_boxes(&self, user_id: Uuid) -> Result<Vec<MysteryBox>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {BOX_COLUMNS} FROM mystery_boxes WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_box).collect()
    }

    async fn open_mystery_box(
        &self,
        user_id: Uuid,
        box_id: Uuid,
    ) -> Result<RewardClaim<MysteryBox>, StorageError> {
        let mut tx = self.pool.begin().await?;
        let claimed = sqlx::query(&format!(
            "UPDATE mystery_boxes SET opened_at = NOW()
               WHERE id = $1 AND user_id = $2 AND opened_at IS NULL
               RETURNING {BOX_COLUMNS}"
        ))
        .bind(box_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        if let Some(row) = claimed {
            let opened = row_to_box(&row)?;
            let award =
                award_in_tx(&mut tx, user_id, opened.reward_xp, opened.reward_coins, 0).await?;
            tx.commit().await?;
            return Ok(RewardClaim::Awarded { item: opened, award });
        }
        tx.rollback().await?;
        let existing = sqlx::query(&format!(
            "SELECT {BOX_COLUMNS} FROM mystery_boxes WHERE id = $1 AND user_id = $2"
        ))
        .bind(box_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        match existing {
            Some(row) => Ok(RewardClaim::AlreadyClaimed(row_to_box(&row)?)),
            None => Ok(RewardClaim::NotFound),
        }
    }
}
