//! MissionStore implementation for PgStorage.

use super::*;

use crate::traits::MissionStore;
use crate::types::RewardClaim;
use async_trait::async_trait;
use pmos_core::MissionKind;

#[async_trait]
impl MissionStore for PgStorage {
    async fn insert_missions(&self, missions: &[DailyMission]) -> Result<usize, StorageError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0usize;
        for mission in missions {
            let result = sqlx::query(
                "INSERT INTO daily_missions
                   (id, user_id, mission_date, template_key, title, description, kind, target,
                    progress, xp_reward, coin_reward, completed_at)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                   ON CONFLICT (user_id, mission_date, template_key) DO NOTHING",
            )
            .bind(mission.id)
            .bind(mission.user_id)
            .bind(mission.mission_date)
            .bind(&mission.template_key)
            .bind(&mission.title)
            .bind(&mission.description)
            .bind(mission.kind.as_str())
            .bind(mission.target)
            .bind(mission.progress)
            .bind(mission.xp_reward)
            .bind(mission.coin_reward)
            .bind(mission.completed_at)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() > 0 {
                inserted += 1;
            }
        }
        tx.commit().await?;
        Ok(inserted)
    }

    async fn list_missions(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<DailyMission>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {MISSION_COLUMNS} FROM daily_missions
               WHERE user_id = $1 AND mission_date = $2
               ORDER BY template_key ASC"
        ))
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_mission).collect()
    }

    async fn bump_mission_progress(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        kind: MissionKind,
    ) -> Result<Vec<DailyMission>, StorageError> {
        let rows = sqlx::query(&format!(
            "UPDATE daily_missions SET progress = LEAST(progress + 1, target)
               WHERE user_id = $1 AND mission_date = $2 AND kind = $3
                 AND completed_at IS NULL AND progress < target
               RETURNING {MISSION_COLUMNS}"
        ))
        .bind(user_id)
        .bind(date)
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_mission).collect()
    }

    async fn complete_mission(
        &self,
        user_id: Uuid,
        mission_id: Uuid,
    ) -> Result<RewardClaim<DailyMission>, StorageError> {
        let mut tx = self.pool.begin().await?;
        // Only one transaction can flip completed_at; a concurrent one blocks
        // on the row lock and then matches nothing.
        let claimed = sqlx::query(&format!(
            "UPDATE daily_missions SET completed_at = NOW()
               WHERE id = $1 AND user_id = $2 AND completed_at IS NULL AND progress >= target
               RETURNING {MISSION_COLUMNS}"
        ))
        .bind(mission_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        if let Some(row) = claimed {
            let mission = row_to_mission(&row)?;
            let award =
                award_in_tx(&mut tx, user_id, mission.xp_reward, mission.coin_reward, 1).await?;
            tx.commit().await?;
            return Ok(RewardClaim::Awarded { item: mission, award });
        }
        tx.rollback().await?;
        let existing = sqlx::query(&format!(
            "SELECT {MISSION_COLUMNS} FROM daily_missions WHERE id = $1 AND user_id = $2"
        ))
        .bind(mission_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = existing else {
            return Ok(RewardClaim::NotFound);
        };
        let mission = row_to_mission(&row)?;
        if mission.is_completed() {
            Ok(RewardClaim::AlreadyClaimed(mission))
        } else {
            Ok(RewardClaim::NotReady(mission))
        }
    }
}
