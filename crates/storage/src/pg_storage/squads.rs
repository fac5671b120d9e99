//! SquadStore implementation for PgStorage.

use super::*;

use crate::traits::SquadStore;
use crate::types::SquadActivation;
use async_trait::async_trait;

impl PgStorage {
    async fn load_agents(&self, squad_ids: &[Uuid]) -> Result<Vec<(Uuid, SquadAgent)>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {SQUAD_AGENT_COLUMNS} FROM squad_agents
               WHERE squad_id = ANY($1)
               ORDER BY added_at ASC, slug ASC"
        ))
        .bind(squad_ids)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| Ok((row.try_get::<Uuid, _>("squad_id")?, row_to_squad_agent(row)?)))
            .collect()
    }

    async fn attach_agents(&self, mut squads: Vec<Squad>) -> Result<Vec<Squad>, StorageError> {
        let ids: Vec<Uuid> = squads.iter().map(|s| s.id).collect();
        for (squad_id, agent) in self.load_agents(&ids).await? {
            if let Some(squad) = squads.iter_mut().find(|s| s.id == squad_id) {
                squad.agents.push(agent);
            }
        }
        Ok(squads)
    }
}

#[async_trait]
impl SquadStore for PgStorage {
    async fn create_squad(&self, squad: &Squad) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO squads (id, user_id, name, description, is_active, created_at)
               VALUES ($1, $2, $3, $4, FALSE, $5)",
        )
        .bind(squad.id)
        .bind(squad.user_id)
        .bind(&squad.name)
        .bind(squad.description.as_deref())
        .bind(squad.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_squad(&self, id: Uuid) -> Result<Option<Squad>, StorageError> {
        let row = sqlx::query(&format!("SELECT {SQUAD_COLUMNS} FROM squads WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let squads = self.attach_agents(vec![row_to_squad(&row)?]).await?;
        Ok(squads.into_iter().next())
    }

    async fn list_squads(&self, user_id: Uuid) -> Result<Vec<Squad>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {SQUAD_COLUMNS} FROM squads WHERE user_id = $1 ORDER BY created_at ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        let squads = rows.iter().map(row_to_squad).collect::<Result<Vec<_>, _>>()?;
        self.attach_agents(squads).await
    }

    async fn delete_squad(&self, id: Uuid) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM squads WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn activate_squad(
        &self,
        user_id: Uuid,
        squad_id: Uuid,
    ) -> Result<SquadActivation, StorageError> {
        let mut tx = self.pool.begin().await?;
        // Lock every squad of the user so concurrent activations serialize.
        let owned: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM squads WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_all(&mut *tx)
                .await?;
        if !owned.contains(&squad_id) {
            tx.rollback().await?;
            return Ok(SquadActivation::NotFound);
        }
        sqlx::query("UPDATE squads SET is_active = FALSE WHERE user_id = $1 AND is_active")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        let first_time = sqlx::query(
            "UPDATE squads SET is_active = TRUE, first_activated_at = NOW()
               WHERE id = $1 AND first_activated_at IS NULL",
        )
        .bind(squad_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;
        if !first_time {
            sqlx::query("UPDATE squads SET is_active = TRUE WHERE id = $1")
                .bind(squad_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(SquadActivation::Activated { first_time })
    }

    async fn add_squad_agent(
        &self,
        squad_id: Uuid,
        agent: &SquadAgent,
        max_size: usize,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT id FROM squads WHERE id = $1 FOR UPDATE")
            .bind(squad_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StorageError::not_found("squad", squad_id))?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM squad_agents WHERE squad_id = $1")
            .bind(squad_id)
            .fetch_one(&mut *tx)
            .await?;
        if i64_to_usize(count) >= max_size {
            tx.rollback().await?;
            return Err(StorageError::Conflict(format!("squad already has {max_size} agents")));
        }
        sqlx::query(
            "INSERT INTO squad_agents
               (squad_id, slug, name, specialty, capabilities, family, unlock_xp, added_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(squad_id)
        .bind(&agent.slug)
        .bind(&agent.name)
        .bind(&agent.specialty)
        .bind(serde_json::to_value(&agent.capabilities)?)
        .bind(agent.family.as_str())
        .bind(agent.unlock_xp)
        .bind(agent.added_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn remove_squad_agent(&self, squad_id: Uuid, slug: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM squad_agents WHERE squad_id = $1 AND slug = $2")
            .bind(squad_id)
            .bind(slug)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn largest_squad_size(&self, user_id: Uuid) -> Result<usize, StorageError> {
        let size: Option<i64> = sqlx::query_scalar(
            "SELECT MAX(n) FROM (
                 SELECT COUNT(a.slug) AS n
                   FROM squads s LEFT JOIN squad_agents a ON a.squad_id = s.id
                   WHERE s.user_id = $1
                   GROUP BY s.id
             ) sizes",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(size.map_or(0, i64_to_usize))
    }
}
