use async_trait::async_trait;
use chrono::Utc;
use pmos_core::{Squad, SquadAgent};
use uuid::Uuid;

use super::MemoryStorage;
use crate::error::StorageError;
use crate::traits::SquadStore;
use crate::types::SquadActivation;

#[async_trait]
impl SquadStore for MemoryStorage {
    async fn create_squad(&self, squad: &Squad) -> Result<(), StorageError> {
        let mut state = self.lock().await;
        if state.squads.contains_key(&squad.id) {
            return Err(StorageError::Duplicate(format!("squad {}", squad.id)));
        }
        let mut stored = squad.clone();
        stored.is_active = false;
        stored.agents.clear();
        state.squads.insert(squad.id, stored);
        Ok(())
    }

    async fn get_squad(&self, id: Uuid) -> Result<Option<Squad>, StorageError> {
        Ok(self.lock().await.squads.get(&id).cloned())
    }

    async fn list_squads(&self, user_id: Uuid) -> Result<Vec<Squad>, StorageError> {
        let state = self.lock().await;
        let mut squads: Vec<Squad> =
            state.squads.values().filter(|s| s.user_id == user_id).cloned().collect();
        squads.sort_by_key(|s| s.created_at);
        Ok(squads)
    }

    async fn delete_squad(&self, id: Uuid) -> Result<bool, StorageError> {
        Ok(self.lock().await.squads.remove(&id).is_some())
    }

    async fn activate_squad(
        &self,
        user_id: Uuid,
        squad_id: Uuid,
    ) -> Result<SquadActivation, StorageError> {
        let mut state = self.lock().await;
        if !state.squads.get(&squad_id).is_some_and(|s| s.user_id == user_id) {
            return Ok(SquadActivation::NotFound);
        }
        let mut first_time = false;
        for squad in state.squads.values_mut().filter(|s| s.user_id == user_id) {
            squad.is_active = squad.id == squad_id;
            if squad.is_active && squad.first_activated_at.is_none() {
                squad.first_activated_at = Some(Utc::now());
                first_time = true;
            }
        }
        Ok(SquadActivation::Activated { first_time })
    }

    async fn add_squad_agent(
        &self,
        squad_id: Uuid,
        agent: &SquadAgent,
        max_size: usize,
    ) -> Result<(), StorageError> {
        let mut state = self.lock().await;
        let squad =
            state.squads.get_mut(&squad_id).ok_or_else(|| StorageError::not_found("squad", squad_id))?;
        if squad.has_agent(&agent.slug) {
            return Err(StorageError::Duplicate(format!("agent {} already in squad", agent.slug)));
        }
        if squad.agents.len() >= max_size {
            return Err(StorageError::Conflict(format!("squad already has {max_size} agents")));
        }
        squad.agents.push(agent.clone());
        Ok(())
    }

    async fn remove_squad_agent(&self, squad_id: Uuid, slug: &str) -> Result<bool, StorageError> {
        let mut state = self.lock().await;
        let Some(squad) = state.squads.get_mut(&squad_id) else {
            return Ok(false);
        };
        let before = squad.agents.len();
        squad.agents.retain(|a| a.slug != slug);
        Ok(squad.agents.len() < before)
    }

    async fn largest_squad_size(&self, user_id: Uuid) -> Result<usize, StorageError> {
        let state = self.lock().await;
        Ok(state
            .squads
            .values()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.agents.len())
            .max()
            .unwrap_or(0))
    }
}
