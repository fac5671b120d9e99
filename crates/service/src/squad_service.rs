use std::sync::Arc;

use pmos_core::{
    MAX_SQUAD_SIZE, MissionKind, RealtimeEvent, Squad, SquadAgent, XpSource, find_agent,
    validate_squad_name,
};
use pmos_storage::traits::SquadStore;
use pmos_storage::{SquadActivation, StorageBackend, StorageError};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::ensure_owner;
use crate::events::publish;
use crate::gamification_service::GamificationService;
use crate::mission_service::MissionService;
use crate::ServiceError;

pub struct SquadService {
    storage: Arc<StorageBackend>,
    gamification: Arc<GamificationService>,
    missions: Arc<MissionService>,
    event_tx: broadcast::Sender<RealtimeEvent>,
}

impl SquadService {
    #[must_use]
    pub fn new(
        storage: Arc<StorageBackend>,
        gamification: Arc<GamificationService>,
        missions: Arc<MissionService>,
        event_tx: broadcast::Sender<RealtimeEvent>,
    ) -> Self {
        Self { storage, gamification, missions, event_tx }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        name: &str,
        description: Option<String>,
    ) -> Result<Squad, ServiceError> {
        let name = validate_squad_name(name)?;
        let description = description.map(|d| d.trim().to_owned()).filter(|d| !d.is_empty());
        let squad = Squad::new(user_id, name, description);
        self.storage.create_squad(&squad).await?;
        tracing::debug!(%user_id, squad_id = %squad.id, "squad created");
        Ok(squad)
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Squad>, ServiceError> {
        Ok(self.storage.list_squads(user_id).await?)
    }

    pub async fn get(&self, user_id: Uuid, squad_id: Uuid) -> Result<Squad, ServiceError> {
        let squad = self
            .storage
            .get_squad(squad_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("squad {squad_id}")))?;
        ensure_owner(squad.user_id, user_id, "squad")?;
        Ok(squad)
    }

    pub async fn delete(&self, user_id: Uuid, squad_id: Uuid) -> Result<(), ServiceError> {
        self.get(user_id, squad_id).await?;
        self.storage.delete_squad(squad_id).await?;
        Ok(())
    }

    /// Make this the user's only active squad. XP is granted only the first
    /// time a given squad is activated.
    pub async fn activate(&self, user_id: Uuid, squad_id: Uuid) -> Result<Squad, ServiceError> {
        let squad = self.get(user_id, squad_id).await?;
        if squad.is_active {
            return Ok(squad);
        }
        let first_time = match self.storage.activate_squad(user_id, squad_id).await? {
            SquadActivation::Activated { first_time } => first_time,
            SquadActivation::NotFound => {
                return Err(ServiceError::NotFound(format!("squad {squad_id}")));
            },
        };
        publish(&self.event_tx, RealtimeEvent::SquadActivated { user_id, squad_id });
        if first_time {
            self.gamification.record_action(user_id, XpSource::SquadActivated).await?;
        }
        self.missions.record_mission_progress(user_id, MissionKind::BuildSquad).await?;
        tracing::debug!(%user_id, %squad_id, first_time, "squad activated");
        self.get(user_id, squad_id).await
    }

    /// Copy a catalog agent into the squad.
    pub async fn add_agent(
        &self,
        user_id: Uuid,
        squad_id: Uuid,
        slug: &str,
    ) -> Result<Squad, ServiceError> {
        let agent =
            find_agent(slug).ok_or_else(|| ServiceError::NotFound(format!("agent {slug}")))?;
        self.get(user_id, squad_id).await?;
        let stats = self.gamification.stats(user_id).await?;
        if !agent.is_unlocked(stats.xp) {
            return Err(ServiceError::Forbidden(format!(
                "agent locked: {} unlocks at {} XP",
                agent.name, agent.unlock_xp
            )));
        }

        match self
            .storage
            .add_squad_agent(squad_id, &SquadAgent::from_agent(agent), MAX_SQUAD_SIZE)
            .await
        {
            Ok(()) => {},
            Err(StorageError::Duplicate(_)) => {
                return Err(ServiceError::Unprocessable(format!(
                    "{} is already in this squad",
                    agent.name
                )));
            },
            Err(StorageError::Conflict(_)) => {
                return Err(ServiceError::Unprocessable(format!(
                    "squad is full ({MAX_SQUAD_SIZE} agents max)"
                )));
            },
            Err(e) => return Err(e.into()),
        }

        self.missions.record_mission_progress(user_id, MissionKind::BuildSquad).await?;
        self.gamification.evaluate_badges(user_id).await?;
        self.get(user_id, squad_id).await
    }

    pub async fn remove_agent(
        &self,
        user_id: Uuid,
        squad_id: Uuid,
        slug: &str,
    ) -> Result<Squad, ServiceError> {
        self.get(user_id, squad_id).await?;
        if !self.storage.remove_squad_agent(squad_id, &slug.trim().to_ascii_lowercase()).await? {
            return Err(ServiceError::NotFound(format!("agent {slug} in squad {squad_id}")));
        }
        self.get(user_id, squad_id).await
    }
}
