use async_trait::async_trait;
use pmos_core::{Squad, SquadAgent};
use uuid::Uuid;

use crate::error::StorageError;
use crate::types::SquadActivation;

/// Squads and their denormalized agent copies.
#[async_trait]
pub trait SquadStore: Send + Sync {
    async fn create_squad(&self, squad: &Squad) -> Result<(), StorageError>;

    /// Squad with its agents, oldest agent first.
    async fn get_squad(&self, id: Uuid) -> Result<Option<Squad>, StorageError>;

    async fn list_squads(&self, user_id: Uuid) -> Result<Vec<Squad>, StorageError>;

    /// Returns `true` if a row was deleted.
    async fn delete_squad(&self, id: Uuid) -> Result<bool, StorageError>;

    /// Make `squad_id` the user's only active squad, in one transaction.
    /// `NotFound` if the user owns no such squad.
    async fn activate_squad(
        &self,
        user_id: Uuid,
        squad_id: Uuid,
    ) -> Result<SquadActivation, StorageError>;

    /// Add an agent copy. `Duplicate` if the slug is already present,
    /// `Conflict` if the squad already holds `max_size` agents.
    async fn add_squad_agent(
        &self,
        squad_id: Uuid,
        agent: &SquadAgent,
        max_size: usize,
    ) -> Result<(), StorageError>;

    /// Returns `true` if the agent was in the squad.
    async fn remove_squad_agent(&self, squad_id: Uuid, slug: &str) -> Result<bool, StorageError>;

    /// Agent count of the user's biggest squad.
    async fn largest_squad_size(&self, user_id: Uuid) -> Result<usize, StorageError>;
}
