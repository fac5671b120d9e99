use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::{Agent, AgentFamily};
use crate::error::{CoreError, require_text};

/// A user-curated set of agents used together in chat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Squad {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    /// Set by the first activation and never cleared
    #[serde(default)]
    pub first_activated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub agents: Vec<SquadAgent>,
}

impl Squad {
    #[must_use]
    pub fn new(user_id: Uuid, name: String, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            description,
            is_active: false,
            first_activated_at: None,
            created_at: Utc::now(),
            agents: Vec::new(),
        }
    }

    #[must_use]
    pub fn has_agent(&self, slug: &str) -> bool {
        self.agents.iter().any(|a| a.slug == slug)
    }
}

/// Copy of a catalog agent frozen at the moment it joined the squad.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SquadAgent {
    pub slug: String,
    pub name: String,
    pub specialty: String,
    pub capabilities: Vec<String>,
    pub family: AgentFamily,
    pub unlock_xp: i64,
    pub added_at: DateTime<Utc>,
}

impl SquadAgent {
    #[must_use]
    pub fn from_agent(agent: &Agent) -> Self {
        Self {
            slug: agent.slug.to_owned(),
            name: agent.name.to_owned(),
            specialty: agent.specialty.to_owned(),
            capabilities: agent.capabilities.iter().map(|c| (*c).to_owned()).collect(),
            family: agent.family,
            unlock_xp: agent.unlock_xp,
            added_at: Utc::now(),
        }
    }
}

const MAX_SQUAD_NAME_CHARS: usize = 80;

/// Trim and validate a squad name.
///
/// # Errors
/// Returns `CoreError::Validation` for blank or overlong names.
pub fn validate_squad_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    require_text("name", trimmed, MAX_SQUAD_NAME_CHARS)?;
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::find_agent;

    #[test]
    fn squad_agent_copies_catalog_fields() {
        let agent = find_agent("sage").unwrap();
        let copy = SquadAgent::from_agent(agent);
        assert_eq!(copy.slug, "sage");
        assert_eq!(copy.specialty, agent.specialty);
        assert_eq!(copy.capabilities.len(), agent.capabilities.len());
        assert_eq!(copy.unlock_xp, agent.unlock_xp);
    }

    #[test]
    fn new_squads_start_inactive_and_empty() {
        let squad = Squad::new(Uuid::new_v4(), "Core".to_owned(), None);
        assert!(!squad.is_active);
        assert!(squad.agents.is_empty());
        assert!(!squad.has_agent("nova"));
    }
}
