//! LLM-backed functions: agent chat and structured document generation.
//!
//! Every call requires a configured gateway. Successful generations are
//! rewarded like any other action; saving the result as an artifact is
//! optional and goes through [`ArtifactService`] so it earns the usual
//! artifact rewards too.

use std::sync::Arc;

use pmos_core::{
    Agent, ArtifactContent, DEFAULT_ROADMAP_QUARTERS, DEFAULT_STORY_COUNT, Epic, LeanCanvas,
    MAX_ROADMAP_QUARTERS, MAX_STORY_COUNT, MissionKind, Prd, Roadmap, Squad,
    StorySet, UserStory, XpSource, find_agent,
};
use pmos_llm::{ChatRole, ChatTurn, LlmClient, PrdBrief};
use serde::Serialize;
use uuid::Uuid;

use crate::ServiceError;
use crate::artifact_service::{ArtifactService, NewArtifact};
use crate::gamification_service::GamificationService;
use crate::mission_service::MissionService;
use crate::squad_service::SquadService;

const MAX_TURN_CHARS: usize = 8_000;

/// A generated value and the artifact it was saved as, if requested.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Generated<T> {
    pub value: T,
    pub artifact_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentChatReply {
    pub reply: String,
    pub agent: &'static Agent,
}

pub struct GenerationService {
    llm: Option<Arc<LlmClient>>,
    artifacts: Arc<ArtifactService>,
    squads: Arc<SquadService>,
    gamification: Arc<GamificationService>,
    missions: Arc<MissionService>,
}

impl GenerationService {
    #[must_use]
    pub fn new(
        llm: Option<Arc<LlmClient>>,
        artifacts: Arc<ArtifactService>,
        squads: Arc<SquadService>,
        gamification: Arc<GamificationService>,
        missions: Arc<MissionService>,
    ) -> Self {
        Self { llm, artifacts, squads, gamification, missions }
    }

    fn llm(&self) -> Result<&LlmClient, ServiceError> {
        self.llm
            .as_deref()
            .ok_or_else(|| ServiceError::NotConfigured("LLM gateway (set PMOS_LLM_API_KEY)".into()))
    }

    /// Reply in the voice of `agent_slug`. The agent must be unlocked and the
    /// squad, when given, must belong to the caller.
    pub async fn agent_chat(
        &self,
        user_id: Uuid,
        agent_slug: &str,
        messages: &[ChatTurn],
        squad_id: Option<Uuid>,
    ) -> Result<AgentChatReply, ServiceError> {
        validate_history(messages)?;
        let llm = self.llm()?;
        let agent = find_agent(agent_slug)
            .ok_or_else(|| ServiceError::NotFound(format!("agent {agent_slug}")))?;
        let stats = self.gamification.stats(user_id).await?;
        if !agent.is_unlocked(stats.xp) {
            return Err(ServiceError::Forbidden(format!(
                "agent locked: {} unlocks at {} XP",
                agent.name, agent.unlock_xp
            )));
        }
        let squad: Option<Squad> = match squad_id {
            Some(id) => Some(self.squads.get(user_id, id).await?),
            None => None,
        };

        let reply = llm.agent_reply(agent, squad.as_ref(), messages).await?;
        tracing::debug!(%user_id, agent = agent.slug, turns = messages.len(), "agent replied");

        self.gamification.record_action(user_id, XpSource::ChatMessage).await?;
        self.missions.record_mission_progress(user_id, MissionKind::ChatWithAgent).await?;
        Ok(AgentChatReply { reply, agent })
    }

    /// Split `epic` into `count` stories (default 5, at most 20).
    pub async fn stories(
        &self,
        user_id: Uuid,
        epic: &Epic,
        count: Option<usize>,
        persona: Option<&str>,
        save: bool,
    ) -> Result<Generated<Vec<UserStory>>, ServiceError> {
        let count = count.unwrap_or(DEFAULT_STORY_COUNT);
        if !(1..=MAX_STORY_COUNT).contains(&count) {
            return Err(ServiceError::InvalidInput(format!(
                "storyCount must be between 1 and {MAX_STORY_COUNT}"
            )));
        }
        epic.validate()?;
        let stories = self.llm()?.generate_stories(epic, count, persona).await?;

        self.gamification.record_action(user_id, XpSource::StoriesGenerated).await?;
        self.missions.record_mission_progress(user_id, MissionKind::GenerateStories).await?;

        let artifact_id = if save {
            let content = ArtifactContent::Stories(StorySet {
                epic_title: epic.title.clone(),
                stories: stories.clone(),
            });
            Some(self.save(user_id, format!("Stories: {}", epic.title), content).await?)
        } else {
            None
        };
        Ok(Generated { value: stories, artifact_id })
    }

    pub async fn prd(
        &self,
        user_id: Uuid,
        brief: &PrdBrief,
        save: bool,
    ) -> Result<Generated<Prd>, ServiceError> {
        require_field("productName", &brief.product_name)?;
        require_field("problem", &brief.problem)?;
        let prd = self.llm()?.generate_prd(brief).await?;
        let artifact_id = if save {
            let title = format!("{} PRD", prd.product_name);
            Some(self.save(user_id, title, ArtifactContent::Prd(prd.clone())).await?)
        } else {
            None
        };
        Ok(Generated { value: prd, artifact_id })
    }

    pub async fn roadmap(
        &self,
        user_id: Uuid,
        product_name: &str,
        goals: &[String],
        quarters: Option<usize>,
        save: bool,
    ) -> Result<Generated<Roadmap>, ServiceError> {
        require_field("productName", product_name)?;
        if goals.iter().all(|g| g.trim().is_empty()) {
            return Err(ServiceError::InvalidInput("goals must not be empty".into()));
        }
        let quarters = quarters.unwrap_or(DEFAULT_ROADMAP_QUARTERS);
        if !(1..=MAX_ROADMAP_QUARTERS).contains(&quarters) {
            return Err(ServiceError::InvalidInput(format!(
                "horizonQuarters must be between 1 and {MAX_ROADMAP_QUARTERS}"
            )));
        }
        let roadmap = self.llm()?.generate_roadmap(product_name.trim(), goals, quarters).await?;
        let artifact_id = if save {
            let title = format!("{} roadmap", roadmap.product_name);
            Some(self.save(user_id, title, ArtifactContent::Roadmap(roadmap.clone())).await?)
        } else {
            None
        };
        Ok(Generated { value: roadmap, artifact_id })
    }

    pub async fn canvas(
        &self,
        user_id: Uuid,
        product_name: &str,
        idea: &str,
        save: bool,
    ) -> Result<Generated<LeanCanvas>, ServiceError> {
        require_field("productName", product_name)?;
        require_field("idea", idea)?;
        let canvas = self.llm()?.generate_canvas(product_name.trim(), idea.trim()).await?;
        let artifact_id = if save {
            let title = format!("{} lean canvas", canvas.product_name);
            Some(self.save(user_id, title, ArtifactContent::Canvas(canvas.clone())).await?)
        } else {
            None
        };
        Ok(Generated { value: canvas, artifact_id })
    }

    async fn save(
        &self,
        user_id: Uuid,
        title: String,
        content: ArtifactContent,
    ) -> Result<Uuid, ServiceError> {
        let input = NewArtifact { title, content, product_context_id: None, prd_id: None };
        Ok(self.artifacts.create(user_id, input).await?.id)
    }
}

fn require_field(name: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidInput(format!("{name} must not be empty")));
    }
    Ok(())
}

fn validate_history(messages: &[ChatTurn]) -> Result<(), ServiceError> {
    let Some(last) = messages.last() else {
        return Err(ServiceError::InvalidInput("messages must not be empty".into()));
    };
    if last.role != ChatRole::User {
        return Err(ServiceError::InvalidInput("the last message must come from the user".into()));
    }
    if let Some(i) = messages.iter().position(|m| m.content.trim().is_empty()) {
        return Err(ServiceError::InvalidInput(format!("messages[{i}].content must not be empty")));
    }
    if let Some(i) = messages.iter().position(|m| m.content.chars().count() > MAX_TURN_CHARS) {
        return Err(ServiceError::InvalidInput(format!(
            "messages[{i}].content exceeds {MAX_TURN_CHARS} characters"
        )));
    }
    Ok(())
}
