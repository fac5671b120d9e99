//! Request bodies and query strings (Deserialize)

use pmos_core::{ArtifactContent, ArtifactType, Epic, UserRole};
use pmos_llm::ChatTurn;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub display_name: String,
    #[serde(default)]
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSquadRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAgentRequest {
    pub agent_slug: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArtifactRequest {
    pub title: String,
    pub content: ArtifactContent,
    #[serde(default)]
    pub product_context_id: Option<Uuid>,
    #[serde(default)]
    pub prd_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateArtifactRequest {
    pub content: ArtifactContent,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtifactQuery {
    #[serde(rename = "type")]
    pub artifact_type: Option<ArtifactType>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunsQuery {
    pub artifact_id: Option<Uuid>,
    pub limit: Option<usize>,
}

// ── Functions ──

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentChatRequest {
    pub agent_slug: String,
    pub messages: Vec<ChatTurn>,
    #[serde(default)]
    pub squad_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryOptions {
    #[serde(default)]
    pub story_count: Option<usize>,
    #[serde(default)]
    pub persona: Option<String>,
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Deserialize)]
pub struct GenerateStoriesRequest {
    pub epic: Epic,
    #[serde(default)]
    pub options: StoryOptions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePrdRequest {
    pub product_name: String,
    pub problem: String,
    #[serde(default)]
    pub target_users: Option<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRoadmapRequest {
    pub product_name: String,
    pub goals: Vec<String>,
    #[serde(default)]
    pub horizon_quarters: Option<usize>,
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCanvasRequest {
    pub product_name: String,
    pub idea: String,
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImpactRequest {
    pub document_text: String,
    pub document_name: String,
    #[serde(alias = "artifactId")]
    pub artefact_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactReportRequest {
    pub run_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProcessQueueRequest {
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessingToggle {
    pub active: bool,
}
