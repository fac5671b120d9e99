//! Structured product documents: PRDs, roadmaps and lean canvases.

use pmos_core::{
    ArtifactContent, LeanCanvas, Prd, PrdRequirement, Priority, Roadmap, RoadmapQuarter,
};
use serde::Deserialize;
use serde_json::json;

use crate::ai_types::{Message, Tool};
use crate::client::LlmClient;
use crate::error::LlmError;

const SYSTEM_PROMPT: &str = "You are a senior product manager. You write crisp, specific \
product documents. Prefer concrete statements over buzzwords.";

/// Inputs for a PRD.
#[derive(Debug, Clone, Default)]
pub struct PrdBrief {
    pub product_name: String,
    pub problem: String,
    pub target_users: Option<String>,
    pub goals: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPrd {
    summary: String,
    problem: String,
    #[serde(default)]
    target_users: Vec<String>,
    #[serde(default)]
    goals: Vec<String>,
    #[serde(default)]
    requirements: Vec<RawRequirement>,
    #[serde(default)]
    success_metrics: Vec<String>,
    #[serde(default)]
    out_of_scope: Vec<String>,
}

#[derive(Deserialize)]
struct RawRequirement {
    #[serde(default)]
    id: Option<String>,
    description: String,
    #[serde(default)]
    priority: Option<String>,
}

#[derive(Deserialize)]
struct RawRoadmap {
    #[serde(default)]
    quarters: Vec<RoadmapQuarter>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCanvas {
    #[serde(default)]
    problem: Vec<String>,
    #[serde(default)]
    customer_segments: Vec<String>,
    unique_value_proposition: String,
    #[serde(default)]
    solution: Vec<String>,
    #[serde(default)]
    channels: Vec<String>,
    #[serde(default)]
    revenue_streams: Vec<String>,
    #[serde(default)]
    cost_structure: Vec<String>,
    #[serde(default)]
    key_metrics: Vec<String>,
    unfair_advantage: String,
}

fn string_list() -> serde_json::Value {
    json!({"type": "array", "items": {"type": "string"}})
}

fn prd_tool() -> Tool {
    Tool::function(
        "create_prd",
        "Return the product requirements document.",
        json!({
            "type": "object",
            "properties": {
                "summary": {"type": "string"},
                "problem": {"type": "string"},
                "targetUsers": string_list(),
                "goals": string_list(),
                "requirements": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "string"},
                            "description": {"type": "string"},
                            "priority": {"type": "string", "enum": ["high", "medium", "low"]}
                        },
                        "required": ["id", "description", "priority"]
                    }
                },
                "successMetrics": string_list(),
                "outOfScope": string_list()
            },
            "required": ["summary", "problem", "requirements"]
        }),
    )
}

fn roadmap_tool() -> Tool {
    Tool::function(
        "create_roadmap",
        "Return the quarterly roadmap.",
        json!({
            "type": "object",
            "properties": {
                "quarters": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "label": {"type": "string"},
                            "theme": {"type": "string"},
                            "initiatives": string_list()
                        },
                        "required": ["label", "theme", "initiatives"]
                    }
                }
            },
            "required": ["quarters"]
        }),
    )
}

fn canvas_tool() -> Tool {
    Tool::function(
        "create_lean_canvas",
        "Return the lean canvas.",
        json!({
            "type": "object",
            "properties": {
                "problem": string_list(),
                "customerSegments": string_list(),
                "uniqueValueProposition": {"type": "string"},
                "solution": string_list(),
                "channels": string_list(),
                "revenueStreams": string_list(),
                "costStructure": string_list(),
                "keyMetrics": string_list(),
                "unfairAdvantage": {"type": "string"}
            },
            "required": ["problem", "customerSegments", "uniqueValueProposition", "solution", "unfairAdvantage"]
        }),
    )
}

fn ensure_valid(content: &ArtifactContent) -> Result<(), LlmError> {
    content.validate().map_err(|e| LlmError::InvalidOutput(e.to_string()))
}

impl LlmClient {
    /// # Errors
    /// Gateway failures, unparsable arguments, or a PRD that fails validation.
    pub async fn generate_prd(&self, brief: &PrdBrief) -> Result<Prd, LlmError> {
        let mut prompt = format!(
            "Write a PRD.\n\nProduct: {}\nProblem: {}",
            brief.product_name, brief.problem
        );
        if let Some(users) = brief.target_users.as_deref().filter(|u| !u.trim().is_empty()) {
            prompt.push_str(&format!("\nTarget users: {users}"));
        }
        if !brief.goals.is_empty() {
            prompt.push_str(&format!("\nGoals: {}", brief.goals.join("; ")));
        }
        prompt.push_str("\n\nNumber requirements R1, R2, ... and give each a priority.");

        let request = self.request(vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)]);
        let raw: RawPrd = self.tool_completion(request, prd_tool()).await?;
        let prd = Prd {
            product_name: brief.product_name.clone(),
            summary: raw.summary,
            problem: raw.problem,
            target_users: raw.target_users,
            goals: raw.goals,
            requirements: raw
                .requirements
                .into_iter()
                .enumerate()
                .map(|(i, r)| PrdRequirement {
                    id: r
                        .id
                        .filter(|id| !id.trim().is_empty())
                        .unwrap_or_else(|| format!("R{}", i + 1)),
                    description: r.description,
                    priority: r.priority.as_deref().map_or(Priority::Medium, Priority::parse_lenient),
                })
                .collect(),
            success_metrics: raw.success_metrics,
            out_of_scope: raw.out_of_scope,
        };
        ensure_valid(&ArtifactContent::Prd(prd.clone()))?;
        Ok(prd)
    }

    /// Roadmap over `quarters` quarters. Extra quarters are dropped.
    ///
    /// # Errors
    /// Gateway failures, unparsable arguments, or a roadmap that fails validation.
    pub async fn generate_roadmap(
        &self,
        product_name: &str,
        goals: &[String],
        quarters: usize,
    ) -> Result<Roadmap, LlmError> {
        let prompt = format!(
            "Plan a roadmap of exactly {quarters} quarters for {product_name}.\n\nGoals:\n- {}\n\n\
             Label quarters Q1, Q2, ... and give each a theme and 2-5 initiatives.",
            goals.join("\n- ")
        );
        let request = self.request(vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)]);
        let raw: RawRoadmap = self.tool_completion(request, roadmap_tool()).await?;
        let roadmap = Roadmap {
            product_name: product_name.to_owned(),
            quarters: raw.quarters.into_iter().take(quarters).collect(),
        };
        ensure_valid(&ArtifactContent::Roadmap(roadmap.clone()))?;
        Ok(roadmap)
    }

    /// # Errors
    /// Gateway failures, unparsable arguments, or a canvas that fails validation.
    pub async fn generate_canvas(
        &self,
        product_name: &str,
        idea: &str,
    ) -> Result<LeanCanvas, LlmError> {
        let prompt = format!(
            "Fill in a lean canvas for {product_name}.\n\nIdea: {idea}\n\n\
             Use 1-3 short bullet points per box."
        );
        let request = self.request(vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)]);
        let raw: RawCanvas = self.tool_completion(request, canvas_tool()).await?;
        let canvas = LeanCanvas {
            product_name: product_name.to_owned(),
            problem: raw.problem,
            customer_segments: raw.customer_segments,
            unique_value_proposition: raw.unique_value_proposition,
            solution: raw.solution,
            channels: raw.channels,
            revenue_streams: raw.revenue_streams,
            cost_structure: raw.cost_structure,
            key_metrics: raw.key_metrics,
            unfair_advantage: raw.unfair_advantage,
        };
        ensure_valid(&ArtifactContent::Canvas(canvas.clone()))?;
        Ok(canvas)
    }
}
