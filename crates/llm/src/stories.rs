//! User story generation from an epic.

use pmos_core::{
    ArtifactContent, Epic, Priority, StorySet, UserStory, snap_effort_points,
};
use serde::Deserialize;
use serde_json::json;

use crate::ai_types::{Message, Tool};
use crate::client::LlmClient;
use crate::error::LlmError;

const SYSTEM_PROMPT: &str = "You are an expert agile product manager. You split epics into \
independent, testable user stories written from the user's point of view.";

#[derive(Deserialize)]
struct StoriesArgs {
    #[serde(default)]
    stories: Vec<RawStory>,
}

/// A story as the model returns it, before normalization.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStory {
    title: String,
    as_a: String,
    i_want: String,
    so_that: String,
    #[serde(default)]
    acceptance_criteria: Vec<String>,
    #[serde(default)]
    effort_points: Option<f64>,
    #[serde(default)]
    priority: Option<String>,
}

impl RawStory {
    fn normalize(self) -> UserStory {
        #[expect(clippy::cast_possible_truncation, reason = "model estimates are small numbers")]
        let raw_points = self.effort_points.unwrap_or(3.0).round() as i64;
        UserStory {
            title: self.title.trim().to_owned(),
            as_a: self.as_a.trim().to_owned(),
            i_want: self.i_want.trim().to_owned(),
            so_that: self.so_that.trim().to_owned(),
            acceptance_criteria: self
                .acceptance_criteria
                .into_iter()
                .map(|c| c.trim().to_owned())
                .filter(|c| !c.is_empty())
                .collect(),
            effort_points: snap_effort_points(raw_points),
            priority: self.priority.as_deref().map_or(Priority::Medium, Priority::parse_lenient),
        }
    }
}

fn stories_tool() -> Tool {
    Tool::function(
        "create_user_stories",
        "Return the generated user stories.",
        json!({
            "type": "object",
            "properties": {
                "stories": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": {"type": "string"},
                            "asA": {"type": "string"},
                            "iWant": {"type": "string"},
                            "soThat": {"type": "string"},
                            "acceptanceCriteria": {"type": "array", "items": {"type": "string"}},
                            "effortPoints": {"type": "integer", "enum": [1, 2, 3, 5, 8, 13]},
                            "priority": {"type": "string", "enum": ["high", "medium", "low"]}
                        },
                        "required": ["title", "asA", "iWant", "soThat", "acceptanceCriteria", "effortPoints", "priority"]
                    }
                }
            },
            "required": ["stories"]
        }),
    )
}

impl LlmClient {
    /// Generate exactly `count` stories for `epic`.
    ///
    /// Extra stories are dropped; fewer than `count` is an error. Effort
    /// points are snapped to the allowed scale and unknown priorities become
    /// `medium`.
    ///
    /// # Errors
    /// Gateway failures, unparsable arguments, a short story list, or a story
    /// that fails validation after normalization.
    pub async fn generate_stories(
        &self,
        epic: &Epic,
        count: usize,
        persona: Option<&str>,
    ) -> Result<Vec<UserStory>, LlmError> {
        let mut prompt = format!(
            "Write exactly {count} user stories for this epic.\n\nEpic: {}\nDescription: {}",
            epic.title, epic.description
        );
        if !epic.acceptance_criteria.is_empty() {
            prompt.push_str("\nEpic acceptance criteria:");
            for criterion in &epic.acceptance_criteria {
                prompt.push_str("\n- ");
                prompt.push_str(criterion);
            }
        }
        if let Some(persona) = persona.map(str::trim).filter(|p| !p.is_empty()) {
            prompt.push_str(&format!("\n\nWrite every story for this persona: {persona}."));
        }
        prompt.push_str(
            "\n\nEach story needs 2-5 acceptance criteria, effort points from 1, 2, 3, 5, 8, 13 \
             and a priority of high, medium or low.",
        );

        let request = self.request(vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)]);
        let args: StoriesArgs = self.tool_completion(request, stories_tool()).await?;
        let stories = finalize_stories(args.stories, count)?;

        let set = StorySet { epic_title: epic.title.clone(), stories };
        ArtifactContent::Stories(set.clone())
            .validate()
            .map_err(|e| LlmError::InvalidOutput(e.to_string()))?;
        tracing::debug!(count, epic = %epic.title, "generated user stories");
        Ok(set.stories)
    }
}

fn finalize_stories(raw: Vec<RawStory>, count: usize) -> Result<Vec<UserStory>, LlmError> {
    let returned = raw.len();
    if returned < count {
        return Err(LlmError::InvalidOutput(format!(
            "model returned {returned} of {count} stories"
        )));
    }
    if returned > count {
        tracing::debug!(returned, count, "discarding extra stories");
    }
    Ok(raw.into_iter().take(count).map(RawStory::normalize).collect())
}
