//! Artifacts: generated or saved documents.
//!
//! Content is a tagged union keyed by artifact kind. Every variant carries its
//! own validation so nothing opaque reaches storage.

mod content;
mod story;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use content::{
    Epic, ImpactFinding, ImpactReport, LeanCanvas, MAX_PRD_REQUIREMENTS, Prd, PrdRequirement, Roadmap,
    RoadmapQuarter,
};
pub use story::{EFFORT_POINTS, Priority, StorySet, UserStory, snap_effort_points};

use crate::constants::MAX_DOCUMENT_CHARS;
use crate::error::{CoreError, require_text};

text_enum! {
    /// Discriminator stored in the `artifact_type` column.
    pub enum ArtifactType("artifact type") {
        Epic => "epic",
        Story => "story",
        Stories => "stories",
        Canvas => "canvas",
        Prd => "prd",
        Roadmap => "roadmap",
        ImpactReport => "impact_report",
    }
}

/// Typed artifact body. Serialized as `{"type": "...", "data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ArtifactContent {
    Epic(Epic),
    Story(UserStory),
    Stories(StorySet),
    Canvas(LeanCanvas),
    Prd(Prd),
    Roadmap(Roadmap),
    ImpactReport(ImpactReport),
}

impl ArtifactContent {
    #[must_use]
    pub const fn artifact_type(&self) -> ArtifactType {
        match *self {
            Self::Epic(_) => ArtifactType::Epic,
            Self::Story(_) => ArtifactType::Story,
            Self::Stories(_) => ArtifactType::Stories,
            Self::Canvas(_) => ArtifactType::Canvas,
            Self::Prd(_) => ArtifactType::Prd,
            Self::Roadmap(_) => ArtifactType::Roadmap,
            Self::ImpactReport(_) => ArtifactType::ImpactReport,
        }
    }

    /// Validate the body for its kind.
    ///
    /// # Errors
    /// Returns the first `CoreError::Validation` found.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Epic(epic) => epic.validate(),
            Self::Story(story) => story.validate("story"),
            Self::Stories(set) => set.validate(),
            Self::Canvas(canvas) => canvas.validate(),
            Self::Prd(prd) => prd.validate(),
            Self::Roadmap(roadmap) => roadmap.validate(),
            Self::ImpactReport(report) => report.validate(),
        }
    }

    /// Plain-text rendering used as prompt input for impact analysis.
    #[must_use]
    pub fn to_plain_text(&self) -> String {
        match self {
            Self::Epic(epic) => epic.to_plain_text(),
            Self::Story(story) => story.to_plain_text(),
            Self::Stories(set) => set.to_plain_text(),
            Self::Canvas(canvas) => canvas.to_plain_text(),
            Self::Prd(prd) => prd.to_plain_text(),
            Self::Roadmap(roadmap) => roadmap.to_plain_text(),
            Self::ImpactReport(report) => report.to_plain_text(),
        }
    }

    /// Plain text clipped to `MAX_DOCUMENT_CHARS`, the most an impact queue
    /// row will hold.
    #[must_use]
    pub fn to_impact_document(&self) -> String {
        let mut text = self.to_plain_text();
        if let Some((cut, _)) = text.char_indices().nth(MAX_DOCUMENT_CHARS) {
            text.truncate(cut);
        }
        text
    }
}

/// A stored document owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub artifact_type: ArtifactType,
    pub content: ArtifactContent,
    pub product_context_id: Option<Uuid>,
    pub prd_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const MAX_TITLE_CHARS: usize = 200;

impl Artifact {
    /// Build a new artifact after validating title and content.
    ///
    /// # Errors
    /// Returns `CoreError::Validation` when title or content is invalid.
    pub fn new(
        user_id: Uuid,
        title: &str,
        content: ArtifactContent,
        product_context_id: Option<Uuid>,
        prd_id: Option<Uuid>,
    ) -> Result<Self, CoreError> {
        let title = title.trim();
        require_text("title", title, MAX_TITLE_CHARS)?;
        content.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_owned(),
            artifact_type: content.artifact_type(),
            content,
            product_context_id,
            prd_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the content, keeping the artifact kind fixed.
    ///
    /// # Errors
    /// Returns `CoreError::Validation` if the new content has a different kind
    /// or fails validation.
    pub fn replace_content(&mut self, content: ArtifactContent) -> Result<(), CoreError> {
        if content.artifact_type() != self.artifact_type {
            return Err(CoreError::invalid(
                "content",
                format!(
                    "artifact type cannot change from {} to {}",
                    self.artifact_type,
                    content.artifact_type()
                ),
            ));
        }
        content.validate()?;
        self.content = content;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epic() -> ArtifactContent {
        ArtifactContent::Epic(Epic {
            title: "Notifications".to_owned(),
            description: "Let users choose how they are notified".to_owned(),
            acceptance_criteria: vec![],
        })
    }

    #[test]
    fn content_round_trips_with_tag() {
        let json = serde_json::to_value(epic()).unwrap();
        assert_eq!(json["type"], "epic");
        assert_eq!(json["data"]["title"], "Notifications");
        let back: ArtifactContent = serde_json::from_value(json).unwrap();
        assert_eq!(back.artifact_type(), ArtifactType::Epic);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let json = serde_json::json!({"type": "spreadsheet", "data": {}});
        assert!(serde_json::from_value::<ArtifactContent>(json).is_err());
    }

    #[test]
    fn new_artifact_takes_type_from_content() {
        let artifact = Artifact::new(Uuid::new_v4(), "  Notifications  ", epic(), None, None).unwrap();
        assert_eq!(artifact.artifact_type, ArtifactType::Epic);
        assert_eq!(artifact.title, "Notifications");
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = Artifact::new(Uuid::new_v4(), " ", epic(), None, None).unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn impact_document_is_clipped_on_char_boundary() {
        let content = ArtifactContent::Epic(Epic {
            title: "Ünïcode".to_owned(),
            description: "é".repeat(MAX_DOCUMENT_CHARS),
            acceptance_criteria: vec![],
        });
        let full = content.to_plain_text();
        assert!(full.chars().count() > MAX_DOCUMENT_CHARS);
        let clipped = content.to_impact_document();
        assert_eq!(clipped.chars().count(), MAX_DOCUMENT_CHARS);
        assert!(full.starts_with(&clipped));

        assert_eq!(epic().to_impact_document(), epic().to_plain_text());
    }

    #[test]
    fn replace_content_refuses_kind_change() {
        let mut artifact = Artifact::new(Uuid::new_v4(), "Epic", epic(), None, None).unwrap();
        let roadmap = ArtifactContent::Roadmap(Roadmap {
            product_name: "X".to_owned(),
            quarters: vec![RoadmapQuarter {
                label: "Q1".to_owned(),
                theme: "Foundations".to_owned(),
                initiatives: vec!["Ship it".to_owned()],
            }],
        });
        assert!(artifact.replace_content(roadmap).is_err());
        assert_eq!(artifact.artifact_type, ArtifactType::Epic);
    }
}
