//! User stories and the story-point rules they must satisfy.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, require_items, require_text};

/// Allowed story point values (Fibonacci-style).
pub const EFFORT_POINTS: [u8; 6] = [1, 2, 3, 5, 8, 13];

text_enum! {
    pub enum Priority("priority") {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

impl Priority {
    /// Parse model output, falling back to `Medium` for anything unrecognised.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Medium)
    }
}

/// Snap an arbitrary estimate onto the nearest allowed story point value.
/// Ties round up, since under-estimating is the more common failure.
#[must_use]
pub fn snap_effort_points(raw: i64) -> u8 {
    let mut best = EFFORT_POINTS[0];
    let mut best_distance = u64::MAX;
    for &candidate in &EFFORT_POINTS {
        let distance = i64::from(candidate).abs_diff(raw);
        if distance <= best_distance {
            best = candidate;
            best_distance = distance;
        }
    }
    best
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserStory {
    pub title: String,
    pub as_a: String,
    pub i_want: String,
    pub so_that: String,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    pub effort_points: u8,
    pub priority: Priority,
}

impl UserStory {
    pub(crate) fn validate(&self, field: &str) -> Result<(), CoreError> {
        require_text(&format!("{field}.title"), &self.title, 200)?;
        require_text(&format!("{field}.asA"), &self.as_a, 200)?;
        require_text(&format!("{field}.iWant"), &self.i_want, 1000)?;
        require_text(&format!("{field}.soThat"), &self.so_that, 1000)?;
        require_items(&format!("{field}.acceptanceCriteria"), &self.acceptance_criteria, 0, 20)?;
        if !EFFORT_POINTS.contains(&self.effort_points) {
            return Err(CoreError::invalid(
                format!("{field}.effortPoints"),
                format!("{} is not one of {:?}", self.effort_points, EFFORT_POINTS),
            ));
        }
        Ok(())
    }

    pub(crate) fn to_plain_text(&self) -> String {
        let mut out = format!(
            "{} [{} pts, {} priority]\nAs a {}, I want {}, so that {}.",
            self.title, self.effort_points, self.priority, self.as_a, self.i_want, self.so_that
        );
        for criterion in &self.acceptance_criteria {
            out.push_str("\n  - ");
            out.push_str(criterion);
        }
        out
    }
}

/// Stories generated from one epic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StorySet {
    pub epic_title: String,
    pub stories: Vec<UserStory>,
}

impl StorySet {
    pub(crate) fn validate(&self) -> Result<(), CoreError> {
        require_text("epicTitle", &self.epic_title, 200)?;
        if self.stories.is_empty() {
            return Err(CoreError::invalid("stories", "needs at least one story"));
        }
        for (i, story) in self.stories.iter().enumerate() {
            story.validate(&format!("stories[{i}]"))?;
        }
        Ok(())
    }

    pub(crate) fn to_plain_text(&self) -> String {
        let mut out = format!("Stories for epic: {}", self.epic_title);
        for (i, story) in self.stories.iter().enumerate() {
            out.push_str(&format!("\n\n{}. {}", i + 1, story.to_plain_text()));
        }
        out
    }
}
