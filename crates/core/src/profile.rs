//! User profiles and bearer-token digests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{CoreError, require_text};
use crate::gamification::{GamificationStats, LevelProgress};

text_enum! {
    /// Self-declared role, used to flavour agent prompts.
    pub enum UserRole("user role") {
        ProductManager => "pm",
        Designer => "designer",
        Engineer => "engineer",
        Founder => "founder",
        Other => "other",
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::ProductManager
    }
}

/// One row per authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub display_name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    #[must_use]
    pub fn new(display_name: String, role: UserRole) -> Self {
        Self { id: Uuid::new_v4(), display_name, role, created_at: Utc::now() }
    }
}

/// Profile joined with its gamification record, as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: Profile,
    pub stats: GamificationStats,
    pub progress: LevelProgress,
}

impl ProfileView {
    #[must_use]
    pub fn new(profile: Profile, stats: GamificationStats) -> Self {
        let progress = stats.progress();
        Self { profile, stats, progress }
    }
}

const MAX_DISPLAY_NAME_CHARS: usize = 60;

/// Trim and validate a display name.
///
/// # Errors
/// Returns `CoreError::Validation` for blank or overlong names.
pub fn validate_display_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    require_text("displayName", trimmed, MAX_DISPLAY_NAME_CHARS)?;
    Ok(trimmed.to_owned())
}

/// Hex-encoded SHA-256 of an API token. Only digests are persisted.
#[must_use]
pub fn token_digest(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{digest:x}")
}
