//! Core types for pmos
//!
//! Domain types, fixed lookup tables and validation rules shared by every
//! other crate in the workspace. Nothing in here performs I/O.

#[macro_use]
mod macros;

pub mod agent;
pub mod artifact;
mod constants;
mod env_config;
mod error;
mod event;
pub mod gamification;
pub mod impact;
mod json_utils;
mod profile;
mod squad;

pub use agent::{AGENT_CATALOG, Agent, AgentFamily, find_agent};
pub use artifact::{
    Artifact, ArtifactContent, ArtifactType, EFFORT_POINTS, Epic, ImpactFinding, ImpactReport,
    LeanCanvas, MAX_PRD_REQUIREMENTS, Prd, PrdRequirement, Priority, Roadmap, RoadmapQuarter,
    StorySet, UserStory, snap_effort_points,
};
pub use constants::*;
pub use env_config::env_parse_with_default;
pub use error::CoreError;
pub use event::RealtimeEvent;
pub use gamification::{
    Badge, BadgeCounters, BadgeKind, BoxSource, DailyMission, GamificationStats, LEVEL_THRESHOLDS,
    LevelProgress, MAX_LEVEL, MISSION_TEMPLATES, MissionKind, MissionTemplate, MysteryBox, Rarity,
    StreakUpdate, XpAward, XpSource, earned_badges, level_for_xp, level_progress, level_up_box,
    next_streak, streak_milestone_box, templates_for_date,
};
pub use impact::{
    ChangeKind, DetectedChange, DrainReport, ImpactItem, ImpactQueueItem, ImpactQueueStats,
    ImpactQueueStatus, ImpactRun, ImpactRunDetail, RiskLevel, Severity, score_changes,
};
pub use json_utils::{extract_json_block, strip_markdown_json};
pub use profile::{Profile, ProfileView, UserRole, token_digest, validate_display_name};
pub use squad::{Squad, SquadAgent, validate_squad_name};
