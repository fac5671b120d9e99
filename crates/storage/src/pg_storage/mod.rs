//! PostgreSQL storage backend using sqlx.
//!
//! Split into modular files by domain concern.

mod artifacts;
mod gamification;
mod impact;
mod missions;
mod profiles;
mod squads;

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use pmos_core::{
    Artifact, ArtifactContent, Badge, CoreError, DailyMission, GamificationStats, ImpactItem,
    ImpactQueueItem, ImpactRun, MysteryBox, PG_POOL_ACQUIRE_TIMEOUT_SECS,
    PG_POOL_IDLE_TIMEOUT_SECS, PG_POOL_MAX_CONNECTIONS, Profile, Squad, SquadAgent,
};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::error::StorageError;
use crate::pg_migrations::run_pg_migrations;

#[derive(Clone, Debug)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(PG_POOL_MAX_CONNECTIONS)
            .acquire_timeout(std::time::Duration::from_secs(PG_POOL_ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(std::time::Duration::from_secs(PG_POOL_IDLE_TIMEOUT_SECS))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;
        run_pg_migrations(&pool).await.map_err(|e| StorageError::Migration(e.to_string()))?;
        tracing::info!("PgStorage initialized");
        Ok(Self { pool })
    }
}

/// Parse a TEXT column into one of the core string enums.
pub(crate) fn parse_column<T>(row: &PgRow, column: &str) -> Result<T, StorageError>
where
    T: FromStr<Err = CoreError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>().map_err(|e| {
        tracing::warn!(column, value = %raw, "corrupt enum value in DB");
        StorageError::from(e)
    })
}

pub(crate) fn i64_to_usize(val: i64) -> usize {
    usize::try_from(val).unwrap_or(0)
}

// ── Transaction helpers ──────────────────────────────────────────

/// Lock the user's stats row, apply `xp`/`coins`, write back the new level.
pub(crate) async fn award_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    xp: i64,
    coins: i64,
    missions_completed_delta: i32,
) -> Result<pmos_core::XpAward, StorageError> {
    let row = sqlx::query(&format!(
        "SELECT {STATS_COLUMNS} FROM gamification_stats WHERE user_id = $1 FOR UPDATE"
    ))
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| StorageError::not_found("gamification_stats", user_id))?;
    let mut stats = row_to_stats(&row)?;
    let award = stats.apply_award(xp, coins);
    sqlx::query(
        "UPDATE gamification_stats
           SET xp = $2, coins = $3, level = $4, missions_completed = missions_completed + $5
           WHERE user_id = $1",
    )
    .bind(user_id)
    .bind(stats.xp)
    .bind(stats.coins)
    .bind(stats.level)
    .bind(missions_completed_delta)
    .execute(&mut **tx)
    .await?;
    Ok(award)
}

// ── Row mappers ──────────────────────────────────────────────────

pub(crate) const PROFILE_COLUMNS: &str = "id, display_name, role, created_at";

pub(crate) const STATS_COLUMNS: &str =
    "user_id, xp, level, coins, current_streak, longest_streak, last_active_on,
     missions_completed, artifacts_created";

pub(crate) const SQUAD_COLUMNS: &str =
    "id, user_id, name, description, is_active, first_activated_at, created_at";

pub(crate) const SQUAD_AGENT_COLUMNS: &str =
    "squad_id, slug, name, specialty, capabilities, family, unlock_xp, added_at";

pub(crate) const ARTIFACT_COLUMNS: &str =
    "id, user_id, title, artifact_type, content, product_context_id, prd_id, created_at, updated_at";

pub(crate) const MISSION_COLUMNS: &str =
    "id, user_id, mission_date, template_key, title, description, kind, target, progress,
     xp_reward, coin_reward, completed_at";

pub(crate) const BADGE_COLUMNS: &str = "id, user_id, kind, earned_at";

pub(crate) const BOX_COLUMNS: &str =
    "id, user_id, rarity, reward_xp, reward_coins, source, created_at, opened_at";

pub(crate) const QUEUE_COLUMNS: &str =
    "id, user_id, artifact_id, source_artifact_id, document_name, document_text, status,
     attempts, scheduled_at, claimed_at, completed_at, last_error, created_at";

pub(crate) const RUN_COLUMNS: &str =
    "id, user_id, artifact_id, queue_id, document_name, total_score, risk_level, summary,
     item_count, created_at";

pub(crate) const ITEM_COLUMNS: &str =
    "id, run_id, section, change_kind, severity, score, description, suggested_action";

pub(crate) fn row_to_profile(row: &PgRow) -> Result<Profile, StorageError> {
    Ok(Profile {
        id: row.try_get("id")?,
        display_name: row.try_get("display_name")?,
        role: parse_column(row, "role")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn row_to_stats(row: &PgRow) -> Result<GamificationStats, StorageError> {
    let last_active_on: Option<NaiveDate> = row.try_get("last_active_on")?;
    Ok(GamificationStats {
        user_id: row.try_get("user_id")?,
        xp: row.try_get("xp")?,
        level: row.try_get("level")?,
        coins: row.try_get("coins")?,
        current_streak: row.try_get("current_streak")?,
        longest_streak: row.try_get("longest_streak")?,
        last_active_on,
        missions_completed: row.try_get("missions_completed")?,
        artifacts_created: row.try_get("artifacts_created")?,
    })
}

pub(crate) fn row_to_squad(row: &PgRow) -> Result<Squad, StorageError> {
    Ok(Squad {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        is_active: row.try_get("is_active")?,
        first_activated_at: row.try_get("first_activated_at")?,
        created_at: row.try_get("created_at")?,
        agents: Vec::new(),
    })
}

pub(crate) fn row_to_squad_agent(row: &PgRow) -> Result<SquadAgent, StorageError> {
    let capabilities: serde_json::Value = row.try_get("capabilities")?;
    Ok(SquadAgent {
        slug: row.try_get("slug")?,
        name: row.try_get("name")?,
        specialty: row.try_get("specialty")?,
        capabilities: serde_json::from_value(capabilities)?,
        family: parse_column(row, "family")?,
        unlock_xp: row.try_get("unlock_xp")?,
        added_at: row.try_get("added_at")?,
    })
}

pub(crate) fn row_to_artifact(row: &PgRow) -> Result<Artifact, StorageError> {
    let content: serde_json::Value = row.try_get("content")?;
    let content: ArtifactContent = serde_json::from_value(content)?;
    let artifact_type = parse_column(row, "artifact_type")?;
    if content.artifact_type() != artifact_type {
        let id: Uuid = row.try_get("id")?;
        tracing::warn!(%id, %artifact_type, "artifact_type column disagrees with content tag");
    }
    Ok(Artifact {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        artifact_type: content.artifact_type(),
        content,
        product_context_id: row.try_get("product_context_id")?,
        prd_id: row.try_get("prd_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn row_to_mission(row: &PgRow) -> Result<DailyMission, StorageError> {
    let completed_at: Option<DateTime<Utc>> = row.try_get("completed_at")?;
    Ok(DailyMission {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        mission_date: row.try_get("mission_date")?,
        template_key: row.try_get("template_key")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        kind: parse_column(row, "kind")?,
        target: row.try_get("target")?,
        progress: row.try_get("progress")?,
        xp_reward: row.try_get("xp_reward")?,
        coin_reward: row.try_get("coin_reward")?,
        completed_at,
    })
}

pub(crate) fn row_to_badge(row: &PgRow) -> Result<Badge, StorageError> {
    Ok(Badge {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        kind: parse_column(row, "kind")?,
        earned_at: row.try_get("earned_at")?,
    })
}

pub(crate) fn row_to_box(row: &PgRow) -> Result<MysteryBox, StorageError> {
    Ok(MysteryBox {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        rarity: parse_column(row, "rarity")?,
        reward_xp: row.try_get("reward_xp")?,
        reward_coins: row.try_get("reward_coins")?,
        source: parse_column(row, "source")?,
        created_at: row.try_get("created_at")?,
        opened_at: row.try_get("opened_at")?,
    })
}

pub(crate) fn row_to_queue_item(row: &PgRow) -> Result<ImpactQueueItem, StorageError> {
    Ok(ImpactQueueItem {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        artifact_id: row.try_get("artifact_id")?,
        source_artifact_id: row.try_get("source_artifact_id")?,
        document_name: row.try_get("document_name")?,
        document_text: row.try_get("document_text")?,
        status: parse_column(row, "status")?,
        attempts: row.try_get("attempts")?,
        scheduled_at: row.try_get("scheduled_at")?,
        claimed_at: row.try_get("claimed_at")?,
        completed_at: row.try_get("completed_at")?,
        last_error: row.try_get("last_error")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn row_to_run(row: &PgRow) -> Result<ImpactRun, StorageError> {
    Ok(ImpactRun {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        artifact_id: row.try_get("artifact_id")?,
        queue_id: row.try_get("queue_id")?,
        document_name: row.try_get("document_name")?,
        total_score: row.try_get("total_score")?,
        risk_level: parse_column(row, "risk_level")?,
        summary: row.try_get("summary")?,
        item_count: row.try_get("item_count")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn row_to_item(row: &PgRow) -> Result<ImpactItem, StorageError> {
    Ok(ImpactItem {
        id: row.try_get("id")?,
        run_id: row.try_get("run_id")?,
        section: row.try_get("section")?,
        change_kind: parse_column(row, "change_kind")?,
        severity: parse_column(row, "severity")?,
        score: row.try_get("score")?,
        description: row.try_get("description")?,
        suggested_action: row.try_get("suggested_action")?,
    })
}
