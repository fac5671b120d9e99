//! PostgreSQL schema migrations for pmos storage.
//!
//! Every statement is idempotent, so this runs on each connect.

use sqlx::PgPool;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
        id UUID PRIMARY KEY,
        display_name TEXT NOT NULL,
        role TEXT NOT NULL,
        token_hash TEXT NOT NULL UNIQUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS gamification_stats (
        user_id UUID PRIMARY KEY REFERENCES profiles (id) ON DELETE CASCADE,
        xp BIGINT NOT NULL DEFAULT 0 CHECK (xp >= 0),
        level INTEGER NOT NULL DEFAULT 1,
        coins BIGINT NOT NULL DEFAULT 0 CHECK (coins >= 0),
        current_streak INTEGER NOT NULL DEFAULT 0,
        longest_streak INTEGER NOT NULL DEFAULT 0,
        last_active_on DATE,
        missions_completed INTEGER NOT NULL DEFAULT 0,
        artifacts_created INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS squads (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES profiles (id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        description TEXT,
        is_active BOOLEAN NOT NULL DEFAULT FALSE,
        first_activated_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_squads_user ON squads (user_id, created_at)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_squads_one_active ON squads (user_id) WHERE is_active",
    r#"
    CREATE TABLE IF NOT EXISTS squad_agents (
        squad_id UUID NOT NULL REFERENCES squads (id) ON DELETE CASCADE,
        slug TEXT NOT NULL,
        name TEXT NOT NULL,
        specialty TEXT NOT NULL,
        capabilities JSONB NOT NULL DEFAULT '[]',
        family TEXT NOT NULL,
        unlock_xp BIGINT NOT NULL,
        added_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        PRIMARY KEY (squad_id, slug)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS artifacts (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES profiles (id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        artifact_type TEXT NOT NULL,
        content JSONB NOT NULL,
        product_context_id UUID,
        prd_id UUID,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_artifacts_user ON artifacts (user_id, created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_artifacts_prd ON artifacts (prd_id) WHERE prd_id IS NOT NULL",
    r#"
    CREATE TABLE IF NOT EXISTS daily_missions (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES profiles (id) ON DELETE CASCADE,
        mission_date DATE NOT NULL,
        template_key TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        kind TEXT NOT NULL,
        target INTEGER NOT NULL CHECK (target > 0),
        progress INTEGER NOT NULL DEFAULT 0,
        xp_reward BIGINT NOT NULL,
        coin_reward BIGINT NOT NULL,
        completed_at TIMESTAMPTZ,
        UNIQUE (user_id, mission_date, template_key)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS badges (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES profiles (id) ON DELETE CASCADE,
        kind TEXT NOT NULL,
        earned_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (user_id, kind)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS mystery_boxes (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES profiles (id) ON DELETE CASCADE,
        rarity TEXT NOT NULL,
        reward_xp BIGINT NOT NULL,
        reward_coins BIGINT NOT NULL,
        source TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        opened_at TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_boxes_user ON mystery_boxes (user_id, created_at DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS impact_queue (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES profiles (id) ON DELETE CASCADE,
        artifact_id UUID NOT NULL,
        source_artifact_id UUID,
        document_name TEXT NOT NULL,
        document_text TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        attempts INTEGER NOT NULL DEFAULT 0,
        scheduled_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        claimed_at TIMESTAMPTZ,
        completed_at TIMESTAMPTZ,
        last_error TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_impact_queue_due ON impact_queue (status, scheduled_at)",
    "CREATE INDEX IF NOT EXISTS idx_impact_queue_user ON impact_queue (user_id, created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_impact_queue_pending_source
       ON impact_queue (artifact_id, source_artifact_id) WHERE status = 'pending'",
    r#"
    CREATE TABLE IF NOT EXISTS impact_runs (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES profiles (id) ON DELETE CASCADE,
        artifact_id UUID NOT NULL,
        queue_id UUID UNIQUE,
        document_name TEXT NOT NULL,
        total_score BIGINT NOT NULL,
        risk_level TEXT NOT NULL,
        summary TEXT NOT NULL,
        item_count INTEGER NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_impact_runs_user ON impact_runs (user_id, created_at DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS impact_items (
        id UUID PRIMARY KEY,
        run_id UUID NOT NULL REFERENCES impact_runs (id) ON DELETE CASCADE,
        section TEXT NOT NULL,
        change_kind TEXT NOT NULL,
        severity TEXT NOT NULL,
        score BIGINT NOT NULL,
        description TEXT NOT NULL,
        suggested_action TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_impact_items_run ON impact_items (run_id)",
];

/// Run all PostgreSQL migrations.
pub async fn run_pg_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!(statements = SCHEMA.len(), "PostgreSQL schema up to date");
    Ok(())
}
