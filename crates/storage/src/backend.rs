//! Unified storage backend with enum dispatch.

use async_trait::async_trait;
use chrono::NaiveDate;
use pmos_core::{
    Artifact, ArtifactType, Badge, DailyMission, GamificationStats, ImpactQueueItem,
    ImpactQueueStats, ImpactQueueStatus, ImpactRun, ImpactRunDetail, MissionKind, MysteryBox,
    Profile, Squad, SquadAgent, StreakUpdate, XpAward,
};
use uuid::Uuid;

use crate::error::StorageError;
use crate::memory::MemoryStorage;
use crate::pg_storage::PgStorage;
use crate::traits::{
    ArtifactStore, GamificationStore, ImpactStore, MissionStore, ProfileStore, SquadStore,
};
use crate::types::{ProfileUpdate, RewardClaim, SquadActivation};

macro_rules! dispatch {
    ($self:expr, $trait:path, $method:ident ( $($arg:expr),* $(,)? )) => {
        match $self {
            StorageBackend::Postgres(s) => <PgStorage as $trait>::$method(s, $($arg),*).await,
            StorageBackend::Memory(s) => <MemoryStorage as $trait>::$method(s, $($arg),*).await,
        }
    };
}

#[derive(Clone, Debug)]
pub enum StorageBackend {
    Postgres(PgStorage),
    Memory(MemoryStorage),
}

impl StorageBackend {
    pub async fn new_postgres(database_url: &str) -> Result<Self, StorageError> {
        Ok(Self::Postgres(PgStorage::new(database_url).await?))
    }

    #[must_use]
    pub fn new_memory() -> Self {
        Self::Memory(MemoryStorage::new())
    }

    /// Postgres when a URL is given, otherwise the in-memory backend.
    pub async fn connect(database_url: Option<&str>) -> Result<Self, StorageError> {
        match database_url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => Self::new_postgres(url).await,
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory storage (data is lost on exit)");
                Ok(Self::new_memory())
            },
        }
    }

    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }
}

// ── ProfileStore ─────────────────────────────────────────────────

#[async_trait]
impl ProfileStore for StorageBackend {
    async fn create_profile(
        &self,
        profile: &Profile,
        token_hash: &str,
    ) -> Result<GamificationStats, StorageError> {
        dispatch!(self, ProfileStore, create_profile(profile, token_hash))
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StorageError> {
        dispatch!(self, ProfileStore, get_profile(id))
    }

    async fn find_profile_by_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<Profile>, StorageError> {
        dispatch!(self, ProfileStore, find_profile_by_token(token_hash))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Profile, StorageError> {
        dispatch!(self, ProfileStore, update_profile(id, update))
    }
}

// ── SquadStore ───────────────────────────────────────────────────

#[async_trait]
impl SquadStore for StorageBackend {
    async fn create_squad(&self, squad: &Squad) -> Result<(), StorageError> {
        dispatch!(self, SquadStore, create_squad(squad))
    }

    async fn get_squad(&self, id: Uuid) -> Result<Option<Squad>, StorageError> {
        dispatch!(self, SquadStore, get_squad(id))
    }

    async fn list_squads(&self, user_id: Uuid) -> Result<Vec<Squad>, StorageError> {
        dispatch!(self, SquadStore, list_squads(user_id))
    }

    async fn delete_squad(&self, id: Uuid) -> Result<bool, StorageError> {
        dispatch!(self, SquadStore, delete_squad(id))
    }

    async fn activate_squad(
        &self,
        user_id: Uuid,
        squad_id: Uuid,
    ) -> Result<SquadActivation, StorageError> {
        dispatch!(self, SquadStore, activate_squad(user_id, squad_id))
    }

    async fn add_squad_agent(
        &self,
        squad_id: Uuid,
        agent: &SquadAgent,
        max_size: usize,
    ) -> Result<(), StorageError> {
        dispatch!(self, SquadStore, add_squad_agent(squad_id, agent, max_size))
    }

    async fn remove_squad_agent(&self, squad_id: Uuid, slug: &str) -> Result<bool, StorageError> {
        dispatch!(self, SquadStore, remove_squad_agent(squad_id, slug))
    }

    async fn largest_squad_size(&self, user_id: Uuid) -> Result<usize, StorageError> {
        dispatch!(self, SquadStore, largest_squad_size(user_id))
    }
}

// ── ArtifactStore ────────────────────────────────────────────────

#[async_trait]
impl ArtifactStore for StorageBackend {
    async fn save_artifact(&self, artifact: &Artifact) -> Result<(), StorageError> {
        dispatch!(self, ArtifactStore, save_artifact(artifact))
    }

    async fn get_artifact(&self, id: Uuid) -> Result<Option<Artifact>, StorageError> {
        dispatch!(self, ArtifactStore, get_artifact(id))
    }

    async fn list_artifacts(
        &self,
        user_id: Uuid,
        artifact_type: Option<ArtifactType>,
        limit: usize,
    ) -> Result<Vec<Artifact>, StorageError> {
        dispatch!(self, ArtifactStore, list_artifacts(user_id, artifact_type, limit))
    }

    async fn update_artifact(&self, artifact: &Artifact) -> Result<bool, StorageError> {
        dispatch!(self, ArtifactStore, update_artifact(artifact))
    }

    async fn delete_artifact(&self, id: Uuid) -> Result<bool, StorageError> {
        dispatch!(self, ArtifactStore, delete_artifact(id))
    }

    async fn list_dependent_artifacts(
        &self,
        source_id: Uuid,
    ) -> Result<Vec<Artifact>, StorageError> {
        dispatch!(self, ArtifactStore, list_dependent_artifacts(source_id))
    }
}

// ── GamificationStore ────────────────────────────────────────────

#[async_trait]
impl GamificationStore for StorageBackend {
    async fn get_stats(&self, user_id: Uuid) -> Result<Option<GamificationStats>, StorageError> {
        dispatch!(self, GamificationStore, get_stats(user_id))
    }

    async fn award_xp(&self, user_id: Uuid, xp: i64, coins: i64) -> Result<XpAward, StorageError> {
        dispatch!(self, GamificationStore, award_xp(user_id, xp, coins))
    }

    async fn record_activity(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<StreakUpdate, StorageError> {
        dispatch!(self, GamificationStore, record_activity(user_id, today))
    }

    async fn increment_artifacts_created(&self, user_id: Uuid) -> Result<i32, StorageError> {
        dispatch!(self, GamificationStore, increment_artifacts_created(user_id))
    }

    async fn list_badges(&self, user_id: Uuid) -> Result<Vec<Badge>, StorageError> {
        dispatch!(self, GamificationStore, list_badges(user_id))
    }

    async fn award_badge(&self, badge: &Badge) -> Result<bool, StorageError> {
        dispatch!(self, GamificationStore, award_badge(badge))
    }

    async fn create_mystery_box(&self, mystery_box: &MysteryBox) -> Result<(), StorageError> {
        dispatch!(self, GamificationStore, create_mystery_box(mystery_box))
    }

    async fn list_mystery_boxes(&self, user_id: Uuid) -> Result<Vec<MysteryBox>, StorageError> {
        dispatch!(self, GamificationStore, list_mystery_boxes(user_id))
    }

    async fn open_mystery_box(
        &self,
        user_id: Uuid,
        box_id: Uuid,
    ) -> Result<RewardClaim<MysteryBox>, StorageError> {
        dispatch!(self, GamificationStore, open_mystery_box(user_id, box_id))
    }
}

// ── MissionStore ─────────────────────────────────────────────────

#[async_trait]
impl MissionStore for StorageBackend {
    async fn insert_missions(&self, missions: &[DailyMission]) -> Result<usize, StorageError> {
        dispatch!(self, MissionStore, insert_missions(missions))
    }

    async fn list_missions(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<DailyMission>, StorageError> {
        dispatch!(self, MissionStore, list_missions(user_id, date))
    }

    async fn bump_mission_progress(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        kind: MissionKind,
    ) -> Result<Vec<DailyMission>, StorageError> {
        dispatch!(self, MissionStore, bump_mission_progress(user_id, date, kind))
    }

    async fn complete_mission(
        &self,
        user_id: Uuid,
        mission_id: Uuid,
    ) -> Result<RewardClaim<DailyMission>, StorageError> {
        dispatch!(self, MissionStore, complete_mission(user_id, mission_id))
    }
}

// ── ImpactStore ──────────────────────────────────────────────────

#[async_trait]
impl ImpactStore for StorageBackend {
    async fn enqueue_impact(&self, item: &ImpactQueueItem) -> Result<(), StorageError> {
        dispatch!(self, ImpactStore, enqueue_impact(item))
    }

    async fn enqueue_or_merge_impact(&self, item: &ImpactQueueItem) -> Result<bool, StorageError> {
        dispatch!(self, ImpactStore, enqueue_or_merge_impact(item))
    }

    async fn claim_impact_items(
        &self,
        limit: usize,
        visibility_timeout_secs: i64,
    ) -> Result<Vec<ImpactQueueItem>, StorageError> {
        dispatch!(self, ImpactStore, claim_impact_items(limit, visibility_timeout_secs))
    }

    async fn finish_impact_item(
        &self,
        id: Uuid,
        status: ImpactQueueStatus,
    ) -> Result<(), StorageError> {
        dispatch!(self, ImpactStore, finish_impact_item(id, status))
    }

    async fn fail_impact_item(
        &self,
        id: Uuid,
        error: &str,
    ) -> Result<ImpactQueueStatus, StorageError> {
        dispatch!(self, ImpactStore, fail_impact_item(id, error))
    }

    async fn release_stale_impact_items(
        &self,
        visibility_timeout_secs: i64,
    ) -> Result<usize, StorageError> {
        dispatch!(self, ImpactStore, release_stale_impact_items(visibility_timeout_secs))
    }

    async fn impact_queue_stats(&self) -> Result<ImpactQueueStats, StorageError> {
        dispatch!(self, ImpactStore, impact_queue_stats())
    }

    async fn retry_failed_impact_items(&self) -> Result<usize, StorageError> {
        dispatch!(self, ImpactStore, retry_failed_impact_items())
    }

    async fn clear_failed_impact_items(&self) -> Result<usize, StorageError> {
        dispatch!(self, ImpactStore, clear_failed_impact_items())
    }

    async fn list_impact_queue(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ImpactQueueItem>, StorageError> {
        dispatch!(self, ImpactStore, list_impact_queue(user_id, limit))
    }

    async fn save_impact_run(&self, detail: &ImpactRunDetail) -> Result<bool, StorageError> {
        dispatch!(self, ImpactStore, save_impact_run(detail))
    }

    async fn get_impact_run(&self, id: Uuid) -> Result<Option<ImpactRunDetail>, StorageError> {
        dispatch!(self, ImpactStore, get_impact_run(id))
    }

    async fn list_impact_runs(
        &self,
        user_id: Uuid,
        artifact_id: Option<Uuid>,
        limit: usize,
    ) -> Result<Vec<ImpactRun>, StorageError> {
        dispatch!(self, ImpactStore, list_impact_runs(user_id, artifact_id, limit))
    }
}
