//! In-memory storage backend.
//!
//! Used when no `DATABASE_URL` is configured and by unit tests. All state sits
//! behind one async mutex, so every trait method is a single critical section
//! and the exactly-once guarantees match the PostgreSQL backend.

mod artifacts;
mod gamification;
mod impact;
mod missions;
mod profiles;
mod squads;

use std::collections::HashMap;
use std::sync::Arc;

use pmos_core::{
    Artifact, Badge, DailyMission, GamificationStats, ImpactItem, ImpactQueueItem, ImpactRun,
    MysteryBox, Profile, Squad, XpAward,
};
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::error::StorageError;

#[derive(Debug, Default)]
pub(crate) struct MemoryState {
    profiles: HashMap<Uuid, Profile>,
    tokens: HashMap<String, Uuid>,
    stats: HashMap<Uuid, GamificationStats>,
    squads: HashMap<Uuid, Squad>,
    artifacts: HashMap<Uuid, Artifact>,
    missions: HashMap<Uuid, DailyMission>,
    badges: Vec<Badge>,
    boxes: HashMap<Uuid, MysteryBox>,
    queue: HashMap<Uuid, ImpactQueueItem>,
    runs: HashMap<Uuid, ImpactRun>,
    items: HashMap<Uuid, Vec<ImpactItem>>,
}

impl MemoryState {
    fn stats_mut(&mut self, user_id: Uuid) -> Result<&mut GamificationStats, StorageError> {
        self.stats.get_mut(&user_id).ok_or_else(|| StorageError::not_found("gamification_stats", user_id))
    }

    fn award(&mut self, user_id: Uuid, xp: i64, coins: i64) -> Result<XpAward, StorageError> {
        Ok(self.stats_mut(user_id)?.apply_award(xp, coins))
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        tracing::info!("MemoryStorage initialized");
        Self::default()
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().await
    }
}

/// Newest-first helper shared by the list methods.
pub(crate) fn newest_first<T, F>(mut rows: Vec<T>, key: F, limit: usize) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    rows.truncate(crate::types::clamp_limit(limit));
    rows
}
