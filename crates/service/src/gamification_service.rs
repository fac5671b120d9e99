use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use pmos_core::{
    Badge, BadgeCounters, BadgeKind, BoxSource, GamificationStats, LevelProgress, MysteryBox,
    Rarity, RealtimeEvent, XpAward, XpSource, earned_badges, level_up_box,
};
use pmos_storage::traits::{GamificationStore, SquadStore};
use pmos_storage::{RewardClaim, StorageBackend};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::ServiceError;
use crate::events::publish;

/// Stats plus level progress, as shown on the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GamificationOverview {
    pub stats: GamificationStats,
    pub progress: LevelProgress,
}

/// Everything one rewarded action changed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardOutcome {
    pub award: Option<XpAward>,
    pub boxes: Vec<MysteryBox>,
    pub badges: Vec<BadgeKind>,
}

/// Result of opening a mystery box.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxOpening {
    pub awarded: bool,
    pub mystery_box: MysteryBox,
    pub award: Option<XpAward>,
}

/// The single writer of xp, level, streak, boxes and badges.
pub struct GamificationService {
    storage: Arc<StorageBackend>,
    event_tx: broadcast::Sender<RealtimeEvent>,
}

/// Calendar day used for streaks and missions.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl GamificationService {
    #[must_use]
    pub fn new(storage: Arc<StorageBackend>, event_tx: broadcast::Sender<RealtimeEvent>) -> Self {
        Self { storage, event_tx }
    }

    pub async fn stats(&self, user_id: Uuid) -> Result<GamificationStats, ServiceError> {
        self.storage
            .get_stats(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("stats for user {user_id}")))
    }

    pub async fn overview(&self, user_id: Uuid) -> Result<GamificationOverview, ServiceError> {
        let stats = self.stats(user_id).await?;
        let progress = stats.progress();
        Ok(GamificationOverview { stats, progress })
    }

    /// Grant the fixed reward for `source`, count the day toward the streak
    /// and re-check badges.
    pub async fn record_action(
        &self,
        user_id: Uuid,
        source: XpSource,
    ) -> Result<RewardOutcome, ServiceError> {
        let mut outcome =
            self.grant(user_id, source, source.base_xp(), source.base_coins()).await?;
        outcome.boxes.extend(self.record_streak(user_id).await?);
        outcome.badges = self.evaluate_badges(user_id).await?;
        Ok(outcome)
    }

    /// Award `xp`/`coins` and hand out level-up boxes.
    pub async fn grant(
        &self,
        user_id: Uuid,
        source: XpSource,
        xp: i64,
        coins: i64,
    ) -> Result<RewardOutcome, ServiceError> {
        let award = self.storage.award_xp(user_id, xp, coins).await?;
        let boxes = self.after_award(user_id, source, &award).await?;
        Ok(RewardOutcome { award: Some(award), boxes, badges: Vec::new() })
    }

    /// Events and level-up boxes for an award that storage already applied.
    pub(crate) async fn after_award(
        &self,
        user_id: Uuid,
        source: XpSource,
        award: &XpAward,
    ) -> Result<Vec<MysteryBox>, ServiceError> {
        publish(
            &self.event_tx,
            RealtimeEvent::XpAwarded {
                user_id,
                source,
                xp_gained: award.xp_gained,
                total_xp: award.total_xp,
            },
        );
        if !award.leveled_up() {
            return Ok(Vec::new());
        }
        tracing::info!(
            %user_id,
            from = award.previous_level,
            to = award.new_level,
            "user leveled up"
        );
        publish(
            &self.event_tx,
            RealtimeEvent::LevelUp {
                user_id,
                previous_level: award.previous_level,
                new_level: award.new_level,
            },
        );
        let mut boxes = Vec::new();
        for level in (award.previous_level + 1)..=award.new_level {
            boxes.push(self.grant_box(user_id, level_up_box(level), BoxSource::LevelUp).await?);
        }
        Ok(boxes)
    }

    async fn record_streak(&self, user_id: Uuid) -> Result<Option<MysteryBox>, ServiceError> {
        let update = self.storage.record_activity(user_id, today()).await?;
        match update.milestone {
            Some(rarity) => {
                tracing::info!(%user_id, streak = update.current_streak, %rarity, "streak milestone");
                Ok(Some(self.grant_box(user_id, rarity, BoxSource::StreakMilestone).await?))
            },
            None => Ok(None),
        }
    }

    async fn grant_box(
        &self,
        user_id: Uuid,
        rarity: Rarity,
        source: BoxSource,
    ) -> Result<MysteryBox, ServiceError> {
        let mystery_box = MysteryBox::new(user_id, rarity, source);
        self.storage.create_mystery_box(&mystery_box).await?;
        publish(
            &self.event_tx,
            RealtimeEvent::MysteryBoxGranted { user_id, box_id: mystery_box.id, rarity },
        );
        Ok(mystery_box)
    }

    /// Award every badge the user now qualifies for. Returns only new ones.
    pub async fn evaluate_badges(&self, user_id: Uuid) -> Result<Vec<BadgeKind>, ServiceError> {
        let stats = self.stats(user_id).await?;
        let counters = BadgeCounters {
            artifacts_created: stats.artifacts_created,
            longest_streak: stats.longest_streak,
            level: stats.level,
            missions_completed: stats.missions_completed,
            largest_squad: self.storage.largest_squad_size(user_id).await?,
        };
        let mut fresh = Vec::new();
        for kind in earned_badges(&counters) {
            if self.storage.award_badge(&Badge::new(user_id, kind)).await? {
                tracing::info!(%user_id, badge = %kind, "badge earned");
                publish(&self.event_tx, RealtimeEvent::BadgeEarned { user_id, badge: kind });
                fresh.push(kind);
            }
        }
        Ok(fresh)
    }

    pub async fn badges(&self, user_id: Uuid) -> Result<Vec<Badge>, ServiceError> {
        Ok(self.storage.list_badges(user_id).await?)
    }

    pub async fn mystery_boxes(&self, user_id: Uuid) -> Result<Vec<MysteryBox>, ServiceError> {
        Ok(self.storage.list_mystery_boxes(user_id).await?)
    }

    /// Open a box. Only the first opening awards its contents.
    pub async fn open_mystery_box(
        &self,
        user_id: Uuid,
        box_id: Uuid,
    ) -> Result<BoxOpening, ServiceError> {
        match self.storage.open_mystery_box(user_id, box_id).await? {
            RewardClaim::Awarded { item, award } => {
                self.after_award(user_id, XpSource::MysteryBox, &award).await?;
                self.evaluate_badges(user_id).await?;
                Ok(BoxOpening { awarded: true, mystery_box: item, award: Some(award) })
            },
            RewardClaim::AlreadyClaimed(item) | RewardClaim::NotReady(item) => {
                Ok(BoxOpening { awarded: false, mystery_box: item, award: None })
            },
            RewardClaim::NotFound => Err(ServiceError::NotFound(format!("mystery box {box_id}"))),
        }
    }
}
