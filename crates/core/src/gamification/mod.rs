//! XP, levels, streaks and the reward tables built on them.
//!
//! Levels come from one threshold table and nothing else. Every place that
//! turns XP into a level goes through [`level_for_xp`].

mod badge;
mod mission;
mod mystery_box;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use badge::{Badge, BadgeCounters, BadgeKind, earned_badges};
pub use mission::{DailyMission, MISSION_TEMPLATES, MissionKind, MissionTemplate, templates_for_date};
pub use mystery_box::{BoxSource, MysteryBox, Rarity, level_up_box, streak_milestone_box};

/// Cumulative XP needed to reach level `index + 1`.
pub const LEVEL_THRESHOLDS: [i64; 16] = [
    0, 300, 700, 1200, 1800, 2500, 3300, 4200, 5200, 6300, 7500, 8800, 10200, 11700, 13300, 15000,
];

pub const MAX_LEVEL: i32 = LEVEL_THRESHOLDS.len() as i32;

/// Level for a cumulative XP total, in `1..=MAX_LEVEL`. Negative XP is level 1.
#[must_use]
pub fn level_for_xp(xp: i64) -> i32 {
    let reached = LEVEL_THRESHOLDS.iter().take_while(|&&t| t <= xp).count();
    // The first threshold is 0, so non-negative xp always reaches at least one.
    reached.max(1) as i32
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    pub level: i32,
    pub current_threshold: i64,
    pub next_threshold: Option<i64>,
    pub xp_into_level: i64,
    pub xp_for_next: Option<i64>,
}

#[must_use]
pub fn level_progress(xp: i64) -> LevelProgress {
    let xp = xp.max(0);
    let level = level_for_xp(xp);
    let idx = (level - 1) as usize;
    let current_threshold = LEVEL_THRESHOLDS[idx];
    let next_threshold = LEVEL_THRESHOLDS.get(idx + 1).copied();
    LevelProgress {
        level,
        current_threshold,
        next_threshold,
        xp_into_level: xp - current_threshold,
        xp_for_next: next_threshold.map(|next| next - xp),
    }
}

text_enum! {
    /// Why XP was granted.
    pub enum XpSource("xp source") {
        ArtifactCreated => "artifact_created",
        ChatMessage => "chat_message",
        StoriesGenerated => "stories_generated",
        ImpactAnalysis => "impact_analysis",
        SquadActivated => "squad_activated",
        Mission => "mission",
        MysteryBox => "mystery_box",
    }
}

impl XpSource {
    /// Fixed XP for activity sources. Missions and boxes carry their own amounts.
    #[must_use]
    pub const fn base_xp(&self) -> i64 {
        match *self {
            Self::ArtifactCreated => 50,
            Self::ChatMessage => 5,
            Self::StoriesGenerated => 40,
            Self::ImpactAnalysis => 25,
            Self::SquadActivated => 10,
            Self::Mission | Self::MysteryBox => 0,
        }
    }

    #[must_use]
    pub const fn base_coins(&self) -> i64 {
        match *self {
            Self::ArtifactCreated => 10,
            Self::ChatMessage => 1,
            Self::StoriesGenerated => 8,
            Self::ImpactAnalysis => 5,
            Self::SquadActivated => 2,
            Self::Mission | Self::MysteryBox => 0,
        }
    }
}

/// Per-user progress record. The only place xp, level and streak live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GamificationStats {
    pub user_id: Uuid,
    pub xp: i64,
    pub level: i32,
    pub coins: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_active_on: Option<NaiveDate>,
    pub missions_completed: i32,
    pub artifacts_created: i32,
}

impl GamificationStats {
    #[must_use]
    pub const fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            xp: 0,
            level: 1,
            coins: 0,
            current_streak: 0,
            longest_streak: 0,
            last_active_on: None,
            missions_completed: 0,
            artifacts_created: 0,
        }
    }

    #[must_use]
    pub fn progress(&self) -> LevelProgress {
        level_progress(self.xp)
    }

    /// Add xp and coins, recomputing the level from the new total.
    pub fn apply_award(&mut self, xp: i64, coins: i64) -> XpAward {
        let previous_level = self.level;
        self.xp = (self.xp + xp).max(0);
        self.coins = (self.coins + coins).max(0);
        self.level = level_for_xp(self.xp);
        XpAward {
            previous_level,
            new_level: self.level,
            total_xp: self.xp,
            total_coins: self.coins,
            xp_gained: xp,
            coins_gained: coins,
        }
    }

    /// Register activity on `today` and return the resulting streak change.
    pub fn record_activity(&mut self, today: NaiveDate) -> StreakUpdate {
        let previous = self.current_streak;
        self.current_streak = next_streak(self.last_active_on, self.current_streak, today);
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_active_on = Some(match self.last_active_on {
            Some(last) if last > today => last,
            _ => today,
        });
        StreakUpdate {
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            milestone: (self.current_streak != previous)
                .then(|| streak_milestone_box(self.current_streak))
                .flatten(),
        }
    }
}

/// Streak length after activity on `today`.
///
/// Same day keeps the streak, the following day extends it, any gap restarts
/// at 1. Activity dated before the last active day never changes anything.
#[must_use]
pub fn next_streak(last_active_on: Option<NaiveDate>, current: i32, today: NaiveDate) -> i32 {
    match last_active_on {
        Some(last) if last >= today => current.max(1),
        Some(last) if last.succ_opt() == Some(today) => current + 1,
        _ => 1,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    pub current_streak: i32,
    pub longest_streak: i32,
    /// Box earned by reaching a milestone with this activity.
    pub milestone: Option<Rarity>,
}

/// Result of one XP grant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct XpAward {
    pub previous_level: i32,
    pub new_level: i32,
    pub total_xp: i64,
    pub total_coins: i64,
    pub xp_gained: i64,
    pub coins_gained: i64,
}

impl XpAward {
    #[must_use]
    pub const fn leveled_up(&self) -> bool {
        self.new_level > self.previous_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(250), 1);
        assert_eq!(level_for_xp(299), 1);
        assert_eq!(level_for_xp(300), 2);
        assert_eq!(level_for_xp(699), 2);
        assert_eq!(level_for_xp(700), 3);
        assert_eq!(level_for_xp(14_999), 15);
        assert_eq!(level_for_xp(15_000), 16);
        assert_eq!(level_for_xp(1_000_000), MAX_LEVEL);
        assert_eq!(level_for_xp(-10), 1);
    }

    #[test]
    fn level_is_monotone_and_bounded() {
        let mut previous = level_for_xp(0);
        for xp in (0..20_000).step_by(7) {
            let level = level_for_xp(xp);
            assert!(level >= previous, "xp={xp}");
            assert!((1..=MAX_LEVEL).contains(&level));
            previous = level;
        }
    }

    #[test]
    fn progress_reports_distance_to_next_level() {
        let p = level_progress(450);
        assert_eq!(p.level, 2);
        assert_eq!(p.current_threshold, 300);
        assert_eq!(p.next_threshold, Some(700));
        assert_eq!(p.xp_into_level, 150);
        assert_eq!(p.xp_for_next, Some(250));

        let top = level_progress(20_000);
        assert_eq!(top.level, MAX_LEVEL);
        assert_eq!(top.next_threshold, None);
        assert_eq!(top.xp_for_next, None);
    }

    #[test]
    fn apply_award_recomputes_level() {
        let mut stats = GamificationStats::new(Uuid::new_v4());
        let award = stats.apply_award(250, 10);
        assert!(!award.leveled_up());
        let award = stats.apply_award(XpSource::ArtifactCreated.base_xp(), 0);
        assert_eq!(award.previous_level, 1);
        assert_eq!(award.new_level, 2);
        assert_eq!(award.total_xp, 300);
        assert_eq!(stats.level, 2);
        assert_eq!(stats.coins, 10);
    }

    #[test]
    fn streak_rules() {
        assert_eq!(next_streak(None, 0, day(5)), 1);
        assert_eq!(next_streak(Some(day(5)), 4, day(5)), 4);
        assert_eq!(next_streak(Some(day(4)), 4, day(5)), 5);
        assert_eq!(next_streak(Some(day(2)), 4, day(5)), 1);
        assert_eq!(next_streak(Some(day(6)), 4, day(5)), 4);
    }

    #[test]
    fn streak_milestones_fire_once() {
        let mut stats = GamificationStats::new(Uuid::new_v4());
        assert_eq!(stats.record_activity(day(1)).milestone, None);
        assert_eq!(stats.record_activity(day(2)).milestone, None);
        let third = stats.record_activity(day(3));
        assert_eq!(third.current_streak, 3);
        assert_eq!(third.milestone, Some(Rarity::Common));
        assert_eq!(stats.record_activity(day(3)).milestone, None);

        for d in 4..=7 {
            let update = stats.record_activity(day(d));
            if d == 7 {
                assert_eq!(update.milestone, Some(Rarity::Rare));
            }
        }
        assert_eq!(stats.longest_streak, 7);

        let reset = stats.record_activity(day(10));
        assert_eq!(reset.current_streak, 1);
        assert_eq!(reset.longest_streak, 7);
    }
}
