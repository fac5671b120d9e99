use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

text_enum! {
    pub enum Rarity("rarity") {
        Common => "common",
        Rare => "rare",
        Legendary => "legendary",
    }
}

impl Rarity {
    #[must_use]
    pub const fn reward_xp(&self) -> i64 {
        match *self {
            Self::Common => 25,
            Self::Rare => 75,
            Self::Legendary => 250,
        }
    }

    #[must_use]
    pub const fn reward_coins(&self) -> i64 {
        match *self {
            Self::Common => 10,
            Self::Rare => 40,
            Self::Legendary => 150,
        }
    }
}

text_enum! {
    pub enum BoxSource("box source") {
        StreakMilestone => "streak_milestone",
        LevelUp => "level_up",
    }
}

/// Box granted when a streak reaches exactly `streak` days, if any.
#[must_use]
pub const fn streak_milestone_box(streak: i32) -> Option<Rarity> {
    match streak {
        3 => Some(Rarity::Common),
        7 => Some(Rarity::Rare),
        30 => Some(Rarity::Legendary),
        _ => None,
    }
}

/// Box granted for reaching `level`. Every fifth level is rare.
#[must_use]
pub const fn level_up_box(level: i32) -> Rarity {
    if level % 5 == 0 { Rarity::Rare } else { Rarity::Common }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MysteryBox {
    pub id: Uuid,
    pub user_id: Uuid,
    pub rarity: Rarity,
    pub reward_xp: i64,
    pub reward_coins: i64,
    pub source: BoxSource,
    pub created_at: DateTime<Utc>,
    pub opened_at: Option<DateTime<Utc>>,
}

impl MysteryBox {
    /// New unopened box with rewards taken from the rarity table.
    #[must_use]
    pub fn new(user_id: Uuid, rarity: Rarity, source: BoxSource) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            rarity,
            reward_xp: rarity.reward_xp(),
            reward_coins: rarity.reward_coins(),
            source,
            created_at: Utc::now(),
            opened_at: None,
        }
    }

    #[must_use]
    pub const fn is_opened(&self) -> bool {
        self.opened_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewards_follow_rarity_table() {
        let b = MysteryBox::new(Uuid::new_v4(), Rarity::Legendary, BoxSource::StreakMilestone);
        assert_eq!((b.reward_xp, b.reward_coins), (250, 150));
        assert!(!b.is_opened());
        assert!(Rarity::Common.reward_xp() < Rarity::Rare.reward_xp());
    }

    #[test]
    fn milestones() {
        assert_eq!(streak_milestone_box(2), None);
        assert_eq!(streak_milestone_box(3), Some(Rarity::Common));
        assert_eq!(streak_milestone_box(7), Some(Rarity::Rare));
        assert_eq!(streak_milestone_box(30), Some(Rarity::Legendary));
        assert_eq!(level_up_box(4), Rarity::Common);
        assert_eq!(level_up_box(10), Rarity::Rare);
    }
}
