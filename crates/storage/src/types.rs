//! Storage types shared across modules

use pmos_core::{UserRole, XpAward, env_parse_with_default};

/// Outcome of an exactly-once reward claim (mission completion, box opening).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardClaim<T> {
    /// This call claimed the reward and the award was applied.
    Awarded { item: T, award: XpAward },
    /// Someone already claimed it. Nothing was awarded.
    AlreadyClaimed(T),
    /// Not claimable yet (mission progress below target).
    NotReady(T),
    NotFound,
}

/// Outcome of making a squad the user's active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquadActivation {
    /// `first_time` is true only for the squad's first ever activation.
    Activated { first_time: bool },
    NotFound,
}

/// Partial profile update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub role: Option<UserRole>,
}

/// Failed attempts before an impact queue row is parked as `failed`.
#[must_use]
pub fn max_retry_count() -> i32 {
    env_parse_with_default("PMOS_MAX_RETRY", 3i32)
}

/// Seconds after which a `processing` claim is considered abandoned.
#[must_use]
pub fn default_visibility_timeout_secs() -> i64 {
    env_parse_with_default("PMOS_VISIBILITY_TIMEOUT", 300i64)
}

/// Convert `usize` to `i64` for SQL LIMIT binds, saturating on overflow.
pub(crate) fn usize_to_i64(val: usize) -> i64 {
    i64::try_from(val).unwrap_or(i64::MAX)
}

pub(crate) fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, pmos_core::MAX_QUERY_LIMIT)
}
