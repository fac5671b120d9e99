//! Shared constants for pmos.

/// Maximum number of results for any list query (DoS protection).
pub const MAX_QUERY_LIMIT: usize = 1000;

/// Default number of results when limit is not specified by the caller.
pub const DEFAULT_QUERY_LIMIT: usize = 50;

/// PostgreSQL connection pool: maximum connections.
pub const PG_POOL_MAX_CONNECTIONS: u32 = 20;

/// PostgreSQL connection pool: acquire timeout in seconds.
pub const PG_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// PostgreSQL connection pool: idle timeout in seconds.
pub const PG_POOL_IDLE_TIMEOUT_SECS: u64 = 300;

/// Maximum number of agents in one squad.
pub const MAX_SQUAD_SIZE: usize = 6;

/// Stories generated when the caller does not ask for a count.
pub const DEFAULT_STORY_COUNT: usize = 5;

/// Upper bound for `storyCount` on story generation.
pub const MAX_STORY_COUNT: usize = 20;

/// Default number of quarters in a generated roadmap.
pub const DEFAULT_ROADMAP_QUARTERS: usize = 4;

/// Upper bound for roadmap horizon.
pub const MAX_ROADMAP_QUARTERS: usize = 8;

/// Impact queue rows drained per invocation unless configured otherwise.
pub const DEFAULT_IMPACT_DRAIN_LIMIT: usize = 10;

/// Longest document text accepted by impact analysis.
pub const MAX_DOCUMENT_CHARS: usize = 50_000;

/// Longest chat history forwarded to the gateway.
pub const MAX_CHAT_MESSAGES: usize = 40;

/// Daily missions offered per user per day.
pub const DAILY_MISSION_COUNT: usize = 3;
