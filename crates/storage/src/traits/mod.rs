//! Storage backend trait abstraction
//!
//! Async domain traits implemented by the PostgreSQL and in-memory backends
//! and dispatched through `StorageBackend`.

pub mod artifact;
pub mod gamification;
pub mod impact;
pub mod mission;
pub mod profile;
pub mod squad;

pub use artifact::ArtifactStore;
pub use gamification::GamificationStore;
pub use impact::ImpactStore;
pub use mission::MissionStore;
pub use profile::ProfileStore;
pub use squad::SquadStore;
