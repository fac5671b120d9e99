//! Service layer for pmos
//!
//! Centralizes business logic between HTTP handlers and storage/llm. Every
//! reward (xp, coins, boxes, badges) flows through [`GamificationService`],
//! and every state change worth showing live is published on the realtime
//! broadcast channel.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::cognitive_complexity, reason = "Complex async flows are inherent")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod artifact_service;
mod error;
mod events;
mod gamification_service;
mod generation_service;
mod impact_service;
mod mission_service;
mod profile_service;
mod squad_service;
#[cfg(test)]
mod tests;

use std::sync::Arc;

pub use artifact_service::{ArtifactService, NewArtifact};
pub use error::ServiceError;
pub use events::EVENT_CHANNEL_CAPACITY;
pub use gamification_service::{BoxOpening, GamificationOverview, GamificationService, RewardOutcome};
pub use generation_service::{AgentChatReply, Generated, GenerationService};
pub use impact_service::{GeneratedReport, ImpactAnalysis, ImpactService};
pub use mission_service::{MissionCompletion, MissionService};
pub use profile_service::{ProfileService, SignUp};
pub use squad_service::SquadService;

use pmos_core::RealtimeEvent;
use pmos_llm::LlmClient;
use pmos_storage::StorageBackend;
use tokio::sync::broadcast;

/// Every service, wired once over shared storage and one event channel.
#[derive(Clone)]
pub struct Services {
    pub profiles: Arc<ProfileService>,
    pub gamification: Arc<GamificationService>,
    pub missions: Arc<MissionService>,
    pub squads: Arc<SquadService>,
    pub artifacts: Arc<ArtifactService>,
    pub generation: Arc<GenerationService>,
    pub impact: Arc<ImpactService>,
}

impl Services {
    #[must_use]
    pub fn new(
        storage: Arc<StorageBackend>,
        llm: Option<Arc<LlmClient>>,
        event_tx: broadcast::Sender<RealtimeEvent>,
    ) -> Self {
        let profiles = Arc::new(ProfileService::new(Arc::clone(&storage)));
        let gamification =
            Arc::new(GamificationService::new(Arc::clone(&storage), event_tx.clone()));
        let missions = Arc::new(MissionService::new(
            Arc::clone(&storage),
            Arc::clone(&gamification),
            event_tx.clone(),
        ));
        let squads = Arc::new(SquadService::new(
            Arc::clone(&storage),
            Arc::clone(&gamification),
            Arc::clone(&missions),
            event_tx.clone(),
        ));
        let artifacts = Arc::new(ArtifactService::new(
            Arc::clone(&storage),
            Arc::clone(&gamification),
            Arc::clone(&missions),
            event_tx.clone(),
        ));
        let generation = Arc::new(GenerationService::new(
            llm.clone(),
            Arc::clone(&artifacts),
            Arc::clone(&squads),
            Arc::clone(&gamification),
            Arc::clone(&missions),
        ));
        let impact = Arc::new(ImpactService::new(
            storage,
            llm,
            Arc::clone(&artifacts),
            Arc::clone(&gamification),
            Arc::clone(&missions),
            event_tx,
        ));
        Self { profiles, gamification, missions, squads, artifacts, generation, impact }
    }
}
