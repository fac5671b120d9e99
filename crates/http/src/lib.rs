//! HTTP API server for pmos.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(clippy::absolute_paths, reason = "Explicit paths for clarity")]
#![allow(missing_copy_implementations, reason = "Types may grow")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]
#![allow(clippy::shadow_reuse, reason = "Shadowing for Arc clones is idiomatic")]
#![allow(clippy::exhaustive_structs, reason = "HTTP types are stable")]
#![allow(clippy::single_call_fn, reason = "Helper functions improve readability")]

pub mod api_error;
mod extract;
mod handlers;
mod query_types;
mod response_types;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use axum::routing::{delete, get, post};
use axum::{Json, Router};
use pmos_core::RealtimeEvent;
use pmos_llm::LlmClient;
use pmos_service::{EVENT_CHANNEL_CAPACITY, Services};
use pmos_storage::StorageBackend;
use tokio::sync::{Semaphore, broadcast};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use handlers::queue_processor::{run_startup_recovery, start_background_processor};
pub use response_types::VersionResponse;

/// Shared application state for all HTTP handlers.
///
/// Built once at startup and wrapped in `Arc`; there is no other global
/// mutable state.
pub struct AppState {
    pub services: Services,
    /// Realtime events, fanned out to SSE subscribers
    pub event_tx: broadcast::Sender<RealtimeEvent>,
    /// Bounds concurrent impact analyses across manual and background drains
    pub semaphore: Arc<Semaphore>,
    /// Whether the background impact worker drains the queue
    pub processing_active: AtomicBool,
}

impl AppState {
    #[must_use]
    pub fn new(storage: Arc<StorageBackend>, llm: Option<Arc<LlmClient>>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let services = Services::new(storage, llm, event_tx.clone());
        let semaphore = Arc::new(Semaphore::new(services.impact.workers()));
        Self { services, event_tx, semaphore, processing_active: AtomicBool::new(true) }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    use handlers::{
        admin, agents, artifacts, events, functions, impact, profiles, rewards, squads,
    };

    Router::new()
        .route("/health", get(health))
        .route("/api/version", get(version))
        .route("/api/profiles", post(profiles::sign_up))
        .route("/api/profiles/me", get(profiles::get_me).patch(profiles::update_me))
        .route("/api/agents", get(agents::list_agents))
        .route("/api/agents/{slug}", get(agents::get_agent))
        .route("/api/squads", get(squads::list_squads).post(squads::create_squad))
        .route("/api/squads/{id}", get(squads::get_squad).delete(squads::delete_squad))
        .route("/api/squads/{id}/activate", post(squads::activate_squad))
        .route("/api/squads/{id}/agents", post(squads::add_agent))
        .route("/api/squads/{id}/agents/{slug}", delete(squads::remove_agent))
        .route(
            "/api/artifacts",
            get(artifacts::list_artifacts).post(artifacts::create_artifact),
        )
        .route(
            "/api/artifacts/{id}",
            get(artifacts::get_artifact)
                .put(artifacts::update_artifact)
                .delete(artifacts::delete_artifact),
        )
        .route("/api/gamification", get(rewards::get_overview))
        .route("/api/missions", get(rewards::list_missions))
        .route("/api/missions/{id}/complete", post(rewards::complete_mission))
        .route("/api/badges", get(rewards::list_badges))
        .route("/api/mystery-boxes", get(rewards::list_mystery_boxes))
        .route("/api/mystery-boxes/{id}/open", post(rewards::open_mystery_box))
        .route("/api/impact/queue", get(impact::list_queue))
        .route("/api/impact/runs", get(impact::list_runs))
        .route("/api/impact/runs/{id}", get(impact::get_run))
        .route("/api/admin/impact-queue/stats", get(admin::queue_stats))
        .route("/api/admin/impact-queue/retry-failed", post(admin::retry_failed))
        .route("/api/admin/impact-queue/failed", delete(admin::clear_failed))
        .route(
            "/api/admin/impact-queue/processing",
            get(admin::get_processing).post(admin::set_processing),
        )
        .route("/api/events", get(events::sse_events))
        .route("/functions/v1/agent-chat", post(functions::agent_chat))
        .route("/functions/v1/generate-stories", post(functions::generate_stories))
        .route("/functions/v1/generate-prd", post(functions::generate_prd))
        .route("/functions/v1/generate-roadmap", post(functions::generate_roadmap))
        .route("/functions/v1/generate-canvas", post(functions::generate_canvas))
        .route("/functions/v1/analyze-impact", post(functions::analyze_impact))
        .route("/functions/v1/generate-impact-report", post(functions::generate_impact_report))
        .route("/functions/v1/process-impact-queue", post(functions::process_impact_queue))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse { version: env!("CARGO_PKG_VERSION") })
}
