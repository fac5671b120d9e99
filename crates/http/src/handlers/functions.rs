//! `POST /functions/v1/*`: LLM-backed functions.
//!
//! Each handler validates its request, delegates to a service and shapes the
//! response. Upstream 429/402 surface with the gateway's own body.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use pmos_core::DrainReport;
use pmos_llm::PrdBrief;
use pmos_service::{AgentChatReply, GeneratedReport, ImpactAnalysis};

use crate::AppState;
use crate::api_error::ApiError;
use crate::extract::{AuthUser, ValidJson};
use crate::handlers::queue_processor::drain_with_permits;
use crate::query_types::{
    AgentChatRequest, AnalyzeImpactRequest, GenerateCanvasRequest, GeneratePrdRequest,
    GenerateRoadmapRequest, GenerateStoriesRequest, ImpactReportRequest, ProcessQueueRequest,
};
use crate::response_types::{CanvasResponse, PrdResponse, RoadmapResponse, StoriesResponse};

pub async fn agent_chat(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidJson(req): ValidJson<AgentChatRequest>,
) -> Result<Json<AgentChatReply>, ApiError> {
    let reply = state
        .services
        .generation
        .agent_chat(profile.id, &req.agent_slug, &req.messages, req.squad_id)
        .await?;
    Ok(Json(reply))
}

pub async fn generate_stories(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidJson(req): ValidJson<GenerateStoriesRequest>,
) -> Result<Json<StoriesResponse>, ApiError> {
    let opts = req.options;
    let generated = state
        .services
        .generation
        .stories(profile.id, &req.epic, opts.story_count, opts.persona.as_deref(), opts.save)
        .await?;
    Ok(Json(StoriesResponse { stories: generated.value, artifact_id: generated.artifact_id }))
}

pub async fn generate_prd(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidJson(req): ValidJson<GeneratePrdRequest>,
) -> Result<Json<PrdResponse>, ApiError> {
    let brief = PrdBrief {
        product_name: req.product_name,
        problem: req.problem,
        target_users: req.target_users,
        goals: req.goals,
    };
    let generated = state.services.generation.prd(profile.id, &brief, req.save).await?;
    Ok(Json(PrdResponse { prd: generated.value, artifact_id: generated.artifact_id }))
}

pub async fn generate_roadmap(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidJson(req): ValidJson<GenerateRoadmapRequest>,
) -> Result<Json<RoadmapResponse>, ApiError> {
    let generated = state
        .services
        .generation
        .roadmap(profile.id, &req.product_name, &req.goals, req.horizon_quarters, req.save)
        .await?;
    Ok(Json(RoadmapResponse { roadmap: generated.value, artifact_id: generated.artifact_id }))
}

pub async fn generate_canvas(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidJson(req): ValidJson<GenerateCanvasRequest>,
) -> Result<Json<CanvasResponse>, ApiError> {
    let generated = state
        .services
        .generation
        .canvas(profile.id, &req.product_name, &req.idea, req.save)
        .await?;
    Ok(Json(CanvasResponse { canvas: generated.value, artifact_id: generated.artifact_id }))
}

/// `userId` is part of the payload for compatibility and must name the caller.
pub async fn analyze_impact(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidJson(req): ValidJson<AnalyzeImpactRequest>,
) -> Result<Json<ImpactAnalysis>, ApiError> {
    if req.user_id != profile.id {
        return Err(ApiError::Forbidden("userId does not match the authenticated user".into()));
    }
    let analysis = state
        .services
        .impact
        .analyze(profile.id, req.artefact_id, &req.document_name, &req.document_text)
        .await?;
    Ok(Json(analysis))
}

pub async fn generate_impact_report(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidJson(req): ValidJson<ImpactReportRequest>,
) -> Result<Json<GeneratedReport>, ApiError> {
    Ok(Json(state.services.impact.generate_report(profile.id, req.run_id).await?))
}

pub async fn process_impact_queue(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidJson(req): ValidJson<ProcessQueueRequest>,
) -> Result<Json<DrainReport>, ApiError> {
    tracing::debug!(by = %profile.id, limit = ?req.limit, "manual impact drain");
    Ok(Json(drain_with_permits(&state, req.limit).await?))
}
