//! Impact-queue maintenance. Any authenticated caller may use these; the
//! queue is shared across users.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::Json;
use axum::extract::State;
use pmos_core::ImpactQueueStats;

use crate::AppState;
use crate::api_error::ApiError;
use crate::extract::{AuthUser, ValidJson};
use crate::query_types::ProcessingToggle;
use crate::response_types::{CountResponse, ProcessingStatusResponse};

pub async fn queue_stats(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
) -> Result<Json<ImpactQueueStats>, ApiError> {
    Ok(Json(state.services.impact.queue_stats().await?))
}

pub async fn retry_failed(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
) -> Result<Json<CountResponse>, ApiError> {
    let count = state.services.impact.retry_failed().await?;
    tracing::info!(by = %profile.id, count, "retry of failed impact rows requested");
    Ok(Json(CountResponse { count }))
}

pub async fn clear_failed(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
) -> Result<Json<CountResponse>, ApiError> {
    let count = state.services.impact.clear_failed().await?;
    tracing::info!(by = %profile.id, count, "failed impact rows cleared");
    Ok(Json(CountResponse { count }))
}

pub async fn get_processing(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
) -> Json<ProcessingStatusResponse> {
    Json(ProcessingStatusResponse { active: state.processing_active.load(Ordering::SeqCst) })
}

/// Pause or resume the background impact worker.
pub async fn set_processing(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidJson(req): ValidJson<ProcessingToggle>,
) -> Json<ProcessingStatusResponse> {
    state.processing_active.store(req.active, Ordering::SeqCst);
    tracing::info!(by = %profile.id, active = req.active, "impact worker toggled");
    Json(ProcessingStatusResponse { active: req.active })
}
