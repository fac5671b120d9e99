use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use pmos_core::{ImpactQueueItem, ImpactRun, ImpactRunDetail};
use uuid::Uuid;

use crate::AppState;
use crate::api_error::ApiError;
use crate::extract::{AuthUser, ValidPath, ValidQuery};
use crate::query_types::{LimitQuery, RunsQuery};

pub async fn list_queue(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidQuery(query): ValidQuery<LimitQuery>,
) -> Result<Json<Vec<ImpactQueueItem>>, ApiError> {
    Ok(Json(state.services.impact.list_queue(profile.id, query.limit).await?))
}

pub async fn list_runs(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidQuery(query): ValidQuery<RunsQuery>,
) -> Result<Json<Vec<ImpactRun>>, ApiError> {
    let runs = state.services.impact.list_runs(profile.id, query.artifact_id, query.limit).await?;
    Ok(Json(runs))
}

/// A run with its scored items.
pub async fn get_run(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<ImpactRunDetail>, ApiError> {
    Ok(Json(state.services.impact.get_run(profile.id, id).await?))
}
