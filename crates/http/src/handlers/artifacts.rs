use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use pmos_core::Artifact;
use pmos_service::NewArtifact;
use uuid::Uuid;

use crate::AppState;
use crate::api_error::ApiError;
use crate::extract::{AuthUser, ValidJson, ValidPath, ValidQuery};
use crate::query_types::{ArtifactQuery, CreateArtifactRequest, UpdateArtifactRequest};

pub async fn list_artifacts(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidQuery(query): ValidQuery<ArtifactQuery>,
) -> Result<Json<Vec<Artifact>>, ApiError> {
    let artifacts =
        state.services.artifacts.list(profile.id, query.artifact_type, query.limit).await?;
    Ok(Json(artifacts))
}

pub async fn create_artifact(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidJson(req): ValidJson<CreateArtifactRequest>,
) -> Result<(StatusCode, Json<Artifact>), ApiError> {
    let input = NewArtifact {
        title: req.title,
        content: req.content,
        product_context_id: req.product_context_id,
        prd_id: req.prd_id,
    };
    let artifact = state.services.artifacts.create(profile.id, input).await?;
    Ok((StatusCode::CREATED, Json(artifact)))
}

pub async fn get_artifact(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<Artifact>, ApiError> {
    Ok(Json(state.services.artifacts.get(profile.id, id).await?))
}

pub async fn update_artifact(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(req): ValidJson<UpdateArtifactRequest>,
) -> Result<Json<Artifact>, ApiError> {
    Ok(Json(state.services.artifacts.update(profile.id, id, req.content).await?))
}

pub async fn delete_artifact(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.services.artifacts.delete(profile.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
