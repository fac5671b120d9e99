use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use pmos_core::Squad;
use uuid::Uuid;

use crate::AppState;
use crate::api_error::ApiError;
use crate::extract::{AuthUser, ValidJson, ValidPath};
use crate::query_types::{AddAgentRequest, CreateSquadRequest};

pub async fn list_squads(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
) -> Result<Json<Vec<Squad>>, ApiError> {
    Ok(Json(state.services.squads.list(profile.id).await?))
}

pub async fn create_squad(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidJson(req): ValidJson<CreateSquadRequest>,
) -> Result<(StatusCode, Json<Squad>), ApiError> {
    let squad = state.services.squads.create(profile.id, &req.name, req.description).await?;
    Ok((StatusCode::CREATED, Json(squad)))
}

pub async fn get_squad(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<Squad>, ApiError> {
    Ok(Json(state.services.squads.get(profile.id, id).await?))
}

pub async fn delete_squad(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.services.squads.delete(profile.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn activate_squad(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<Squad>, ApiError> {
    Ok(Json(state.services.squads.activate(profile.id, id).await?))
}

pub async fn add_agent(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(req): ValidJson<AddAgentRequest>,
) -> Result<Json<Squad>, ApiError> {
    Ok(Json(state.services.squads.add_agent(profile.id, id, &req.agent_slug).await?))
}

pub async fn remove_agent(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidPath((id, slug)): ValidPath<(Uuid, String)>,
) -> Result<Json<Squad>, ApiError> {
    Ok(Json(state.services.squads.remove_agent(profile.id, id, &slug).await?))
}
