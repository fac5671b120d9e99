use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use pmos_core::{AGENT_CATALOG, find_agent};

use crate::AppState;
use crate::api_error::ApiError;
use crate::extract::{AuthUser, ValidPath};
use crate::response_types::AgentView;

pub async fn list_agents(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
) -> Result<Json<Vec<AgentView>>, ApiError> {
    let xp = state.services.gamification.stats(profile.id).await?.xp;
    let agents = AGENT_CATALOG
        .iter()
        .map(|agent| AgentView { agent, unlocked: agent.is_unlocked(xp) })
        .collect();
    Ok(Json(agents))
}

pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidPath(slug): ValidPath<String>,
) -> Result<Json<AgentView>, ApiError> {
    let agent = find_agent(&slug).ok_or_else(|| ApiError::NotFound(format!("agent {slug} not found")))?;
    let xp = state.services.gamification.stats(profile.id).await?.xp;
    Ok(Json(AgentView { agent, unlocked: agent.is_unlocked(xp) }))
}
