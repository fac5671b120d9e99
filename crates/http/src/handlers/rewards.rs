use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use pmos_core::{Badge, DailyMission, MysteryBox};
use pmos_service::{BoxOpening, GamificationOverview, MissionCompletion};
use uuid::Uuid;

use crate::AppState;
use crate::api_error::ApiError;
use crate::extract::{AuthUser, ValidPath};

pub async fn get_overview(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
) -> Result<Json<GamificationOverview>, ApiError> {
    Ok(Json(state.services.gamification.overview(profile.id).await?))
}

/// Today's missions. Generated on the first request of the day.
pub async fn list_missions(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
) -> Result<Json<Vec<DailyMission>>, ApiError> {
    Ok(Json(state.services.missions.todays_missions(profile.id).await?))
}

pub async fn complete_mission(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<MissionCompletion>, ApiError> {
    Ok(Json(state.services.missions.complete_mission(profile.id, id).await?))
}

pub async fn list_badges(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
) -> Result<Json<Vec<Badge>>, ApiError> {
    Ok(Json(state.services.gamification.badges(profile.id).await?))
}

pub async fn list_mystery_boxes(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
) -> Result<Json<Vec<MysteryBox>>, ApiError> {
    Ok(Json(state.services.gamification.mystery_boxes(profile.id).await?))
}

pub async fn open_mystery_box(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<BoxOpening>, ApiError> {
    Ok(Json(state.services.gamification.open_mystery_box(profile.id, id).await?))
}
