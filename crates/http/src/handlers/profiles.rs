use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use pmos_core::ProfileView;
use pmos_service::SignUp;

use crate::AppState;
use crate::api_error::ApiError;
use crate::extract::{AuthUser, ValidJson};
use crate::query_types::{SignUpRequest, UpdateProfileRequest};

/// The only unauthenticated write. The returned token is shown once.
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUp>), ApiError> {
    let created = state.services.profiles.sign_up(&req.display_name, req.role).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_me(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
) -> Result<Json<ProfileView>, ApiError> {
    Ok(Json(state.services.profiles.view(profile.id).await?))
}

pub async fn update_me(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
    ValidJson(req): ValidJson<UpdateProfileRequest>,
) -> Result<Json<ProfileView>, ApiError> {
    let view = state
        .services
        .profiles
        .update(profile.id, req.display_name.as_deref(), req.role)
        .await?;
    Ok(Json(view))
}
