//! HTTP handlers for the gardener profile

use axum::{extract::State, Json};
use shared::{ProfileInput, UserProfile};

use crate::error::{AppError, AppResult};
use crate::AppState;

pub async fn get_profile(State(state): State<AppState>) -> AppResult<Json<UserProfile>> {
    state
        .store
        .load_profile()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No profile saved".to_string()))
}

/// Create or replace the profile
pub async fn update_profile(
    State(state): State<AppState>,
    Json(input): Json<ProfileInput>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(state.store.save_profile(input).await?))
}
