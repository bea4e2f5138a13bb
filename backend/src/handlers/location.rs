//! HTTP handlers for the garden location

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use shared::{Location, NurseryReport};

use crate::error::AppResult;
use crate::services::location;
use crate::AppState;

/// Current location, detecting it when nothing confirmed is stored
pub async fn get_location(State(state): State<AppState>) -> AppResult<Json<Location>> {
    let location = location::resolve_and_remember(&state.locations, &state.store).await?;
    Ok(Json(location))
}

/// Re-run IP detection regardless of what is stored
pub async fn detect_location(State(state): State<AppState>) -> AppResult<Json<Location>> {
    let location = location::redetect(&state.locations, &state.store).await?;
    Ok(Json(location))
}

#[derive(Debug, Deserialize)]
pub struct SetLocationInput {
    pub city: String,
    pub country: String,
}

/// Set the city by hand
pub async fn set_location(
    State(state): State<AppState>,
    Json(input): Json<SetLocationInput>,
) -> AppResult<Json<Location>> {
    let location = location::set_manual(&state.store, &input.city, &input.country).await?;
    Ok(Json(location))
}

#[derive(Debug, Default, Deserialize)]
pub struct NurseryQuery {
    /// Defaults to `location.nursery_radius_km`
    pub radius_km: Option<u32>,
}

/// Plant nurseries near the garden
pub async fn find_nurseries(
    State(state): State<AppState>,
    Query(query): Query<NurseryQuery>,
) -> AppResult<Json<NurseryReport>> {
    let location = location::resolve_and_remember(&state.locations, &state.store).await?;
    Ok(Json(state.nurseries.near(&location, query.radius_km).await))
}
