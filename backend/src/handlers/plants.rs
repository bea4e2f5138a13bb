//! HTTP handlers for plant management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::{care_tips, evaluate, CareStatus, CareTips, NewPlant, Plant, PlantUpdate};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::location::resolve_and_remember;
use crate::AppState;

/// List all plants
pub async fn list_plants(State(state): State<AppState>) -> AppResult<Json<Vec<Plant>>> {
    Ok(Json(state.store.load_plants().await?))
}

/// Add a plant
pub async fn create_plant(
    State(state): State<AppState>,
    Json(input): Json<NewPlant>,
) -> AppResult<(StatusCode, Json<Plant>)> {
    let plant = state.store.add_plant(input).await?;
    Ok((StatusCode::CREATED, Json(plant)))
}

/// Get a plant by ID
pub async fn get_plant(
    State(state): State<AppState>,
    Path(plant_id): Path<Uuid>,
) -> AppResult<Json<Plant>> {
    Ok(Json(state.store.get_plant(plant_id).await?))
}

/// Update a plant
pub async fn update_plant(
    State(state): State<AppState>,
    Path(plant_id): Path<Uuid>,
    Json(update): Json<PlantUpdate>,
) -> AppResult<Json<Plant>> {
    Ok(Json(state.store.update_plant(plant_id, update).await?))
}

/// Delete a plant
pub async fn delete_plant(
    State(state): State<AppState>,
    Path(plant_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.store.delete_plant(plant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
pub struct WaterInput {
    /// Defaults to now
    pub watered_at: Option<DateTime<Utc>>,
}

/// Record a watering
pub async fn water_plant(
    State(state): State<AppState>,
    Path(plant_id): Path<Uuid>,
    input: Option<Json<WaterInput>>,
) -> AppResult<Json<Plant>> {
    let watered_at = input
        .and_then(|Json(input)| input.watered_at)
        .unwrap_or_else(Utc::now);
    Ok(Json(state.store.mark_watered(plant_id, watered_at).await?))
}

/// Care status for one plant against current weather
pub async fn get_plant_care(
    State(state): State<AppState>,
    Path(plant_id): Path<Uuid>,
) -> AppResult<Json<CareStatus>> {
    let plant = state.store.get_plant(plant_id).await?;
    let location = resolve_and_remember(&state.locations, &state.store).await?;
    let snapshot = state
        .weather
        .fetch(&location.city, &location.country)
        .await?;

    Ok(Json(evaluate(&plant, &snapshot, &state.config.care)))
}

/// Static care tips by common name
pub async fn get_care_tips(Path(species): Path<String>) -> Json<CareTips> {
    Json(care_tips(&species))
}
