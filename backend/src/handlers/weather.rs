//! HTTP handlers for weather

use axum::{extract::State, Json};
use shared::WeatherSnapshot;

use crate::error::AppResult;
use crate::services::location::resolve_and_remember;
use crate::AppState;

/// Snapshot for the resolved location
pub async fn get_weather(State(state): State<AppState>) -> AppResult<Json<WeatherSnapshot>> {
    let location = resolve_and_remember(&state.locations, &state.store).await?;
    let snapshot = state
        .weather
        .fetch(&location.city, &location.country)
        .await?;
    Ok(Json(snapshot))
}
