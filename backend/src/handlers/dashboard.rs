//! Dashboard handler

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::{build_dashboard, Dashboard};
use crate::AppState;

/// Location, weather and care status for every plant
pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Json<Dashboard>> {
    let dashboard = build_dashboard(
        &state.store,
        &state.locations,
        &state.weather,
        &state.assistant,
        &state.config.care,
    )
    .await?;
    Ok(Json(dashboard))
}
