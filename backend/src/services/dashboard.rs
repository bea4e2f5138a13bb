//! Dashboard aggregation: location, weather and per-plant care status

use serde::Serialize;
use shared::{evaluate, CareStatus, CareThresholds, Location, Plant, WeatherSnapshot};

use crate::error::{AppError, AppResult, ErrorDetail};
use crate::services::location::{resolve_and_remember, LocationResolver};
use crate::services::{GardenStore, PlantAssistant, WeatherService};

/// An alert worded for display
#[derive(Debug, Clone, Serialize)]
pub struct AlertNotice {
    #[serde(flatten)]
    pub alert: shared::CareAlert,
    pub message: String,
}

/// One plant with its derived status
#[derive(Debug, Clone, Serialize)]
pub struct PlantCard {
    pub plant: Plant,
    /// Absent when no weather snapshot was available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub care: Option<CareStatus>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<AlertNotice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub location: Location,
    pub weather: Option<WeatherSnapshot>,
    /// Why `weather` is missing, with remediation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_error: Option<ErrorDetail>,
    pub plants: Vec<PlantCard>,
}

/// Evaluate every plant against one snapshot
pub fn evaluate_all(
    plants: &[Plant],
    snapshot: &WeatherSnapshot,
    thresholds: &CareThresholds,
) -> Vec<CareStatus> {
    plants
        .iter()
        .map(|plant| evaluate(plant, snapshot, thresholds))
        .collect()
}

/// Build the dashboard. A weather failure degrades the view instead of
/// failing it; the engine is only run when a snapshot exists.
pub async fn build_dashboard(
    store: &GardenStore,
    resolver: &LocationResolver,
    weather: &WeatherService,
    assistant: &PlantAssistant,
    thresholds: &CareThresholds,
) -> AppResult<Dashboard> {
    let location = resolve_and_remember(resolver, store).await?;
    let plants = store.load_plants().await?;

    let snapshot = match weather.fetch(&location.city, &location.country).await {
        Ok(snapshot) => snapshot,
        Err(err @ AppError::WeatherUnavailable(_)) => {
            return Ok(Dashboard {
                location,
                weather: None,
                weather_error: Some(err.detail()),
                plants: plants
                    .into_iter()
                    .map(|plant| PlantCard {
                        plant,
                        care: None,
                        notices: Vec::new(),
                    })
                    .collect(),
            });
        }
        Err(err) => return Err(err),
    };

    let statuses = evaluate_all(&plants, &snapshot, thresholds);
    let mut writer = assistant.alert_writer(&snapshot);
    let mut cards = Vec::with_capacity(plants.len());
    for (plant, care) in plants.into_iter().zip(statuses) {
        let mut notices = Vec::with_capacity(care.alerts.len());
        for alert in &care.alerts {
            notices.push(AlertNotice {
                alert: alert.clone(),
                message: writer.message(alert.kind, &plant).await,
            });
        }
        cards.push(PlantCard {
            plant,
            care: Some(care),
            notices,
        });
    }

    Ok(Dashboard {
        location,
        weather: Some(snapshot),
        weather_error: None,
        plants: cards,
    })
}
