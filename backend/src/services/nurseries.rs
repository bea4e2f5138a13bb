//! Nearby plant nursery search
//!
//! Places come from OpenStreetMap when the location has coordinates. When it
//! has none, or the lookup fails or finds nothing, the report carries map
//! searches for the city instead.

use reqwest::Url;
use shared::{Location, Nursery, NurseryReport, NurserySource};

use crate::config::LocationConfig;
use crate::error::{AppError, AppResult};
use crate::external::OverpassClient;

const MAX_RADIUS_KM: u32 = 50;
const MAP_SEARCH_URL: &str = "https://www.openstreetmap.org/search";

#[derive(Clone)]
pub struct NurseryFinder {
    client: OverpassClient,
    radius_km: u32,
}

impl NurseryFinder {
    pub fn new(client: OverpassClient, radius_km: u32) -> Self {
        Self {
            client,
            radius_km: radius_km.clamp(1, MAX_RADIUS_KM),
        }
    }

    pub fn from_config(config: &LocationConfig) -> AppResult<Self> {
        let client = OverpassClient::new(&config.overpass_url, config.timeout_secs)
            .map_err(|e| AppError::Configuration(e.to_string()))?;
        Ok(Self::new(client, config.nursery_radius_km))
    }

    /// Nurseries around `location`, nearest first
    pub async fn near(&self, location: &Location, radius_km: Option<u32>) -> NurseryReport {
        let radius_km = radius_km
            .unwrap_or(self.radius_km)
            .clamp(1, MAX_RADIUS_KM);

        let found = match &location.coordinates {
            Some(center) => match self.client.find_nurseries(center, radius_km).await {
                Ok(found) if !found.is_empty() => Some(found),
                Ok(_) => {
                    tracing::info!(
                        "No nurseries within {} km of {}, suggesting map searches",
                        radius_km,
                        location.city
                    );
                    None
                }
                Err(e) => {
                    tracing::warn!("Nursery lookup for {} failed: {}", location.city, e);
                    None
                }
            },
            None => {
                tracing::debug!("No coordinates for {}, suggesting map searches", location.city);
                None
            }
        };

        let (source, nurseries) = match found {
            Some(found) => (NurserySource::OpenStreetMap, found),
            None => (NurserySource::Suggested, suggestions(location)),
        };

        NurseryReport {
            location: location.clone(),
            source,
            radius_km,
            nurseries,
        }
    }
}

/// Map searches for the kinds of places that sell plants
fn suggestions(location: &Location) -> Vec<Nursery> {
    ["Plant nurseries", "Garden centres", "Florists"]
        .iter()
        .map(|kind| {
            let name = format!("{} in {}", kind, location.city);
            let query = format!("{} {}, {}", kind, location.city, location.country);
            Nursery {
                map_url: Url::parse_with_params(MAP_SEARCH_URL, &[("query", query.as_str())])
                    .ok()
                    .map(String::from),
                name,
                address: None,
                phone: None,
                distance_km: None,
                coordinates: None,
            }
        })
        .collect()
}
