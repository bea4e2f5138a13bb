//! Location models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::GpsCoordinates;

/// The city the garden is in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub city: String,
    /// Country code or name as reported by the provider, e.g. "PK"
    pub country: String,
    pub source: LocationSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GpsCoordinates>,
}

/// How a location was obtained
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    Detected,
    Manual,
    Default,
}

/// A place to buy plants near the garden
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Nursery {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Straight-line distance from the garden
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GpsCoordinates>,
    /// Map link for the place, or a map search when the place is not known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,
}

/// Where a nursery list came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NurserySource {
    /// Real places from OpenStreetMap
    OpenStreetMap,
    /// Map searches for the city, used when no places could be looked up
    Suggested,
}

/// Nurseries around the garden's location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NurseryReport {
    pub location: Location,
    pub source: NurserySource,
    pub radius_km: u32,
    /// Nearest first
    pub nurseries: Vec<Nursery>,
}

impl Location {
    pub fn manual(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
            source: LocationSource::Manual,
            region: None,
            coordinates: None,
        }
    }

    /// The configured fallback used when detection fails entirely
    pub fn fallback(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
            source: LocationSource::Default,
            region: None,
            coordinates: None,
        }
    }

    /// Manual and persisted detected locations are trusted as-is.
    /// A stored default is only a placeholder and should be re-detected.
    pub fn is_confirmed(&self) -> bool {
        matches!(
            self.source,
            LocationSource::Manual | LocationSource::Detected
        )
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.city, self.country)
    }
}
