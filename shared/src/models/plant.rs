//! Plant models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked houseplant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plant {
    pub id: Uuid,
    /// Common species name, e.g. "Money Plant"
    pub species: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    pub placement: Placement,
    pub sun_preference: SunPreference,
    /// Base watering interval in days (always >= 1)
    pub watering_interval_days: u32,
    pub last_watered: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Where the plant physically sits
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    OpenRoof,
    Balcony,
    IndoorWindow,
}

impl Placement {
    /// Outdoor placements are exposed to rain, storms and direct heat
    pub fn is_outdoor(&self) -> bool {
        !matches!(self, Placement::IndoorWindow)
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Placement::OpenRoof => write!(f, "Open Roof"),
            Placement::Balcony => write!(f, "Balcony"),
            Placement::IndoorWindow => write!(f, "Indoor Window"),
        }
    }
}

/// How much direct sun the plant likes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SunPreference {
    FullSun,
    PartialSun,
    Shade,
}

impl std::fmt::Display for SunPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SunPreference::FullSun => write!(f, "Full Sun"),
            SunPreference::PartialSun => write!(f, "Partial Sun"),
            SunPreference::Shade => write!(f, "Shade"),
        }
    }
}

/// Input for adding a plant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlant {
    pub species: String,
    #[serde(default)]
    pub scientific_name: Option<String>,
    pub placement: Placement,
    pub sun_preference: SunPreference,
    pub watering_interval_days: u32,
    #[serde(default)]
    pub last_watered: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update for an existing plant; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlantUpdate {
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub placement: Option<Placement>,
    #[serde(default)]
    pub sun_preference: Option<SunPreference>,
    #[serde(default)]
    pub watering_interval_days: Option<u32>,
    #[serde(default)]
    pub last_watered: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Plant {
    /// Create a plant record with a fresh identifier
    pub fn new(input: NewPlant, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            species: input.species.trim().to_string(),
            scientific_name: input.scientific_name,
            placement: input.placement,
            sun_preference: input.sun_preference,
            watering_interval_days: input.watering_interval_days,
            last_watered: input.last_watered,
            notes: input.notes,
            created_at: now,
        }
    }

    /// Apply an explicit edit. `id` and `created_at` never change.
    pub fn apply(&mut self, update: PlantUpdate) {
        if let Some(species) = update.species {
            self.species = species.trim().to_string();
        }
        if update.scientific_name.is_some() {
            self.scientific_name = update.scientific_name;
        }
        if let Some(placement) = update.placement {
            self.placement = placement;
        }
        if let Some(sun_preference) = update.sun_preference {
            self.sun_preference = sun_preference;
        }
        if let Some(days) = update.watering_interval_days {
            self.watering_interval_days = days;
        }
        if update.last_watered.is_some() {
            self.last_watered = update.last_watered;
        }
        if update.notes.is_some() {
            self.notes = update.notes;
        }
    }
}
