//! Derived plant-care status models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coarse estimate of direct sunlight a plant is receiving
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SunExposure {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for SunExposure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SunExposure::Low => write!(f, "Low"),
            SunExposure::Medium => write!(f, "Medium"),
            SunExposure::High => write!(f, "High"),
        }
    }
}

/// How strong the sun is right now, from time of day and cloud cover
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SunIntensity {
    Night,
    Low,
    Medium,
    MediumHigh,
    High,
}

/// Risk of sun or heat stress
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
}

/// Time-of-day sun reading that accompanies the exposure estimate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SunAnalysis {
    pub intensity: SunIntensity,
    /// Between sunrise and sunset at `observed_at`; assumed when unknown
    pub is_daytime: bool,
    /// Remaining direct-sun hours for this placement, one decimal place
    pub sun_hours: Decimal,
    pub risk_level: RiskLevel,
    pub recommendation: String,
}

/// Weather alert kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Rain,
    Storm,
    Heat,
}

/// An active alert for one plant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CareAlert {
    pub kind: AlertKind,
    /// Minutes from the snapshot until the first matching forecast entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes_until: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

/// Why the watering decision came out the way it did
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WateringReason {
    NeverWatered,
    IntervalElapsed,
    NotYetDue { days_remaining: i64 },
    RainExpected,
    RecentRain,
}

/// Watering decision detail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WateringStatus {
    pub due: bool,
    pub days_since_watered: Option<i64>,
    pub effective_interval_days: u32,
    pub urgency: Urgency,
    pub reason: WateringReason,
}

/// Everything derived for one plant from one weather snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CareStatus {
    pub plant_id: Uuid,
    pub needs_water: bool,
    pub sun_exposure: SunExposure,
    pub sun: SunAnalysis,
    /// At most one entry per kind, in Rain, Storm, Heat order
    pub alerts: Vec<CareAlert>,
    pub watering: WateringStatus,
}

impl CareStatus {
    pub fn has_alert(&self, kind: AlertKind) -> bool {
        self.alerts.iter().any(|a| a.kind == kind)
    }

    pub fn alert(&self, kind: AlertKind) -> Option<&CareAlert> {
        self.alerts.iter().find(|a| a.kind == kind)
    }
}

/// Longest lookahead the fetched forecast can serve (16 three-hourly entries)
pub const MAX_LOOKAHEAD_HOURS: u32 = 48;

/// Spacing of forecast entries
pub const FORECAST_STEP_HOURS: u32 = 3;

/// Tunable thresholds for the care rules
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CareThresholds {
    /// Temperatures strictly above this trigger heat handling (°C)
    pub heat_threshold_celsius: Decimal,
    /// Forecast precipitation probability strictly above this counts as rain (0-1)
    pub rain_probability_threshold: Decimal,
    /// Forward window scanned for rain and storms, at most [`MAX_LOOKAHEAD_HOURS`]
    pub lookahead_hours: u32,
    /// Multiplier applied to the watering interval in heat
    pub heat_interval_factor: Decimal,
}

impl Default for CareThresholds {
    fn default() -> Self {
        Self {
            heat_threshold_celsius: Decimal::from(35),
            rain_probability_threshold: Decimal::new(5, 1),
            lookahead_hours: 24,
            heat_interval_factor: Decimal::new(5, 1),
        }
    }
}
