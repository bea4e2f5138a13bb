//! Weather data models

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Cloud cover assumed when the provider omits it
pub const UNKNOWN_CLOUD_COVER_PERCENT: u8 = 50;

/// A single normalized read of current conditions plus forecast for one city
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSnapshot {
    pub city: String,
    pub country: String,
    /// Instant the snapshot was taken; all relative times are measured from here
    pub observed_at: DateTime<Utc>,
    pub temperature_celsius: Decimal,
    pub condition: WeatherCondition,
    pub cloud_cover_percent: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset: Option<DateTime<Utc>>,
    /// Rainfall reported with current conditions (last 1h, else last 3h)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_rain_mm: Option<Decimal>,
    /// Ordered by time
    pub forecast: Vec<ForecastPoint>,
}

/// A timestamped forecast entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastPoint {
    pub time: DateTime<Utc>,
    pub condition: WeatherCondition,
    /// Probability of precipitation (0-1)
    pub precipitation_probability: Decimal,
    pub temperature_celsius: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain_mm: Option<Decimal>,
}

/// Provider condition code with its text
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeatherCondition {
    /// OpenWeatherMap weather condition id
    pub code: u16,
    pub main: String,
    pub description: String,
}

/// Condition groups
/// See: https://openweathermap.org/weather-conditions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConditionCategory {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Atmosphere,
    Clear,
    Clouds,
    Hail,
    Extreme,
    Unknown,
}

impl ConditionCategory {
    pub fn from_code(code: u16) -> Self {
        match code {
            200..=232 => Self::Thunderstorm,
            300..=321 => Self::Drizzle,
            500..=531 => Self::Rain,
            600..=622 => Self::Snow,
            701..=781 => Self::Atmosphere,
            800 => Self::Clear,
            801..=804 => Self::Clouds,
            906 => Self::Hail,
            // Legacy extreme codes: tornado, tropical storm, hurricane
            900..=902 => Self::Extreme,
            _ => Self::Unknown,
        }
    }
}

impl WeatherCondition {
    pub fn new(code: u16, main: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code,
            main: main.into(),
            description: description.into(),
        }
    }

    pub fn category(&self) -> ConditionCategory {
        ConditionCategory::from_code(self.code)
    }

    /// Thunderstorm, hail or extreme storm
    pub fn is_storm(&self) -> bool {
        matches!(
            self.category(),
            ConditionCategory::Thunderstorm | ConditionCategory::Hail | ConditionCategory::Extreme
        )
    }

    /// Conditions that water the plants by themselves
    pub fn is_wet(&self) -> bool {
        matches!(
            self.category(),
            ConditionCategory::Thunderstorm | ConditionCategory::Drizzle | ConditionCategory::Rain
        )
    }
}

impl WeatherSnapshot {
    /// Forecast entries with `observed_at <= time <= observed_at + window`
    pub fn upcoming(&self, window: Duration) -> impl Iterator<Item = &ForecastPoint> + '_ {
        let start = self.observed_at;
        let end = start + window;
        self.forecast
            .iter()
            .filter(move |point| point.time >= start && point.time <= end)
    }

    /// Whether current conditions report rain that has already fallen
    pub fn had_recent_rain(&self) -> bool {
        self.recent_rain_mm
            .map(|mm| mm > Decimal::ZERO)
            .unwrap_or(false)
            || self.condition.is_wet()
    }
}
