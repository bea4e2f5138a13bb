//! Weather API client for fetching weather data
//!
//! Integrates with OpenWeatherMap API for current conditions and 3-hourly
//! forecasts, normalized into the shared weather models.

use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    ForecastPoint, WeatherCondition, FORECAST_STEP_HOURS, MAX_LOOKAHEAD_HOURS,
    UNKNOWN_CLOUD_COVER_PERCENT,
};

use super::{check_status, http_client, ProviderError};

/// Forecast entries kept per fetch; covers the longest allowed lookahead
pub const MAX_FORECAST_POINTS: usize = (MAX_LOOKAHEAD_HOURS / FORECAST_STEP_HOURS) as usize;

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// Current conditions, normalized
#[derive(Debug, Clone)]
pub struct CurrentWeather {
    pub temperature_celsius: Decimal,
    pub condition: WeatherCondition,
    pub cloud_cover_percent: u8,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    /// Rain in the last hour, else the last three hours
    pub recent_rain_mm: Option<Decimal>,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
struct OWMCurrentResponse {
    #[serde(default)]
    weather: Vec<OWMWeather>,
    main: OWMMain,
    clouds: Option<OWMClouds>,
    rain: Option<OWMRain>,
    sys: Option<OWMSys>,
}

#[derive(Debug, Deserialize)]
struct OWMWeather {
    id: u16,
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OWMClouds {
    all: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OWMRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
    #[serde(rename = "3h")]
    three_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OWMSys {
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

/// OpenWeatherMap API response for forecast
#[derive(Debug, Deserialize)]
struct OWMForecastResponse {
    list: Vec<OWMForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OWMForecastItem {
    dt: i64,
    main: OWMMain,
    #[serde(default)]
    weather: Vec<OWMWeather>,
    pop: Option<f64>,
    rain: Option<OWMRain>,
}

fn dec(value: f64) -> Decimal {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp(2))
        .unwrap_or_default()
}

fn condition(weather: &[OWMWeather]) -> WeatherCondition {
    weather
        .first()
        .map(|w| WeatherCondition::new(w.id, w.main.clone(), w.description.clone()))
        .unwrap_or_default()
}

fn cloud_cover(clouds: Option<OWMClouds>) -> u8 {
    clouds
        .and_then(|c| c.all)
        .map(|all| all.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(UNKNOWN_CLOUD_COVER_PERCENT)
}

impl WeatherClient {
    /// Create a new WeatherClient
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn get(
        &self,
        endpoint: &str,
        city: &str,
        country: &str,
    ) -> Result<reqwest::Response, ProviderError> {
        if !self.has_key() {
            return Err(ProviderError::MissingKey);
        }

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint);
        let query = format!("{},{}", city, country);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        check_status(response).await
    }

    /// Fetch current weather conditions by city and country
    pub async fn get_current_weather(
        &self,
        city: &str,
        country: &str,
    ) -> Result<CurrentWeather, ProviderError> {
        let data: OWMCurrentResponse = self
            .get("weather", city, country)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(Self::convert_current_response(data))
    }

    /// Fetch the 3-hourly forecast by city and country
    pub async fn get_forecast(
        &self,
        city: &str,
        country: &str,
    ) -> Result<Vec<ForecastPoint>, ProviderError> {
        let data: OWMForecastResponse = self
            .get("forecast", city, country)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(Self::convert_forecast_response(data))
    }

    fn convert_current_response(data: OWMCurrentResponse) -> CurrentWeather {
        let recent_rain_mm = data
            .rain
            .and_then(|r| r.one_hour.or(r.three_hour))
            .map(dec);
        let (sunrise, sunset) = data
            .sys
            .map(|sys| {
                (
                    sys.sunrise.and_then(|t| DateTime::from_timestamp(t, 0)),
                    sys.sunset.and_then(|t| DateTime::from_timestamp(t, 0)),
                )
            })
            .unwrap_or((None, None));

        CurrentWeather {
            temperature_celsius: dec(data.main.temp),
            condition: condition(&data.weather),
            cloud_cover_percent: cloud_cover(data.clouds),
            sunrise,
            sunset,
            recent_rain_mm,
        }
    }

    fn convert_forecast_response(data: OWMForecastResponse) -> Vec<ForecastPoint> {
        let mut points: Vec<ForecastPoint> = data
            .list
            .into_iter()
            .filter_map(|item| {
                Some(ForecastPoint {
                    time: DateTime::from_timestamp(item.dt, 0)?,
                    condition: condition(&item.weather),
                    precipitation_probability: item
                        .pop
                        .map(|p| dec(p.clamp(0.0, 1.0)))
                        .unwrap_or_default(),
                    temperature_celsius: dec(item.main.temp),
                    rain_mm: item.rain.and_then(|r| r.three_hour).map(dec),
                })
            })
            .collect();

        points.sort_by_key(|p| p.time);
        points.truncate(MAX_FORECAST_POINTS);
        points
    }
}
