//! Weather snapshot assembly
//!
//! One current-conditions request and one forecast request per fetch. Any
//! provider failure becomes `WeatherUnavailable`, never a made-up snapshot.

use chrono::Utc;
use shared::WeatherSnapshot;

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult, WeatherFailure};
use crate::external::{ProviderError, WeatherClient};

/// Weather service for building snapshots
#[derive(Clone)]
pub struct WeatherService {
    client: WeatherClient,
}

impl WeatherService {
    pub fn new(client: WeatherClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &WeatherConfig) -> AppResult<Self> {
        let client = WeatherClient::new(&config.api_key, &config.api_endpoint, config.timeout_secs)
            .map_err(|e| AppError::Configuration(e.to_string()))?;
        Ok(Self::new(client))
    }

    /// Fetch current conditions and forecast for a city
    pub async fn fetch(&self, city: &str, country: &str) -> AppResult<WeatherSnapshot> {
        let unavailable = |e: ProviderError| {
            let failure = classify(e, city, country);
            tracing::warn!("Weather for {}, {} unavailable: {}", city, country, failure);
            AppError::WeatherUnavailable(failure)
        };

        let current = self
            .client
            .get_current_weather(city, country)
            .await
            .map_err(unavailable)?;
        let forecast = self
            .client
            .get_forecast(city, country)
            .await
            .map_err(unavailable)?;

        tracing::debug!(
            "Weather for {}, {}: {}°C, {} ({}% cloud), {} forecast points",
            city,
            country,
            current.temperature_celsius,
            current.condition.description,
            current.cloud_cover_percent,
            forecast.len()
        );

        Ok(WeatherSnapshot {
            city: city.to_string(),
            country: country.to_string(),
            observed_at: Utc::now(),
            temperature_celsius: current.temperature_celsius,
            condition: current.condition,
            cloud_cover_percent: current.cloud_cover_percent,
            sunrise: current.sunrise,
            sunset: current.sunset,
            recent_rain_mm: current.recent_rain_mm,
            forecast,
        })
    }
}

fn classify(error: ProviderError, city: &str, country: &str) -> WeatherFailure {
    match error {
        ProviderError::MissingKey => WeatherFailure::MissingApiKey,
        ProviderError::Unauthorized => WeatherFailure::InvalidApiKey,
        ProviderError::NotFound => WeatherFailure::LocationNotFound(format!("{}, {}", city, country)),
        ProviderError::RateLimited => WeatherFailure::ProviderStatus(429),
        ProviderError::Loading => WeatherFailure::ProviderStatus(503),
        ProviderError::Status(status, _) => WeatherFailure::ProviderStatus(status),
        ProviderError::Request(e) => WeatherFailure::Request(e.to_string()),
        ProviderError::EmptyResponse => WeatherFailure::Parse("empty response".to_string()),
        ProviderError::Parse(msg) => WeatherFailure::Parse(msg),
        ProviderError::Incomplete(field) => WeatherFailure::Parse(format!("missing {}", field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(key: &str, uri: String) -> WeatherService {
        WeatherService::new(WeatherClient::new(key, uri, 5).unwrap())
    }

    #[tokio::test]
    async fn test_fetch_builds_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "weather": [{"id": 800, "main": "Clear", "description": "clear sky"}],
                "main": {"temp": 38.0},
                "clouds": {"all": 10}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "list": [{
                    "dt": 4102444800i64,
                    "main": {"temp": 36.0},
                    "weather": [{"id": 800, "main": "Clear", "description": "clear sky"}],
                    "pop": 0.1
                }]
            })))
            .mount(&server)
            .await;

        let snapshot = service("key", server.uri())
            .fetch("Sialkot", "PK")
            .await
            .unwrap();

        assert_eq!(snapshot.city, "Sialkot");
        assert_eq!(snapshot.cloud_cover_percent, 10);
        assert_eq!(snapshot.forecast.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "cod": 401,
                "message": "Invalid API key."
            })))
            .mount(&server)
            .await;

        let err = service("bad", server.uri())
            .fetch("Sialkot", "PK")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::WeatherUnavailable(WeatherFailure::InvalidApiKey)
        ));
    }

    #[tokio::test]
    async fn test_unknown_city() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = service("key", server.uri())
            .fetch("Atlantis", "XX")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::WeatherUnavailable(WeatherFailure::LocationNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_garbled_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = service("key", server.uri())
            .fetch("Sialkot", "PK")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::WeatherUnavailable(WeatherFailure::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let err = service("", "http://127.0.0.1:9".to_string())
            .fetch("Sialkot", "PK")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::WeatherUnavailable(WeatherFailure::MissingApiKey)
        ));
    }
}
