//! IP geolocation providers
//!
//! Both providers are queried without a client IP so they geolocate the
//! caller. A response only counts when it names a city and a country.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{GpsCoordinates, Location, LocationSource};

use super::{check_status, http_client, ProviderError};

/// A source that can tell us where the server is
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Locate the caller, returning a `Detected` location
    async fn locate(&self) -> Result<Location, ProviderError>;
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn detected(
    city: String,
    country: String,
    region: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Location {
    Location {
        city,
        country,
        source: LocationSource::Detected,
        region,
        coordinates: match (lat, lon) {
            (Some(lat), Some(lon)) => GpsCoordinates::from_f64(lat, lon),
            _ => None,
        },
    }
}

/// ipapi.co JSON endpoint (HTTPS)
#[derive(Clone)]
pub struct IpApiCo {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct IpApiCoResponse {
    city: Option<String>,
    country_code: Option<String>,
    country_name: Option<String>,
    region: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    /// Set when the provider refuses the lookup (quota, reserved range)
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

impl IpApiCo {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl GeoProvider for IpApiCo {
    fn name(&self) -> &'static str {
        "ipapi.co"
    }

    async fn locate(&self) -> Result<Location, ProviderError> {
        let url = format!("{}/json/", self.base_url.trim_end_matches('/'));
        let response = check_status(self.client.get(&url).send().await?).await?;

        let data: IpApiCoResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        if data.error {
            return Err(ProviderError::Parse(
                data.reason.unwrap_or_else(|| "lookup refused".to_string()),
            ));
        }

        let city = non_empty(data.city).ok_or(ProviderError::Incomplete("city"))?;
        let country = non_empty(data.country_code)
            .or_else(|| non_empty(data.country_name))
            .ok_or(ProviderError::Incomplete("country"))?;

        Ok(detected(
            city,
            country,
            non_empty(data.region),
            data.latitude,
            data.longitude,
        ))
    }
}

/// ip-api.com JSON endpoint (HTTP only on the free tier)
#[derive(Clone)]
pub struct IpApiCom {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiComResponse {
    status: String,
    message: Option<String>,
    city: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
    region_name: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpApiCom {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl GeoProvider for IpApiCom {
    fn name(&self) -> &'static str {
        "ip-api.com"
    }

    async fn locate(&self) -> Result<Location, ProviderError> {
        let url = format!("{}/json/", self.base_url.trim_end_matches('/'));
        let response = check_status(self.client.get(&url).send().await?).await?;

        let data: IpApiComResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        if data.status != "success" {
            return Err(ProviderError::Parse(format!(
                "status {}: {}",
                data.status,
                data.message.unwrap_or_default()
            )));
        }

        let city = non_empty(data.city).ok_or(ProviderError::Incomplete("city"))?;
        let country = non_empty(data.country_code)
            .or_else(|| non_empty(data.country))
            .ok_or(ProviderError::Incomplete("country"))?;

        Ok(detected(
            city,
            country,
            non_empty(data.region_name),
            data.lat,
            data.lon,
        ))
    }
}
