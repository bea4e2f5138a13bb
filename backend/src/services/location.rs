//! Location resolution
//!
//! Tries each geolocation provider in order and settles on the configured
//! default when all of them fail. Resolution never errors.

use std::sync::Arc;

use shared::{Location, LocationSource};

use crate::config::LocationConfig;
use crate::error::{AppError, AppResult};
use crate::external::{GeoProvider, IpApiCo, IpApiCom};
use crate::services::GardenStore;

/// Resolves the garden's city from a stored value or the network
#[derive(Clone)]
pub struct LocationResolver {
    providers: Vec<Arc<dyn GeoProvider>>,
    default_city: String,
    default_country: String,
}

impl LocationResolver {
    pub fn new(
        providers: Vec<Arc<dyn GeoProvider>>,
        default_city: impl Into<String>,
        default_country: impl Into<String>,
    ) -> Self {
        Self {
            providers,
            default_city: default_city.into(),
            default_country: default_country.into(),
        }
    }

    /// ipapi.co first, then ip-api.com
    pub fn from_config(config: &LocationConfig) -> AppResult<Self> {
        let primary = IpApiCo::new(&config.primary_url, config.timeout_secs)
            .map_err(|e| AppError::Configuration(e.to_string()))?;
        let secondary = IpApiCom::new(&config.secondary_url, config.timeout_secs)
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        Ok(Self::new(
            vec![Arc::new(primary), Arc::new(secondary)],
            &config.default_city,
            &config.default_country,
        ))
    }

    pub fn fallback(&self) -> Location {
        Location::fallback(&self.default_city, &self.default_country)
    }

    /// Return a confirmed stored location unchanged, otherwise detect
    pub async fn resolve(&self, stored: Option<&Location>) -> Location {
        match stored {
            Some(location) if location.is_confirmed() => location.clone(),
            _ => self.detect().await,
        }
    }

    /// Query the providers in order, ignoring any stored value
    pub async fn detect(&self) -> Location {
        for provider in &self.providers {
            match provider.locate().await {
                Ok(location) => {
                    tracing::debug!("Location detected via {}: {}", provider.name(), location);
                    return location;
                }
                Err(e) => {
                    tracing::warn!("Location detection via {} failed: {}", provider.name(), e);
                }
            }
        }

        let fallback = self.fallback();
        tracing::warn!(
            "{}",
            AppError::LocationUnavailable(format!("using default {}", fallback))
        );
        fallback
    }
}

/// Resolve against the stored location and remember newly detected ones
pub async fn resolve_and_remember(
    resolver: &LocationResolver,
    store: &GardenStore,
) -> AppResult<Location> {
    let stored = store.load_location().await?;
    let location = resolver.resolve(stored.as_ref()).await;

    if location.source == LocationSource::Detected && stored.as_ref() != Some(&location) {
        store.save_location(&location).await?;
    }
    Ok(location)
}

/// Force a fresh detection, persisting it unless it is only the default
pub async fn redetect(resolver: &LocationResolver, store: &GardenStore) -> AppResult<Location> {
    let location = resolver.detect().await;
    if location.source == LocationSource::Detected {
        store.save_location(&location).await?;
    }
    Ok(location)
}

/// Store a user-chosen city
pub async fn set_manual(
    store: &GardenStore,
    city: &str,
    country: &str,
) -> AppResult<Location> {
    shared::validate_location(city, country)?;
    let location = Location::manual(city.trim(), country.trim());
    store.save_location(&location).await?;
    tracing::info!("Location set manually to {}", location);
    Ok(location)
}
