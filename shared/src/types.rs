//! Common types used across the app

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GPS coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl GpsCoordinates {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build coordinates from the floats geolocation providers report
    pub fn from_f64(latitude: f64, longitude: f64) -> Option<Self> {
        Some(Self {
            latitude: Decimal::from_f64_retain(latitude)?,
            longitude: Decimal::from_f64_retain(longitude)?,
        })
    }

    /// Great-circle distance in kilometres, one decimal place
    pub fn distance_km(&self, other: &GpsCoordinates) -> Decimal {
        const EARTH_RADIUS_KM: f64 = 6371.0;
        let radians = |d: Decimal| d.to_f64().unwrap_or_default().to_radians();

        let (lat1, lat2) = (radians(self.latitude), radians(other.latitude));
        let d_lat = lat2 - lat1;
        let d_lon = radians(other.longitude) - radians(self.longitude);
        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let km = 2.0 * EARTH_RADIUS_KM * a.sqrt().asin();

        Decimal::from_f64_retain(km)
            .map(|d| d.round_dp(1))
            .unwrap_or_default()
    }
}
