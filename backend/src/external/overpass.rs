//! OpenStreetMap Overpass API client for plant nurseries

use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;
use shared::{GpsCoordinates, Nursery};

use super::{check_status, http_client, ProviderError};

/// Most places returned for one search
pub const MAX_NURSERIES: usize = 10;

#[derive(Clone)]
pub struct OverpassClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct Element {
    lat: Option<f64>,
    lon: Option<f64>,
    /// Ways and relations carry their position here with `out center`
    center: Option<Center>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct Center {
    lat: f64,
    lon: f64,
}

fn nursery_query(center: &GpsCoordinates, radius_km: u32) -> String {
    let around = format!(
        "around:{},{},{}",
        radius_km * 1000,
        center.latitude,
        center.longitude
    );
    format!(
        "[out:json][timeout:25];(\
         nwr[\"shop\"=\"garden_centre\"]({a});\
         nwr[\"shop\"~\"florist|garden\"]({a});\
         nwr[\"amenity\"=\"marketplace\"][\"name\"~\"plant|nursery|garden\",i]({a});\
         );out center;",
        a = around
    )
}

impl Element {
    fn coordinates(&self) -> Option<GpsCoordinates> {
        match (self.lat, self.lon, &self.center) {
            (Some(lat), Some(lon), _) => GpsCoordinates::from_f64(lat, lon),
            (_, _, Some(c)) => GpsCoordinates::from_f64(c.lat, c.lon),
            _ => None,
        }
    }

    fn tag(&self, key: &str) -> Option<String> {
        self.tags
            .get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn address(&self) -> Option<String> {
        if let Some(full) = self.tag("addr:full") {
            return Some(full);
        }
        let street = self.tag("addr:street")?;
        Some(match self.tag("addr:housenumber") {
            Some(number) => format!("{} {}", number, street),
            None => street,
        })
    }

    fn into_nursery(self, from: &GpsCoordinates) -> Option<Nursery> {
        let coordinates = self.coordinates()?;
        Some(Nursery {
            name: self
                .tag("name")
                .unwrap_or_else(|| "Plant Nursery".to_string()),
            address: self.address(),
            phone: self.tag("phone").or_else(|| self.tag("contact:phone")),
            distance_km: Some(from.distance_km(&coordinates)),
            map_url: Some(format!(
                "https://www.openstreetmap.org/?mlat={}&mlon={}#map=17/{}/{}",
                coordinates.latitude,
                coordinates.longitude,
                coordinates.latitude,
                coordinates.longitude
            )),
            coordinates: Some(coordinates),
        })
    }
}

impl OverpassClient {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            base_url: base_url.into(),
        })
    }

    /// Garden centres, florists and plant markets within `radius_km`,
    /// nearest first
    pub async fn find_nurseries(
        &self,
        center: &GpsCoordinates,
        radius_km: u32,
    ) -> Result<Vec<Nursery>, ProviderError> {
        let query = nursery_query(center, radius_km);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("data", query.as_str())])
            .send()
            .await?;
        let response = check_status(response).await?;

        let data: OverpassResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let mut nurseries: Vec<Nursery> = data
            .elements
            .into_iter()
            .filter_map(|element| element.into_nursery(center))
            .collect();
        nurseries.sort_by(|a, b| a.distance_km.cmp(&b.distance_km));
        nurseries.truncate(MAX_NURSERIES);

        tracing::debug!("Overpass returned {} nurseries", nurseries.len());
        Ok(nurseries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;
    use wiremock::matchers::{method, query_param_contains};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn lahore() -> GpsCoordinates {
        GpsCoordinates::new(Decimal::new(315204, 4), Decimal::new(743587, 4))
    }

    #[tokio::test]
    async fn test_nurseries_sorted_by_distance() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param_contains("data", "around:5000,31.5204,74.3587"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "elements": [
                    {
                        "type": "node", "lat": 31.60, "lon": 74.40,
                        "tags": {"name": "Far Florist", "shop": "florist"}
                    },
                    {
                        "type": "way", "center": {"lat": 31.53, "lon": 74.36},
                        "tags": {
                            "shop": "garden_centre",
                            "addr:housenumber": "12",
                            "addr:street": "Jail Road",
                            "phone": "+92 42 1234567"
                        }
                    },
                    {"type": "relation", "tags": {"name": "No position"}}
                ]
            })))
            .mount(&server)
            .await;

        let client = OverpassClient::new(server.uri(), 5).unwrap();
        let nurseries = client.find_nurseries(&lahore(), 5).await.unwrap();

        assert_eq!(nurseries.len(), 2);
        assert_eq!(nurseries[0].name, "Plant Nursery");
        assert_eq!(nurseries[0].address.as_deref(), Some("12 Jail Road"));
        assert_eq!(nurseries[0].phone.as_deref(), Some("+92 42 1234567"));
        assert_eq!(nurseries[1].name, "Far Florist");
        assert!(nurseries[0].distance_km < nurseries[1].distance_km);
    }

    #[tokio::test]
    async fn test_at_most_ten_nurseries() {
        let server = MockServer::start().await;
        let elements: Vec<_> = (0..15)
            .map(|i| {
                json!({
                    "type": "node",
                    "lat": 31.52 + f64::from(i) * 0.01,
                    "lon": 74.36,
                    "tags": {"name": format!("Nursery {}", i)}
                })
            })
            .collect();
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "elements": elements })),
            )
            .mount(&server)
            .await;

        let client = OverpassClient::new(server.uri(), 5).unwrap();
        let nurseries = client.find_nurseries(&lahore(), 10).await.unwrap();
        assert_eq!(nurseries.len(), MAX_NURSERIES);
        assert_eq!(nurseries[0].name, "Nursery 0");
    }

    #[tokio::test]
    async fn test_overpass_busy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = OverpassClient::new(server.uri(), 5).unwrap();
        let result = client.find_nurseries(&lahore(), 10).await;
        assert!(matches!(result, Err(ProviderError::RateLimited)));
    }
}
