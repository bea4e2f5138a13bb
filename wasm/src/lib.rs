//! WebAssembly module for the Smart Garden app
//!
//! Runs the care engine in the browser so the dashboard can re-evaluate
//! plants against an already fetched weather snapshot without a round trip.
//! Values cross the boundary as JSON strings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("smart-garden wasm ready"));
}

/// Current time from the browser clock
#[cfg(target_arch = "wasm32")]
fn now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
}

#[cfg(not(target_arch = "wasm32"))]
fn now() -> DateTime<Utc> {
    Utc::now()
}

fn parse<T: DeserializeOwned>(what: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn thresholds(json: &str) -> Result<CareThresholds, String> {
    if json.trim().is_empty() {
        Ok(CareThresholds::default())
    } else {
        parse("thresholds", json)
    }
}

fn evaluate_json(plant: &str, snapshot: &str, thresholds_json: &str) -> Result<String, String> {
    let plant: Plant = parse("plant", plant)?;
    let snapshot: WeatherSnapshot = parse("snapshot", snapshot)?;
    let status = shared::evaluate(&plant, &snapshot, &thresholds(thresholds_json)?);
    serde_json::to_string(&status).map_err(|e| e.to_string())
}

fn days_between(from: &str, now: DateTime<Utc>) -> Result<i64, String> {
    let from: DateTime<Utc> = from
        .parse()
        .map_err(|e| format!("Invalid timestamp: {}", e))?;
    Ok((now - from).num_days())
}

/// Evaluate one plant against a snapshot. Pass an empty string for
/// default thresholds. Returns the care status as JSON.
#[wasm_bindgen]
pub fn evaluate_care(
    plant_json: &str,
    snapshot_json: &str,
    thresholds_json: &str,
) -> Result<String, JsValue> {
    evaluate_json(plant_json, snapshot_json, thresholds_json).map_err(|e| JsValue::from_str(&e))
}

/// Sun exposure for a plant under the given cloud cover
#[wasm_bindgen]
pub fn estimate_exposure(plant_json: &str, cloud_cover_percent: u8) -> Result<String, JsValue> {
    let plant: Plant = parse("plant", plant_json).map_err(|e| JsValue::from_str(&e))?;
    Ok(shared::estimate_sun_exposure(&plant, cloud_cover_percent).to_string())
}

/// Whole days since an RFC 3339 timestamp, by the browser clock
#[wasm_bindgen]
pub fn days_since(timestamp: &str) -> Result<i64, JsValue> {
    days_between(timestamp, now()).map_err(|e| JsValue::from_str(&e))
}

/// Care tips for a species as JSON
#[wasm_bindgen]
pub fn care_tips(species: &str) -> String {
    serde_json::to_string(&shared::care_tips(species)).unwrap_or_default()
}

/// Template alert text for "rain", "storm" or "heat"
#[wasm_bindgen]
pub fn alert_message(kind: &str, plant_name: &str, city: &str, temperature_celsius: f64) -> String {
    let kind = match kind.to_lowercase().as_str() {
        "rain" => AlertKind::Rain,
        "storm" => AlertKind::Storm,
        "heat" => AlertKind::Heat,
        _ => return format!("Alert for {}: Please check your plant.", plant_name),
    };
    let temperature = Decimal::try_from(temperature_celsius).unwrap_or(Decimal::ZERO);
    shared::default_alert_message(kind, plant_name, city, temperature)
}

/// Validate a new-plant form before submitting it; returns an empty string
/// when valid, otherwise the first problem as "field: message"
#[wasm_bindgen]
pub fn validate_plant_form(input_json: &str) -> String {
    match parse::<NewPlant>("plant", input_json) {
        Ok(input) => validate_new_plant(&input, now())
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default(),
        Err(e) => e,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn plant_json(placement: &str, days_ago: Option<i64>) -> String {
        json!({
            "id": "5b7e4a8e-9f0c-4c2b-8d3f-2a1e6c9b0d11",
            "species": "Rose",
            "placement": placement,
            "sun_preference": "full_sun",
            "watering_interval_days": 3,
            "last_watered": days_ago.map(|d| format!("2024-07-{:02}T12:00:00Z", 20 - d)),
            "created_at": "2024-06-01T00:00:00Z"
        })
        .to_string()
    }

    fn snapshot_json(temp: &str, cloud: u8) -> String {
        json!({
            "city": "Sialkot",
            "country": "PK",
            "observed_at": "2024-07-20T12:00:00Z",
            "temperature_celsius": temp,
            "condition": {"code": 800, "main": "Clear", "description": "clear sky"},
            "cloud_cover_percent": cloud,
            "forecast": []
        })
        .to_string()
    }

    #[test]
    fn test_evaluate_json_hot_roof() {
        let out = evaluate_json(&plant_json("open_roof", Some(5)), &snapshot_json("38", 10), "")
            .unwrap();
        let status: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(status["sun_exposure"], "high");
        assert_eq!(status["needs_water"], true);
        assert_eq!(status["watering"]["effective_interval_days"], 1);
        assert_eq!(status["alerts"][0]["kind"], "heat");
        assert_eq!(status["sun"]["is_daytime"], true);
    }

    #[test]
    fn test_evaluate_json_custom_thresholds() {
        let thresholds = json!({"heat_threshold_celsius": "40"}).to_string();
        let out = evaluate_json(
            &plant_json("open_roof", Some(2)),
            &snapshot_json("38", 10),
            &thresholds,
        )
        .unwrap();
        let status: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(status["needs_water"], false);
        assert_eq!(status["alerts"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_evaluate_json_rejects_bad_input() {
        let err = evaluate_json("{}", &snapshot_json("20", 0), "").unwrap_err();
        assert!(err.starts_with("Invalid plant JSON"));
    }

    #[test]
    fn test_days_between() {
        let now = "2024-07-20T12:00:00Z".parse().unwrap();
        assert_eq!(days_between("2024-07-15T13:00:00Z", now).unwrap(), 4);
        assert!(days_between("yesterday", now).is_err());
    }

    #[test]
    fn test_alert_message_kinds() {
        assert!(alert_message("Rain", "Rose", "Lahore", 20.0).contains("Lahore"));
        assert!(alert_message("heat", "Rose", "Lahore", 38.4).contains("38°C"));
        assert_eq!(
            alert_message("frost", "Rose", "Lahore", 0.0),
            "Alert for Rose: Please check your plant."
        );
    }

    #[test]
    fn test_validate_plant_form() {
        let valid = json!({
            "species": "Fern",
            "placement": "indoor_window",
            "sun_preference": "shade",
            "watering_interval_days": 2
        });
        assert_eq!(validate_plant_form(&valid.to_string()), "");

        let invalid = json!({
            "species": "Fern",
            "placement": "indoor_window",
            "sun_preference": "shade",
            "watering_interval_days": 0
        });
        assert!(validate_plant_form(&invalid.to_string()).starts_with("watering_interval_days"));

        let future = json!({
            "species": "Fern",
            "placement": "indoor_window",
            "sun_preference": "shade",
            "watering_interval_days": 2,
            "last_watered": (Utc::now() + chrono::Duration::days(3)).to_rfc3339()
        });
        assert!(validate_plant_form(&future.to_string()).starts_with("last_watered"));
    }

    #[test]
    fn test_care_tips_json() {
        let tips: Value = serde_json::from_str(&care_tips("tomato")).unwrap();
        assert!(tips["sunlight"].as_str().unwrap().contains("full sun"));
    }
}
