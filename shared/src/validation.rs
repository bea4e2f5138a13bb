//! Input validation for plant, location and assistant requests

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{CareThresholds, NewPlant, PlantUpdate, ProfileInput, MAX_LOOKAHEAD_HOURS};

pub const MAX_SPECIES_LEN: usize = 100;
pub const MAX_WATERING_INTERVAL_DAYS: u32 = 365;
pub const MAX_CHAT_MESSAGE_LEN: usize = 2000;
pub const MAX_PROFILE_FIELD_LEN: usize = 100;

/// How far ahead of the server clock a client timestamp may be
pub const MAX_CLOCK_SKEW_MINUTES: i64 = 5;

/// A rejected input field
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

impl ValidationError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Validate a species name is present and reasonably short
pub fn validate_species(species: &str) -> Result<(), ValidationError> {
    let trimmed = species.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("species", "Species name is required"));
    }
    if trimmed.chars().count() > MAX_SPECIES_LEN {
        return Err(ValidationError::new(
            "species",
            "Species name must be at most 100 characters",
        ));
    }
    Ok(())
}

/// Validate watering interval is a positive number of days
pub fn validate_watering_interval(days: u32) -> Result<(), ValidationError> {
    if days == 0 {
        return Err(ValidationError::new(
            "watering_interval_days",
            "Watering interval must be at least 1 day",
        ));
    }
    if days > MAX_WATERING_INTERVAL_DAYS {
        return Err(ValidationError::new(
            "watering_interval_days",
            "Watering interval must be at most 365 days",
        ));
    }
    Ok(())
}

/// A watering cannot have happened after `now`
pub fn validate_last_watered(
    at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if at > now + Duration::minutes(MAX_CLOCK_SKEW_MINUTES) {
        return Err(ValidationError::new(
            "last_watered",
            "Last watered date cannot be in the future",
        ));
    }
    Ok(())
}

pub fn validate_new_plant(input: &NewPlant, now: DateTime<Utc>) -> Result<(), ValidationError> {
    validate_species(&input.species)?;
    validate_watering_interval(input.watering_interval_days)?;
    if let Some(at) = input.last_watered {
        validate_last_watered(at, now)?;
    }
    Ok(())
}

pub fn validate_plant_update(
    update: &PlantUpdate,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if let Some(species) = &update.species {
        validate_species(species)?;
    }
    if let Some(days) = update.watering_interval_days {
        validate_watering_interval(days)?;
    }
    if let Some(at) = update.last_watered {
        validate_last_watered(at, now)?;
    }
    Ok(())
}

/// Care thresholds must stay inside what the rules and the forecast support
pub fn validate_thresholds(thresholds: &CareThresholds) -> Result<(), ValidationError> {
    if thresholds.lookahead_hours == 0 || thresholds.lookahead_hours > MAX_LOOKAHEAD_HOURS {
        return Err(ValidationError::new(
            "lookahead_hours",
            "Lookahead must be between 1 and 48 hours",
        ));
    }
    let probability = thresholds.rain_probability_threshold;
    if probability < Decimal::ZERO || probability > Decimal::ONE {
        return Err(ValidationError::new(
            "rain_probability_threshold",
            "Rain probability threshold must be between 0 and 1",
        ));
    }
    let factor = thresholds.heat_interval_factor;
    if factor <= Decimal::ZERO || factor > Decimal::ONE {
        return Err(ValidationError::new(
            "heat_interval_factor",
            "Heat interval factor must be above 0 and at most 1",
        ));
    }
    Ok(())
}

/// Validate a manually entered city and country
pub fn validate_location(city: &str, country: &str) -> Result<(), ValidationError> {
    if city.trim().is_empty() {
        return Err(ValidationError::new("city", "City is required"));
    }
    if country.trim().is_empty() {
        return Err(ValidationError::new("country", "Country is required"));
    }
    Ok(())
}

pub fn validate_chat_message(message: &str) -> Result<(), ValidationError> {
    if message.trim().is_empty() {
        return Err(ValidationError::new("message", "Message cannot be empty"));
    }
    if message.chars().count() > MAX_CHAT_MESSAGE_LEN {
        return Err(ValidationError::new(
            "message",
            "Message must be at most 2000 characters",
        ));
    }
    Ok(())
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// A profile needs a name or an email; an email must look like one
pub fn validate_profile(input: &ProfileInput) -> Result<(), ValidationError> {
    let email = input.email.trim();
    if input.name.trim().is_empty() && email.is_empty() {
        return Err(ValidationError::new("name", "Enter a name or an email address"));
    }
    if !email.is_empty() && !looks_like_email(email) {
        return Err(ValidationError::new("email", "Email address is not valid"));
    }

    let fields = [
        ("name", &input.name),
        ("email", &input.email),
        ("phone", &input.phone),
        ("profession", &input.profession),
        ("location", &input.location),
    ];
    for (field, value) in fields {
        if value.trim().chars().count() > MAX_PROFILE_FIELD_LEN {
            return Err(ValidationError::new(field, "Must be at most 100 characters"));
        }
    }
    Ok(())
}
