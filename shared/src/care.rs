//! Care decision engine
//!
//! Derives sun exposure, watering status and weather alerts for a plant
//! from a single weather snapshot. Everything here is pure: the snapshot's
//! `observed_at` is used as "now", so the same inputs always produce the
//! same [`CareStatus`].

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{
    AlertKind, CareAlert, CareStatus, CareThresholds, ForecastPoint, Placement, Plant, RiskLevel,
    SunAnalysis, SunExposure, SunIntensity, SunPreference, Urgency, WateringReason,
    WateringStatus, WeatherSnapshot,
};

/// One row of the sun-exposure rule table
struct ExposureRule {
    applies: fn(&Plant, u8) -> bool,
    exposure: SunExposure,
}

/// Evaluated top to bottom, first match wins. Placement rules come before
/// the weather-only rule so an indoor plant is never rated by cloud cover.
const EXPOSURE_RULES: &[ExposureRule] = &[
    ExposureRule {
        applies: indoor_window,
        exposure: SunExposure::Low,
    },
    ExposureRule {
        applies: clear_open_roof,
        exposure: SunExposure::High,
    },
    // Medium-high on a sunny balcony is reported as High
    ExposureRule {
        applies: sunny_balcony,
        exposure: SunExposure::High,
    },
    ExposureRule {
        applies: overcast,
        exposure: SunExposure::Low,
    },
];

fn indoor_window(plant: &Plant, _cloud_cover: u8) -> bool {
    plant.placement == Placement::IndoorWindow
}

fn clear_open_roof(plant: &Plant, cloud_cover: u8) -> bool {
    plant.placement == Placement::OpenRoof
        && cloud_cover < 30
        && plant.sun_preference != SunPreference::Shade
}

fn sunny_balcony(plant: &Plant, cloud_cover: u8) -> bool {
    plant.placement == Placement::Balcony
        && cloud_cover < 50
        && plant.sun_preference == SunPreference::FullSun
}

fn overcast(_plant: &Plant, cloud_cover: u8) -> bool {
    cloud_cover >= 70
}

/// Estimate sun exposure from placement, preference and cloud cover
pub fn estimate_sun_exposure(plant: &Plant, cloud_cover_percent: u8) -> SunExposure {
    EXPOSURE_RULES
        .iter()
        .find(|rule| (rule.applies)(plant, cloud_cover_percent))
        .map(|rule| rule.exposure)
        .unwrap_or(SunExposure::Medium)
}

/// Above this, strong sun on a fully exposed plant needs watching
const WARM_CELSIUS: i64 = 30;

/// How directly sun reaches each placement
#[derive(Clone, Copy, PartialEq, Eq)]
enum LightAccess {
    Full,
    Partial,
    Indirect,
}

/// Share of open-sky sun hours the placement receives, and its access
fn placement_light(placement: Placement) -> (Decimal, LightAccess) {
    match placement {
        Placement::OpenRoof => (Decimal::ONE, LightAccess::Full),
        Placement::Balcony => (Decimal::new(7, 1), LightAccess::Partial),
        Placement::IndoorWindow => (Decimal::new(4, 1), LightAccess::Indirect),
    }
}

fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> Decimal {
    Decimal::from((to - from).num_minutes()) / Decimal::from(60)
}

/// Sun intensity and open-sky sun hours still to come, by time since sunrise
fn sun_intensity(
    since_sunrise: Decimal,
    until_sunset: Decimal,
    cloud_cover: u8,
) -> (SunIntensity, Decimal) {
    let morning_end = Decimal::from(4);
    let midday_end = Decimal::from(8);
    let half = Decimal::new(5, 1);
    let third = Decimal::new(3, 1);

    if since_sunrise < morning_end {
        let left = morning_end - since_sunrise;
        match cloud_cover {
            0..=19 => (SunIntensity::Medium, Decimal::from(2) + left * half),
            20..=49 => (SunIntensity::Low, Decimal::ONE + left * third),
            _ => (SunIntensity::Low, half),
        }
    } else if since_sunrise < midday_end {
        let left = midday_end - since_sunrise;
        match cloud_cover {
            0..=19 => (SunIntensity::High, Decimal::from(4) + left * half),
            20..=49 => (SunIntensity::Medium, Decimal::from(2) + left * third),
            _ => (SunIntensity::Low, Decimal::ONE),
        }
    } else {
        let left = until_sunset.max(Decimal::ZERO);
        match cloud_cover {
            0..=19 => (SunIntensity::MediumHigh, left),
            20..=49 => (SunIntensity::Medium, left * Decimal::new(7, 1)),
            _ => (SunIntensity::Low, left * Decimal::new(4, 1)),
        }
    }
}

/// Time-of-day sun reading for a plant. Daytime comes from the snapshot's
/// sunrise and sunset around `observed_at`; without them it is assumed to be
/// early daytime.
pub fn analyze_sun(
    plant: &Plant,
    snapshot: &WeatherSnapshot,
    thresholds: &CareThresholds,
) -> SunAnalysis {
    let now = snapshot.observed_at;
    let (is_daytime, since_sunrise, until_sunset) = match (snapshot.sunrise, snapshot.sunset) {
        (Some(sunrise), Some(sunset)) => (
            sunrise <= now && now <= sunset,
            hours_between(sunrise, now),
            hours_between(now, sunset),
        ),
        _ => (true, Decimal::ZERO, Decimal::ZERO),
    };

    if !is_daytime {
        return SunAnalysis {
            intensity: SunIntensity::Night,
            is_daytime,
            sun_hours: Decimal::ZERO,
            risk_level: RiskLevel::None,
            recommendation: "Night time, no sun exposure.".to_string(),
        };
    }

    let (intensity, open_sky_hours) =
        sun_intensity(since_sunrise, until_sunset, snapshot.cloud_cover_percent);
    let (share, access) = placement_light(plant.placement);
    let temperature = snapshot.temperature_celsius;

    let (risk_level, recommendation) = match (intensity, access) {
        (SunIntensity::High, LightAccess::Full) if temperature > thresholds.heat_threshold_celsius => (
            RiskLevel::High,
            "High heat and intense sun. Consider moving to shade or providing extra water.",
        ),
        (SunIntensity::High, LightAccess::Full) if temperature > Decimal::from(WARM_CELSIUS) => (
            RiskLevel::Medium,
            "High sun exposure. Monitor temperature and water needs.",
        ),
        (SunIntensity::High, LightAccess::Full) => (
            RiskLevel::Low,
            "Good sun exposure. Monitor soil moisture.",
        ),
        (SunIntensity::High, LightAccess::Partial) => (
            RiskLevel::Low,
            "High sun exposure. Monitor temperature and water needs.",
        ),
        (SunIntensity::MediumHigh | SunIntensity::Medium, _) => (
            RiskLevel::None,
            "Moderate conditions. Plant should be comfortable.",
        ),
        _ => (
            RiskLevel::None,
            "Limited sunlight. Consider a brighter spot if the plant needs more light.",
        ),
    };

    SunAnalysis {
        intensity,
        is_daytime,
        sun_hours: (open_sky_hours * share).round_dp(1),
        risk_level,
        recommendation: recommendation.to_string(),
    }
}

fn lookahead(thresholds: &CareThresholds) -> Duration {
    Duration::hours(i64::from(thresholds.lookahead_hours))
}

fn is_hot(snapshot: &WeatherSnapshot, thresholds: &CareThresholds) -> bool {
    snapshot.temperature_celsius > thresholds.heat_threshold_celsius
}

/// First forecast entry inside the lookahead window likely to bring rain
pub fn first_rain_point<'a>(
    snapshot: &'a WeatherSnapshot,
    thresholds: &CareThresholds,
) -> Option<&'a ForecastPoint> {
    snapshot
        .upcoming(lookahead(thresholds))
        .find(|point| point.precipitation_probability > thresholds.rain_probability_threshold)
}

/// First forecast entry inside the lookahead window with a storm condition
pub fn first_storm_point<'a>(
    snapshot: &'a WeatherSnapshot,
    thresholds: &CareThresholds,
) -> Option<&'a ForecastPoint> {
    snapshot
        .upcoming(lookahead(thresholds))
        .find(|point| point.condition.is_storm())
}

/// Watering interval after the heat rule: outdoor plants in heat get
/// `floor(interval * factor)`, never less than one day.
pub fn effective_interval_days(
    plant: &Plant,
    snapshot: &WeatherSnapshot,
    thresholds: &CareThresholds,
) -> u32 {
    let base = plant.watering_interval_days.max(1);
    if !(is_hot(snapshot, thresholds) && plant.placement.is_outdoor()) {
        return base;
    }

    (Decimal::from(base) * thresholds.heat_interval_factor)
        .floor()
        .to_u32()
        .unwrap_or(1)
        .max(1)
}

/// Decide whether the plant needs water now
pub fn watering_status(
    plant: &Plant,
    snapshot: &WeatherSnapshot,
    thresholds: &CareThresholds,
) -> WateringStatus {
    let effective = effective_interval_days(plant, snapshot, thresholds);
    // A timestamp ahead of the snapshot counts as watered just now
    let days_since = plant
        .last_watered
        .map(|at| (snapshot.observed_at - at).num_days().max(0));

    // Rain that already fell resets the basis for this evaluation only;
    // the stored last_watered is left alone.
    let (due, reason) = if snapshot.had_recent_rain() {
        (false, WateringReason::RecentRain)
    } else if first_rain_point(snapshot, thresholds).is_some() {
        (false, WateringReason::RainExpected)
    } else {
        match days_since {
            None => (true, WateringReason::NeverWatered),
            Some(days) if days >= i64::from(effective) => (true, WateringReason::IntervalElapsed),
            Some(days) => (
                false,
                WateringReason::NotYetDue {
                    days_remaining: i64::from(effective) - days,
                },
            ),
        }
    };

    let urgency = match (due, days_since) {
        (false, _) => Urgency::Low,
        (true, None) => Urgency::High,
        (true, Some(days)) if days > i64::from(effective) => Urgency::High,
        (true, Some(_)) => Urgency::Medium,
    };

    WateringStatus {
        due,
        days_since_watered: days_since,
        effective_interval_days: effective,
        urgency,
        reason,
    }
}

/// Derive every applicable alert. Kinds are independent of each other.
pub fn derive_alerts(
    plant: &Plant,
    snapshot: &WeatherSnapshot,
    thresholds: &CareThresholds,
) -> Vec<CareAlert> {
    let minutes_until = |point: &ForecastPoint| (point.time - snapshot.observed_at).num_minutes();
    let mut alerts = Vec::new();

    if plant.placement.is_outdoor() {
        if let Some(point) = first_rain_point(snapshot, thresholds) {
            alerts.push(CareAlert {
                kind: AlertKind::Rain,
                minutes_until: Some(minutes_until(point)),
            });
        }

        let storm_point = first_storm_point(snapshot, thresholds);
        if storm_point.is_some() || snapshot.condition.is_storm() {
            alerts.push(CareAlert {
                kind: AlertKind::Storm,
                minutes_until: storm_point.map(minutes_until),
            });
        }
    }

    if is_hot(snapshot, thresholds) {
        alerts.push(CareAlert {
            kind: AlertKind::Heat,
            minutes_until: None,
        });
    }

    alerts
}

/// Evaluate a plant against a weather snapshot
pub fn evaluate(
    plant: &Plant,
    snapshot: &WeatherSnapshot,
    thresholds: &CareThresholds,
) -> CareStatus {
    let watering = watering_status(plant, snapshot, thresholds);

    CareStatus {
        plant_id: plant.id,
        needs_water: watering.due,
        sun_exposure: estimate_sun_exposure(plant, snapshot.cloud_cover_percent),
        sun: analyze_sun(plant, snapshot, thresholds),
        alerts: derive_alerts(plant, snapshot, thresholds),
        watering,
    }
}
