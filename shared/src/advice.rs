//! Static plant-care advice and fallback alert wording

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::AlertKind;

/// General care tips for a species
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CareTips {
    pub watering: &'static str,
    pub sunlight: &'static str,
    pub temperature: &'static str,
    pub fertilizer: &'static str,
}

const GENERAL_TIPS: CareTips = CareTips {
    watering: "Water when top soil feels dry. Adjust based on weather.",
    sunlight: "Most plants prefer bright indirect light.",
    temperature: "Keep in comfortable room temperature (18-25°C).",
    fertilizer: "Fertilize monthly during growing season.",
};

/// Look up care tips by common name, falling back to general advice
pub fn care_tips(species: &str) -> CareTips {
    match species.trim().to_lowercase().as_str() {
        "rose" => CareTips {
            watering: "Water deeply 2-3 times per week. Keep soil moist but not waterlogged.",
            sunlight: "Needs 6+ hours of direct sunlight daily.",
            temperature: "Prefers 15-25°C. Protect from extreme heat.",
            fertilizer: "Fertilize monthly during growing season.",
        },
        "tomato" | "tomato plant" => CareTips {
            watering: "Water daily in hot weather. Keep soil consistently moist.",
            sunlight: "Needs full sun (8+ hours daily).",
            temperature: "Thrives in 18-27°C. Protect from frost.",
            fertilizer: "Fertilize every 2 weeks with balanced fertilizer.",
        },
        "money plant" => CareTips {
            watering: "Water when top inch of soil is dry (every 5-7 days).",
            sunlight: "Bright indirect light. Can tolerate low light.",
            temperature: "Prefers 18-24°C. Avoid cold drafts.",
            fertilizer: "Fertilize monthly during spring/summer.",
        },
        "fern" => CareTips {
            watering: "Keep soil consistently moist. Water every 2-3 days.",
            sunlight: "Bright indirect light. Avoid direct sun.",
            temperature: "Prefers 18-22°C. High humidity preferred.",
            fertilizer: "Fertilize monthly with diluted fertilizer.",
        },
        _ => GENERAL_TIPS,
    }
}

/// Alert wording used when no assistant is available to phrase it
pub fn default_alert_message(
    kind: AlertKind,
    plant_name: &str,
    city: &str,
    temperature_celsius: Decimal,
) -> String {
    match kind {
        AlertKind::Rain => format!(
            "Rain Alert: Rain is expected in {} soon. Your {} is outdoors, consider moving it under shelter!",
            city, plant_name
        ),
        AlertKind::Storm => format!(
            "Storm Alert: Severe weather is approaching {}. Please move your {} indoors immediately!",
            city, plant_name
        ),
        AlertKind::Heat => format!(
            "Heat Alert: It's very hot ({}°C) and sunny. Your {} may need extra water or shade. Check the soil moisture!",
            temperature_celsius.round_dp(0),
            plant_name
        ),
    }
}
