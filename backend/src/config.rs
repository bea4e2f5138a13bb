//! Configuration management for the Smart Garden server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code (API keys seeded from the plain `*_API_KEY` variables)
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with GARDEN__ prefix

use std::env;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{validate_thresholds, CareThresholds};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Flat-file storage configuration
    pub storage: StorageConfig,

    /// Location detection configuration
    pub location: LocationConfig,

    /// Weather API configuration
    pub weather: WeatherConfig,

    /// Thresholds for the care rules
    #[serde(default)]
    pub care: CareThresholds,

    /// AI provider configuration
    pub ai: AiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding the plant, location, chat history and profile files
    pub data_dir: String,

    /// Maximum number of plants that can be tracked
    pub max_plants: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocationConfig {
    /// City used when detection fails
    pub default_city: String,

    /// Country code used when detection fails
    pub default_country: String,

    /// Primary IP geolocation endpoint (ipapi.co)
    pub primary_url: String,

    /// Secondary IP geolocation endpoint (ip-api.com)
    pub secondary_url: String,

    /// Per-provider request timeout
    pub timeout_secs: u64,

    /// Overpass (OpenStreetMap) interpreter endpoint for nursery search
    pub overpass_url: String,

    /// Default nursery search radius
    pub nursery_radius_km: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Weather API endpoint
    pub api_endpoint: String,

    /// Weather API key (empty when not configured)
    pub api_key: String,

    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    pub gemini_api_key: String,
    pub gemini_endpoint: String,
    pub gemini_model: String,

    pub huggingface_api_key: String,
    pub huggingface_endpoint: String,
    /// Visual question answering model used for identification
    pub huggingface_model: String,

    pub groq_api_key: String,
    pub groq_endpoint: String,
    pub groq_model: String,

    pub timeout_secs: u64,

    /// Timeout for rewording dashboard alerts; kept short so a slow
    /// chat provider cannot hold up the dashboard
    pub alert_timeout_secs: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            env::var("GARDEN_ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let plain = |name: &str, fallback: &str| env::var(name).unwrap_or_else(|_| fallback.into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8501)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("storage.data_dir", "data")?
            .set_default("storage.max_plants", 50)?
            .set_default("location.default_city", plain("DEFAULT_CITY", "Sialkot"))?
            .set_default("location.default_country", plain("DEFAULT_COUNTRY", "PK"))?
            .set_default("location.primary_url", "https://ipapi.co")?
            .set_default("location.secondary_url", "http://ip-api.com")?
            .set_default("location.timeout_secs", 10)?
            .set_default(
                "location.overpass_url",
                "https://overpass-api.de/api/interpreter",
            )?
            .set_default("location.nursery_radius_km", 10)?
            .set_default(
                "weather.api_endpoint",
                "https://api.openweathermap.org/data/2.5",
            )?
            .set_default("weather.api_key", plain("OPENWEATHER_API_KEY", ""))?
            .set_default("weather.timeout_secs", 10)?
            .set_default("ai.gemini_api_key", plain("GEMINI_API_KEY", ""))?
            .set_default(
                "ai.gemini_endpoint",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("ai.gemini_model", "gemini-1.5-flash")?
            .set_default("ai.huggingface_api_key", plain("HUGGINGFACE_API_KEY", ""))?
            .set_default("ai.huggingface_endpoint", "https://router.huggingface.co")?
            .set_default("ai.huggingface_model", "dandelin/vilt-b32-finetuned-vqa")?
            .set_default("ai.groq_api_key", plain("GROQ_API_KEY", ""))?
            .set_default("ai.groq_endpoint", "https://api.groq.com/openai/v1")?
            .set_default("ai.groq_model", "llama-3.3-70b-versatile")?
            .set_default("ai.timeout_secs", 60)?
            .set_default("ai.alert_timeout_secs", 5)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (GARDEN__ prefix)
            .add_source(
                Environment::with_prefix("GARDEN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the care rules cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_thresholds(&self.care)
            .map_err(|e| ConfigError::Message(format!("care.{}", e)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8501,
            host: "0.0.0.0".to_string(),
        }
    }
}
