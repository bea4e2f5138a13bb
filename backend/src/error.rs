//! Error handling for the Smart Garden server
//!
//! Every provider or storage failure is converted into one of these kinds at
//! the collaborator boundary. Each kind renders a stable code, a message and,
//! where the user can fix it, a remediation hint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::ValidationError;
use thiserror::Error;

/// Why a weather fetch failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeatherFailure {
    MissingApiKey,
    InvalidApiKey,
    LocationNotFound(String),
    ProviderStatus(u16),
    Request(String),
    Parse(String),
}

impl std::fmt::Display for WeatherFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherFailure::MissingApiKey => write!(f, "weather API key is not configured"),
            WeatherFailure::InvalidApiKey => write!(f, "weather API key was rejected"),
            WeatherFailure::LocationNotFound(location) => {
                write!(f, "location '{}' was not found", location)
            }
            WeatherFailure::ProviderStatus(status) => {
                write!(f, "weather provider returned status {}", status)
            }
            WeatherFailure::Request(msg) => write!(f, "weather request failed: {}", msg),
            WeatherFailure::Parse(msg) => write!(f, "unexpected weather response: {}", msg),
        }
    }
}

/// Why an AI assistant call failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantFailure {
    NotConfigured,
    InvalidApiKey,
    RateLimited,
    ModelLoading,
    EmptyResponse,
    Provider(String),
}

impl std::fmt::Display for AssistantFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssistantFailure::NotConfigured => write!(f, "no API key is configured"),
            AssistantFailure::InvalidApiKey => write!(f, "API key was rejected"),
            AssistantFailure::RateLimited => write!(f, "too many requests"),
            AssistantFailure::ModelLoading => write!(f, "model is still loading"),
            AssistantFailure::EmptyResponse => write!(f, "provider returned an empty response"),
            AssistantFailure::Provider(msg) => write!(f, "{}", msg),
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Upstream collaborators
    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Weather unavailable: {0}")]
    WeatherUnavailable(WeatherFailure),

    #[error("Plant identification unavailable: {0}")]
    IdentificationUnavailable(AssistantFailure),

    #[error("Plant diagnosis unavailable: {0}")]
    DiagnosisUnavailable(AssistantFailure),

    #[error("Chat unavailable: {0}")]
    ChatUnavailable(AssistantFailure),

    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    // Request errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    // Internal errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

fn key_remediation(failure: &AssistantFailure, keys: &str) -> Option<String> {
    match failure {
        AssistantFailure::NotConfigured => Some(format!(
            "Set {} in your .env file to enable this feature.",
            keys
        )),
        AssistantFailure::InvalidApiKey => Some(format!(
            "Check that {} is set correctly and has not expired.",
            keys
        )),
        AssistantFailure::RateLimited => {
            Some("Please wait a moment and try again.".to_string())
        }
        AssistantFailure::ModelLoading => {
            Some("The model is warming up. Please try again in a moment.".to_string())
        }
        AssistantFailure::EmptyResponse | AssistantFailure::Provider(_) => {
            Some("Please try again or check your API configuration.".to_string())
        }
    }
}

impl AppError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::LocationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::WeatherUnavailable(WeatherFailure::LocationNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            AppError::WeatherUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::IdentificationUnavailable(_)
            | AppError::DiagnosisUnavailable(_)
            | AppError::ChatUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::PersistenceUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Configuration(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// User-facing error body
    pub fn detail(&self) -> ErrorDetail {
        let (code, message, remediation, field) = match self {
            AppError::LocationUnavailable(msg) => (
                "LOCATION_UNAVAILABLE",
                format!("Could not detect your location: {}", msg),
                Some("Set your city manually on the location page.".to_string()),
                None,
            ),
            AppError::WeatherUnavailable(failure) => {
                let remediation = match failure {
                    WeatherFailure::MissingApiKey => Some(
                        "Set OPENWEATHER_API_KEY in your .env file. A free key is available at https://openweathermap.org/api."
                            .to_string(),
                    ),
                    WeatherFailure::InvalidApiKey => Some(
                        "Check that OPENWEATHER_API_KEY is correct. New keys can take a couple of hours to activate."
                            .to_string(),
                    ),
                    WeatherFailure::LocationNotFound(_) => Some(
                        "Check the spelling of the city or set your location manually.".to_string(),
                    ),
                    _ => Some("Please try again in a few minutes.".to_string()),
                };
                (
                    "WEATHER_UNAVAILABLE",
                    format!("Weather data is unavailable: {}", failure),
                    remediation,
                    None,
                )
            }
            AppError::IdentificationUnavailable(failure) => (
                "IDENTIFICATION_UNAVAILABLE",
                format!("Plant identification is unavailable: {}", failure),
                key_remediation(failure, "GEMINI_API_KEY or HUGGINGFACE_API_KEY"),
                None,
            ),
            AppError::DiagnosisUnavailable(failure) => (
                "DIAGNOSIS_UNAVAILABLE",
                format!("Plant health analysis is unavailable: {}", failure),
                key_remediation(failure, "GEMINI_API_KEY"),
                None,
            ),
            AppError::ChatUnavailable(failure) => (
                "CHAT_UNAVAILABLE",
                format!("The AI botanist is unavailable: {}", failure),
                key_remediation(failure, "GROQ_API_KEY"),
                None,
            ),
            AppError::PersistenceUnavailable(msg) => (
                "PERSISTENCE_UNAVAILABLE",
                format!("Could not access saved data: {}", msg),
                Some("Check that the data directory exists and is writable.".to_string()),
                None,
            ),
            AppError::Validation(err) => (
                "VALIDATION_ERROR",
                err.message.to_string(),
                None,
                Some(err.field.to_string()),
            ),
            AppError::NotFound(resource) => (
                "NOT_FOUND",
                format!("{} not found", resource),
                None,
                None,
            ),
            AppError::BadRequest(msg) => ("BAD_REQUEST", msg.clone(), None, None),
            AppError::Configuration(msg) => (
                "CONFIGURATION_ERROR",
                format!("Configuration error: {}", msg),
                None,
                None,
            ),
            AppError::Internal(_) => (
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
                None,
                None,
            ),
        };

        ErrorDetail {
            code: code.to_string(),
            message,
            remediation,
            field,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (
            self.status(),
            Json(ErrorResponse {
                error: self.detail(),
            }),
        )
            .into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
