//! External API integrations
//!
//! Thin REST clients for the upstream providers. Each client reports failures
//! as a [`ProviderError`]; services decide which user-facing error kind that
//! becomes.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use thiserror::Error;

pub mod gemini;
pub mod geolocation;
pub mod groq;
pub mod huggingface;
pub mod overpass;
pub mod weather;

pub use gemini::GeminiClient;
pub use geolocation::{GeoProvider, IpApiCo, IpApiCom};
pub use groq::GroqClient;
pub use huggingface::HuggingFaceClient;
pub use overpass::OverpassClient;
pub use weather::WeatherClient;

/// Failure talking to an upstream provider
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("no API key configured")]
    MissingKey,

    #[error("API key rejected")]
    Unauthorized,

    #[error("resource not found")]
    NotFound,

    #[error("rate limited")]
    RateLimited,

    #[error("model is loading")]
    Loading,

    #[error("provider returned {0}: {1}")]
    Status(u16, String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("empty response")]
    EmptyResponse,

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("response missing {0}")]
    Incomplete(&'static str),
}

/// Build an HTTP client with a request timeout
pub(crate) fn http_client(timeout_secs: u64) -> Result<Client, ProviderError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// Map non-success statuses onto provider errors, passing successes through
pub(crate) async fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ProviderError::Unauthorized),
        StatusCode::NOT_FOUND => Err(ProviderError::NotFound),
        StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::RateLimited),
        StatusCode::SERVICE_UNAVAILABLE => Err(ProviderError::Loading),
        _ => {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(ProviderError::Status(status.as_u16(), body))
        }
    }
}
