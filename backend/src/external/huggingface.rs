//! Hugging Face inference client for visual question answering

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{check_status, http_client, ProviderError};

#[derive(Clone)]
pub struct HuggingFaceClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct VqaRequest<'a> {
    inputs: VqaInputs<'a>,
}

#[derive(Debug, Serialize)]
struct VqaInputs<'a> {
    image: String,
    question: &'a str,
}

/// One ranked answer from the model
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VqaAnswer {
    pub answer: String,
    #[serde(default)]
    pub score: f64,
}

impl HuggingFaceClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Ask a question about an image, returning answers best first
    pub async fn ask_image(
        &self,
        image: &[u8],
        question: &str,
    ) -> Result<Vec<VqaAnswer>, ProviderError> {
        if !self.has_key() {
            return Err(ProviderError::MissingKey);
        }

        let url = format!(
            "{}/models/{}",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let request = VqaRequest {
            inputs: VqaInputs {
                image: STANDARD.encode(image),
                question,
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let mut answers: Vec<VqaAnswer> = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        answers.sort_by(|a, b| b.score.total_cmp(&a.score));
        if answers.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(answers)
    }
}
