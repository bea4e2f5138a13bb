//! Google Gemini client
//!
//! Uses the `generateContent` REST endpoint with an inline base64 image for
//! plant identification and health analysis.

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::{check_status, http_client, ProviderError};

/// Client for the Gemini generative language API
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Image { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    text: Option<String>,
}

/// Gemini answers a bad key with 400 and reason `API_KEY_INVALID`
/// instead of 401, so that case is picked out before the generic mapping.
async fn check_gemini_status(response: Response) -> Result<Response, ProviderError> {
    if response.status() != StatusCode::BAD_REQUEST {
        return check_status(response).await;
    }

    let body = response.text().await.unwrap_or_default();
    if body.contains("API_KEY_INVALID") {
        Err(ProviderError::Unauthorized)
    } else {
        Err(ProviderError::Status(StatusCode::BAD_REQUEST.as_u16(), body))
    }
}

impl GeminiClient {
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

    /// Send a prompt together with an image and return the generated text
    pub async fn describe_image(
        &self,
        prompt: &str,
        image: &[u8],
        mime_type: &str,
    ) -> Result<String, ProviderError> {
        if !self.has_key() {
            return Err(ProviderError::MissingKey);
        }

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::Image {
                        inline_data: InlineData {
                            mime_type,
                            data: STANDARD.encode(image),
                        },
                    },
                ],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let data: GenerateContentResponse = check_gemini_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let text: String = data
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_describe_image_sends_inline_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .and(query_param("key", "AIza-test"))
            .and(body_partial_json(json!({
                "contents": [{"parts": [
                    {"text": "What is this?"},
                    {"inline_data": {"mime_type": "image/png", "data": "AQID"}}
                ]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "Plant Name: Fern\n"}]}}]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new("AIza-test", server.uri(), "gemini-1.5-flash", 5).unwrap();
        let text = client
            .describe_image("What is this?", &[1, 2, 3], "image/png")
            .await
            .unwrap();
        assert_eq!(text, "Plant Name: Fern");
    }

    #[tokio::test]
    async fn test_empty_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let client = GeminiClient::new("AIza-test", server.uri(), "gemini-1.5-flash", 5).unwrap();
        let err = client
            .describe_image("prompt", &[0], "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_rejected_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = GeminiClient::new("bad", server.uri(), "gemini-1.5-flash", 5).unwrap();
        let err = client
            .describe_image("prompt", &[0], "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unauthorized));
    }

    #[tokio::test]
    async fn test_invalid_key_reported_as_bad_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT",
                    "details": [{
                        "@type": "type.googleapis.com/google.rpc.ErrorInfo",
                        "reason": "API_KEY_INVALID"
                    }]
                }
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new("AIza-wrong", server.uri(), "gemini-1.5-flash", 5).unwrap();
        let err = client
            .describe_image("prompt", &[0], "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unauthorized));
    }

    #[tokio::test]
    async fn test_other_bad_request_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "Unsupported MIME type", "status": "INVALID_ARGUMENT"}
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new("AIza-test", server.uri(), "gemini-1.5-flash", 5).unwrap();
        let err = client
            .describe_image("prompt", &[0], "image/tiff")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Status(400, _)));
    }
}
