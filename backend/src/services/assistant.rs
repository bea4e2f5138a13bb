//! AI botanist features: identification, health diagnosis, chat and alert
//! wording.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{default_alert_message, AlertKind, ChatEntry, Plant, WeatherSnapshot};

use crate::config::AiConfig;
use crate::error::{AppError, AppResult, AssistantFailure};
use crate::external::groq::CHAT_MAX_TOKENS;
use crate::external::{GeminiClient, GroqClient, HuggingFaceClient, ProviderError};
use crate::services::GardenStore;

const IDENTIFY_PROMPT: &str = "You are an expert botanist. Analyze this image very carefully and \
do not guess: describe only what is actually visible.

Look at the fruits or flowers, the leaf shape, the stem structure and the dominant colors.

Format your response EXACTLY as:
Plant Name: [specific common name, e.g. Tomato Plant, Rose, Snake Plant]
Scientific Name: [scientific name or \"Unknown\"]
Description: [what you see: fruits, leaves, stems, colors]
Care Level: [Easy/Moderate/Difficult]";

const VQA_QUESTIONS: [&str; 2] = [
    "What kind of plant is this?",
    "What is the common name of this plant?",
];

const ALERT_MAX_TOKENS: u32 = 200;

/// Result of identifying a plant from a photo
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlantIdentification {
    pub plant_name: String,
    pub scientific_name: String,
    pub description: String,
    pub care_level: String,
    pub confidence: String,
    pub source: &'static str,
}

/// Free-text health assessment
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub analysis: String,
    pub question: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Anything that can name a plant from an image
#[async_trait]
pub trait PlantIdentifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Providers without credentials are skipped
    fn is_configured(&self) -> bool;

    async fn identify(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<PlantIdentification, ProviderError>;
}

fn failure(error: ProviderError) -> AssistantFailure {
    match error {
        ProviderError::MissingKey => AssistantFailure::NotConfigured,
        ProviderError::Unauthorized => AssistantFailure::InvalidApiKey,
        ProviderError::RateLimited => AssistantFailure::RateLimited,
        ProviderError::Loading => AssistantFailure::ModelLoading,
        ProviderError::EmptyResponse => AssistantFailure::EmptyResponse,
        other => AssistantFailure::Provider(other.to_string()),
    }
}

fn field_value(line: &str) -> String {
    line.split_once(':')
        .map(|(_, value)| value)
        .unwrap_or(line)
        .replace('*', "")
        .trim()
        .to_string()
}

/// Read the labelled lines of a botanist-format reply
pub fn parse_identification(text: &str) -> PlantIdentification {
    let mut result = PlantIdentification {
        plant_name: "Unknown Plant".to_string(),
        scientific_name: "Unknown".to_string(),
        description: "Could not identify plant details.".to_string(),
        care_level: "Moderate".to_string(),
        confidence: "low".to_string(),
        source: "Gemini",
    };

    for line in text.lines() {
        let lower = line.to_lowercase();
        let value = field_value(line);
        if value.is_empty() {
            continue;
        }

        if lower.contains("scientific name:") {
            result.scientific_name = value;
        } else if lower.contains("plant name:") || lower.contains("common name:") {
            result.plant_name = value;
        } else if lower.contains("description:") {
            result.description = value;
        } else if lower.contains("care level:") {
            result.care_level = value;
        }
    }

    if result.plant_name != "Unknown Plant" {
        result.confidence = "high".to_string();
    }
    result
}

/// Gemini vision identification
pub struct GeminiIdentifier(pub GeminiClient);

#[async_trait]
impl PlantIdentifier for GeminiIdentifier {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    fn is_configured(&self) -> bool {
        self.0.has_key()
    }

    async fn identify(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<PlantIdentification, ProviderError> {
        let text = self.0.describe_image(IDENTIFY_PROMPT, image, mime_type).await?;
        Ok(parse_identification(&text))
    }
}

/// Hugging Face visual question answering identification
pub struct HuggingFaceIdentifier(pub HuggingFaceClient);

fn is_unknown_answer(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    answer.is_empty() || matches!(answer.as_str(), "unknown" | "i don't know" | "i cannot")
}

#[async_trait]
impl PlantIdentifier for HuggingFaceIdentifier {
    fn name(&self) -> &'static str {
        "Hugging Face VQA"
    }

    fn is_configured(&self) -> bool {
        self.0.has_key()
    }

    async fn identify(
        &self,
        image: &[u8],
        _mime_type: &str,
    ) -> Result<PlantIdentification, ProviderError> {
        let mut plant_name = None;
        for question in VQA_QUESTIONS {
            let answers = self.0.ask_image(image, question).await?;
            if let Some(best) = answers.into_iter().find(|a| !is_unknown_answer(&a.answer)) {
                plant_name = Some(best.answer.trim().to_string());
                break;
            }
        }

        let plant_name = plant_name.unwrap_or_else(|| "Unknown Plant".to_string());
        Ok(PlantIdentification {
            description: format!("This appears to be a {}.", plant_name.to_lowercase()),
            scientific_name: "Unknown".to_string(),
            care_level: "Moderate".to_string(),
            confidence: "medium".to_string(),
            source: "Hugging Face VQA",
            plant_name,
        })
    }
}

/// Facade over the AI providers
#[derive(Clone)]
pub struct PlantAssistant {
    identifiers: Vec<Arc<dyn PlantIdentifier>>,
    gemini: GeminiClient,
    groq: GroqClient,
    /// Groq client with a short timeout for alert wording
    alert_groq: GroqClient,
    store: Arc<GardenStore>,
}

impl PlantAssistant {
    pub fn new(
        identifiers: Vec<Arc<dyn PlantIdentifier>>,
        gemini: GeminiClient,
        groq: GroqClient,
        store: Arc<GardenStore>,
    ) -> Self {
        Self {
            identifiers,
            gemini,
            alert_groq: groq.clone(),
            groq,
            store,
        }
    }

    pub fn with_alert_client(mut self, groq: GroqClient) -> Self {
        self.alert_groq = groq;
        self
    }

    pub fn from_config(config: &AiConfig, store: Arc<GardenStore>) -> AppResult<Self> {
        let configuration = |e: ProviderError| AppError::Configuration(e.to_string());
        let gemini = GeminiClient::new(
            &config.gemini_api_key,
            &config.gemini_endpoint,
            &config.gemini_model,
            config.timeout_secs,
        )
        .map_err(configuration)?;
        let huggingface = HuggingFaceClient::new(
            &config.huggingface_api_key,
            &config.huggingface_endpoint,
            &config.huggingface_model,
            config.timeout_secs,
        )
        .map_err(configuration)?;
        let groq = GroqClient::new(
            &config.groq_api_key,
            &config.groq_endpoint,
            &config.groq_model,
            config.timeout_secs,
        )
        .map_err(configuration)?;
        let alert_groq = GroqClient::new(
            &config.groq_api_key,
            &config.groq_endpoint,
            &config.groq_model,
            config.alert_timeout_secs,
        )
        .map_err(configuration)?;

        Ok(Self::new(
            vec![
                Arc::new(GeminiIdentifier(gemini.clone())),
                Arc::new(HuggingFaceIdentifier(huggingface)),
            ],
            gemini,
            groq,
            store,
        )
        .with_alert_client(alert_groq))
    }

    /// Try each configured identifier in order
    pub async fn identify(&self, image: &[u8], mime_type: &str) -> AppResult<PlantIdentification> {
        let mut last_failure = AssistantFailure::NotConfigured;

        for identifier in self.identifiers.iter().filter(|i| i.is_configured()) {
            match identifier.identify(image, mime_type).await {
                Ok(identification) => {
                    tracing::info!(
                        "{} identified plant as {}",
                        identifier.name(),
                        identification.plant_name
                    );
                    return Ok(identification);
                }
                Err(e) => {
                    tracing::warn!("Identification via {} failed: {}", identifier.name(), e);
                    last_failure = failure(e);
                }
            }
        }

        Err(AppError::IdentificationUnavailable(last_failure))
    }

    /// Health assessment for a photo, optionally focused on a question
    pub async fn diagnose(
        &self,
        image: &[u8],
        mime_type: &str,
        question: Option<&str>,
    ) -> AppResult<Diagnosis> {
        let question = question.map(str::trim).filter(|q| !q.is_empty());
        let prompt = diagnosis_prompt(question);

        let analysis = self
            .gemini
            .describe_image(&prompt, image, mime_type)
            .await
            .map_err(|e| {
                tracing::warn!("Health analysis failed: {}", e);
                AppError::DiagnosisUnavailable(failure(e))
            })?;

        Ok(Diagnosis {
            analysis,
            question: question.map(str::to_string),
            timestamp: Utc::now(),
        })
    }

    /// Ask the botanist a question and record the exchange
    pub async fn chat(&self, message: &str, plant_context: Option<&str>) -> AppResult<ChatEntry> {
        shared::validate_chat_message(message)?;
        let plant_context = plant_context.map(str::trim).filter(|c| !c.is_empty());

        let reply = self
            .groq
            .complete(&chat_system_prompt(plant_context), message.trim(), CHAT_MAX_TOKENS)
            .await
            .map_err(|e| {
                tracing::warn!("Chat failed: {}", e);
                AppError::ChatUnavailable(failure(e))
            })?;

        let entry = ChatEntry {
            timestamp: Utc::now(),
            user_message: message.trim().to_string(),
            assistant_response: reply,
            plant_context: plant_context.map(str::to_string),
        };
        self.store.add_chat_entry(entry.clone()).await?;
        Ok(entry)
    }

    /// Alert wording for one weather snapshot
    pub fn alert_writer<'a>(&'a self, snapshot: &'a WeatherSnapshot) -> AlertWriter<'a> {
        AlertWriter {
            groq: &self.alert_groq,
            snapshot,
            polish: self.alert_groq.has_key(),
            cache: HashMap::new(),
        }
    }
}

/// Words alerts for one dashboard build. Each alert kind is polished once
/// per species; after the first polish failure the rest use templates.
pub struct AlertWriter<'a> {
    groq: &'a GroqClient,
    snapshot: &'a WeatherSnapshot,
    polish: bool,
    cache: HashMap<(AlertKind, String), String>,
}

impl AlertWriter<'_> {
    /// Friendly alert text, polished by the chat model when available
    pub async fn message(&mut self, kind: AlertKind, plant: &Plant) -> String {
        let key = (kind, plant.species.to_lowercase());
        if let Some(message) = self.cache.get(&key) {
            return message.clone();
        }

        let snapshot = self.snapshot;
        let template = default_alert_message(
            kind,
            &plant.species,
            &snapshot.city,
            snapshot.temperature_celsius,
        );
        let message = if self.polish {
            let system =
                "You are a helpful garden assistant. Generate friendly, concise alert messages.";
            match self
                .groq
                .complete(system, &alert_prompt(kind, plant, snapshot), ALERT_MAX_TOKENS)
                .await
            {
                Ok(message) => message,
                Err(e) => {
                    tracing::debug!("Alert polish failed, using templates: {}", e);
                    self.polish = false;
                    template
                }
            }
        } else {
            template
        };

        self.cache.insert(key, message.clone());
        message
    }
}

fn diagnosis_prompt(question: Option<&str>) -> String {
    format!(
        "You are an expert botanist with years of experience. Analyze this plant image carefully \
and provide a detailed health assessment.

USER'S QUESTION/CONCERN: {}

Please examine the image and provide:

1. **Health Status**: Rate the plant's health (Excellent/Good/Fair/Poor/Critical)
2. **Visible Issues**: leaf condition, stem condition, fruit or flower condition, signs of pests or disease
3. **Possible Causes**: What might be causing any issues you see?
4. **Immediate Actions**: Step-by-step recommendations to improve plant health
5. **Prevention**: How to prevent future issues

Be specific, helpful, and actionable. If the plant looks healthy, mention what's going well and how to maintain it.",
        question.unwrap_or("Please analyze the overall health of this plant")
    )
}

fn chat_system_prompt(plant_context: Option<&str>) -> String {
    format!(
        "You are an expert botanist and plant care advisor. You help users with their gardening \
questions in a friendly, knowledgeable way.

Plant context: {}

Provide helpful, accurate advice. If you're unsure, say so. Always prioritize plant health and \
safety. Keep responses concise but informative.",
        plant_context.unwrap_or("General plant care")
    )
}

fn alert_prompt(kind: AlertKind, plant: &Plant, snapshot: &WeatherSnapshot) -> String {
    let description = &snapshot.condition.description;
    match kind {
        AlertKind::Rain => format!(
            "Generate a friendly, helpful alert message for a garden app user.

Situation: Rain is expected soon in {}.
Plant: {}
Weather: {}

Write a short, warm message (2-3 sentences) telling the user to move their outdoor plant to shelter.",
            snapshot.city, plant.species, description
        ),
        AlertKind::Storm => format!(
            "Generate an urgent but calm alert message for a garden app user.

Situation: Severe weather (thunderstorm/hail) is expected in {}.
Plant: {}
Weather: {}

Write a clear, urgent message (2-3 sentences) telling the user to immediately move their outdoor plant indoors.",
            snapshot.city, plant.species, description
        ),
        AlertKind::Heat => format!(
            "Generate a helpful reminder for a garden app user.

Situation: Very hot weather ({}°C) and intense sun.
Plant: {}
Placement: {}

Write a friendly reminder (2-3 sentences) to check if the plant needs extra water or shade.",
            snapshot.temperature_celsius.round_dp(0),
            plant.species,
            plant.placement
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;
    use shared::{Placement, SunPreference, WeatherCondition};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GEMINI_MODEL: &str = "gemini-1.5-flash";
    const VQA_MODEL: &str = "dandelin/vilt-b32-finetuned-vqa";

    struct Clients {
        gemini: GeminiClient,
        huggingface: HuggingFaceClient,
        groq: GroqClient,
    }

    fn clients(uri: &str, gemini_key: &str, hf_key: &str, groq_key: &str) -> Clients {
        Clients {
            gemini: GeminiClient::new(gemini_key, uri, GEMINI_MODEL, 5).unwrap(),
            huggingface: HuggingFaceClient::new(hf_key, uri, VQA_MODEL, 5).unwrap(),
            groq: GroqClient::new(groq_key, uri, "llama-3.3-70b-versatile", 5).unwrap(),
        }
    }

    fn assistant(c: Clients, store: Arc<GardenStore>) -> PlantAssistant {
        PlantAssistant::new(
            vec![
                Arc::new(GeminiIdentifier(c.gemini.clone())),
                Arc::new(HuggingFaceIdentifier(c.huggingface)),
            ],
            c.gemini,
            c.groq,
            store,
        )
    }

    fn store() -> (tempfile::TempDir, Arc<GardenStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(GardenStore::new(dir.path()));
        (dir, store)
    }

    fn plant() -> Plant {
        Plant::new(
            shared::NewPlant {
                species: "Tomato".to_string(),
                scientific_name: None,
                placement: Placement::OpenRoof,
                sun_preference: SunPreference::FullSun,
                watering_interval_days: 2,
                last_watered: None,
                notes: None,
            },
            Utc::now(),
        )
    }

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            city: "Sialkot".to_string(),
            country: "PK".to_string(),
            observed_at: Utc::now(),
            temperature_celsius: Decimal::new(384, 1),
            condition: WeatherCondition::new(800, "Clear", "clear sky"),
            cloud_cover_percent: 5,
            sunrise: None,
            sunset: None,
            recent_rain_mm: None,
            forecast: vec![],
        }
    }

    #[test]
    fn test_parse_identification_strips_markdown() {
        let text = "**Plant Name:** Tomato Plant\n\
                    **Scientific Name:** *Solanum lycopersicum*\n\
                    Description: Red round fruits on a vine.\n\
                    Care Level: Easy";
        let result = parse_identification(text);
        assert_eq!(result.plant_name, "Tomato Plant");
        assert_eq!(result.scientific_name, "Solanum lycopersicum");
        assert_eq!(result.description, "Red round fruits on a vine.");
        assert_eq!(result.care_level, "Easy");
        assert_eq!(result.confidence, "high");
    }

    #[test]
    fn test_parse_identification_defaults() {
        let result = parse_identification("I could not tell.");
        assert_eq!(result.plant_name, "Unknown Plant");
        assert_eq!(result.confidence, "low");
    }

    #[tokio::test]
    async fn test_identify_falls_through_to_huggingface() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/models/{}:generateContent", GEMINI_MODEL)))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/models/{}", VQA_MODEL)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"answer": "aloe", "score": 0.9}
            ])))
            .mount(&server)
            .await;

        let (_dir, store) = store();
        let assistant = assistant(clients(&server.uri(), "AIza", "hf", ""), store);
        let result = assistant.identify(&[1, 2, 3], "image/jpeg").await.unwrap();

        assert_eq!(result.plant_name, "aloe");
        assert_eq!(result.source, "Hugging Face VQA");
    }

    #[tokio::test]
    async fn test_identify_without_keys() {
        let (_dir, store) = store();
        let assistant = assistant(clients("http://127.0.0.1:9", "", "", ""), store);
        let err = assistant.identify(&[1], "image/jpeg").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::IdentificationUnavailable(AssistantFailure::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_diagnose_without_key() {
        let (_dir, store) = store();
        let assistant = assistant(clients("http://127.0.0.1:9", "", "", ""), store);
        let err = assistant
            .diagnose(&[1], "image/jpeg", Some("yellow leaves?"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::DiagnosisUnavailable(AssistantFailure::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_chat_records_history() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "Water at the base in the morning."}}]
            })))
            .mount(&server)
            .await;

        let (_dir, store) = store();
        let assistant = assistant(clients(&server.uri(), "", "", "gsk"), store.clone());
        let entry = assistant
            .chat("How should I water tomatoes?", Some("Tomato on the roof"))
            .await
            .unwrap();

        assert_eq!(entry.assistant_response, "Water at the base in the morning.");
        let history = store.chat_history(None).await.unwrap();
        assert_eq!(history, vec![entry]);
    }

    #[tokio::test]
    async fn test_chat_rate_limited_is_not_recorded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let (_dir, store) = store();
        let assistant = assistant(clients(&server.uri(), "", "", "gsk"), store.clone());
        let err = assistant.chat("hello", None).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::ChatUnavailable(AssistantFailure::RateLimited)
        ));
        assert!(store.chat_history(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_alert_polish_failure_stops_further_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let (_dir, store) = store();
        let assistant = assistant(clients(&server.uri(), "", "", "gsk"), store);
        let snapshot = snapshot();
        let mut writer = assistant.alert_writer(&snapshot);

        let message = writer.message(AlertKind::Heat, &plant()).await;
        assert!(message.starts_with("Heat Alert"));
        assert!(message.contains("38°C"));

        let mut fern = plant();
        fern.species = "Fern".to_string();
        let message = writer.message(AlertKind::Rain, &fern).await;
        assert!(message.contains("Fern"));
    }

    #[tokio::test]
    async fn test_diagnose_with_rejected_gemini_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "details": [{"reason": "API_KEY_INVALID"}]
                }
            })))
            .mount(&server)
            .await;

        let (_dir, store) = store();
        let assistant = assistant(clients(&server.uri(), "AIza-wrong", "", ""), store);
        let err = assistant
            .diagnose(&[1], "image/jpeg", None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::DiagnosisUnavailable(AssistantFailure::InvalidApiKey)
        ));
        assert!(err.detail().remediation.unwrap().contains("GEMINI_API_KEY"));
    }

    #[tokio::test]
    async fn test_alert_polished_once_per_species() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "Your tomato is baking up there!"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (_dir, store) = store();
        let assistant = assistant(clients(&server.uri(), "", "", "gsk"), store);
        let snapshot = snapshot();
        let mut writer = assistant.alert_writer(&snapshot);

        let first = writer.message(AlertKind::Heat, &plant()).await;
        let second = writer.message(AlertKind::Heat, &plant()).await;
        assert_eq!(first, "Your tomato is baking up there!");
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_alert_writer_without_key_uses_template() {
        let (_dir, store) = store();
        let assistant = assistant(clients("http://127.0.0.1:9", "", "", ""), store);
        let snapshot = snapshot();
        let message = assistant
            .alert_writer(&snapshot)
            .message(AlertKind::Storm, &plant())
            .await;
        assert!(message.contains("Tomato"));
    }
}
