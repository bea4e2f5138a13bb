//! HTTP handlers for the AI botanist

use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use serde::Deserialize;
use shared::ChatEntry;

use crate::error::{AppError, AppResult};
use crate::services::assistant::{Diagnosis, PlantIdentification};
use crate::AppState;

const DEFAULT_IMAGE_TYPE: &str = "image/jpeg";

/// Uploaded photo plus optional question text
struct ImageUpload {
    bytes: Vec<u8>,
    mime_type: String,
    question: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> AppResult<ImageUpload> {
    let mut image = None;
    let mut question = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let mime_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_IMAGE_TYPE)
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read image: {}", e)))?;
                image = Some((bytes.to_vec(), mime_type));
            }
            Some("question") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read question: {}", e)))?;
                question = Some(text);
            }
            _ => {}
        }
    }

    let (bytes, mime_type) = image
        .filter(|(bytes, _)| !bytes.is_empty())
        .ok_or_else(|| AppError::BadRequest("An image file is required".to_string()))?;
    if !mime_type.starts_with("image/") {
        return Err(AppError::BadRequest(format!(
            "Unsupported file type {}",
            mime_type
        )));
    }

    Ok(ImageUpload {
        bytes,
        mime_type,
        question,
    })
}

/// Identify a plant from a photo
pub async fn identify_plant(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<PlantIdentification>> {
    let upload = read_upload(multipart).await?;
    let result = state
        .assistant
        .identify(&upload.bytes, &upload.mime_type)
        .await?;
    Ok(Json(result))
}

/// Assess plant health from a photo and question
pub async fn diagnose_plant(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<Diagnosis>> {
    let upload = read_upload(multipart).await?;
    let result = state
        .assistant
        .diagnose(&upload.bytes, &upload.mime_type, upload.question.as_deref())
        .await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct ChatInput {
    pub message: String,
    #[serde(default)]
    pub plant_context: Option<String>,
}

/// Ask the botanist a question
pub async fn chat(
    State(state): State<AppState>,
    Json(input): Json<ChatInput>,
) -> AppResult<Json<ChatEntry>> {
    let entry = state
        .assistant
        .chat(&input.message, input.plant_context.as_deref())
        .await?;
    Ok(Json(entry))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// Recent chat exchanges
pub async fn chat_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<ChatEntry>>> {
    Ok(Json(state.store.chat_history(query.limit).await?))
}
