//! Assistant chat history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of exchanges kept on disk
pub const CHAT_HISTORY_LIMIT: usize = 100;

/// One question/answer exchange with the assistant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatEntry {
    pub timestamp: DateTime<Utc>,
    pub user_message: String,
    pub assistant_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_context: Option<String>,
}
