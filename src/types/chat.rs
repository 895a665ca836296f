use serde::{Deserialize, Serialize};

use crate::models::HistoryEntry;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub language: Option<String>,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub remaining_questions: u32,
    pub total_questions: usize,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        MessageResponse {
            message: message.to_string(),
        }
    }
}
