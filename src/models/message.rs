use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")] // JSON value name
pub enum Role {
    Assistant,
    System,
    User,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: &str, created_at: DateTime<Utc>) -> Self {
        Message {
            role,
            content: content.to_string(),
            created_at,
        }
    }

    pub fn system(content: &str, created_at: DateTime<Utc>) -> Self {
        Self::new(Role::System, content, created_at)
    }

    pub fn user(content: &str, created_at: DateTime<Utc>) -> Self {
        Self::new(Role::User, content, created_at)
    }

    pub fn assistant(content: &str, created_at: DateTime<Utc>) -> Self {
        Self::new(Role::Assistant, content, created_at)
    }
}

/// One question paired with its answer, as shown in history listings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: usize,
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}
