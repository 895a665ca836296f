use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::clock::Clock;
use crate::conversation::{ConversationLog, CONTEXT_WINDOW};
use crate::error::ApiError;
use crate::models::Message;
use crate::openai::CompletionClient;
use crate::prompts::{Language, Prompts};
use crate::quota::QuotaTracker;

#[derive(Debug, Serialize)]
pub struct ChatOutcome {
    pub response: String,
    pub remaining: u32,
}

pub struct ChatOrchestrator {
    quota: Arc<QuotaTracker>,
    conversations: Arc<ConversationLog>,
    completions: Arc<dyn CompletionClient>,
    clock: Arc<dyn Clock>,
}

impl ChatOrchestrator {
    pub fn new(
        quota: Arc<QuotaTracker>,
        conversations: Arc<ConversationLog>,
        completions: Arc<dyn CompletionClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        ChatOrchestrator {
            quota,
            conversations,
            completions,
            clock,
        }
    }

    /// Runs one exchange. Nothing is recorded or charged unless the upstream call succeeds.
    pub async fn handle_chat(
        &self,
        user_id: &str,
        message: &str,
        language: Option<Language>,
    ) -> Result<ChatOutcome, ApiError> {
        let reservation = match self.quota.check_and_reserve(user_id).await? {
            Ok(reservation) => reservation,
            Err(_) => return Err(ApiError::QuotaExceeded(language)),
        };

        let prompt = match self.build_prompt(user_id, message, language).await {
            Ok(prompt) => prompt,
            Err(e) => {
                self.quota.release(reservation).await?;
                return Err(e.into());
            }
        };

        let response = match self.completions.complete(&prompt).await {
            Ok(response) => response,
            Err(e) => {
                error!("Completion failed for user {}: {:?}", user_id, e);
                self.quota.release(reservation).await?;
                return Err(ApiError::Upstream(e));
            }
        };

        if let Err(e) = self
            .conversations
            .append_exchange(user_id, message, &response)
            .await
        {
            self.quota.release(reservation).await?;
            return Err(e.into());
        }

        let remaining = self.quota.commit(reservation).await?;
        info!("User {} chatted, {} exchanges left today", user_id, remaining);

        Ok(ChatOutcome {
            response,
            remaining,
        })
    }

    /// System prompt, then the recent context window, then the new question.
    async fn build_prompt(
        &self,
        user_id: &str,
        message: &str,
        language: Option<Language>,
    ) -> anyhow::Result<Vec<Message>> {
        let now = self.clock.now();
        let mut prompt = vec![Message::system(Prompts::system(language), now)];
        prompt.extend(
            self.conversations
                .recent_context(user_id, CONTEXT_WINDOW)
                .await?,
        );
        prompt.push(Message::user(message, now));
        Ok(prompt)
    }
}
