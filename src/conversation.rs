use std::sync::Arc;

use anyhow::Result;

use crate::clock::Clock;
use crate::models::{HistoryEntry, Message};
use crate::stores::ConversationStore;

/// Number of past messages sent along with a new question.
pub const CONTEXT_WINDOW: usize = 5;

pub struct ConversationLog {
    store: Arc<dyn ConversationStore>,
    clock: Arc<dyn Clock>,
}

impl ConversationLog {
    pub fn new(store: Arc<dyn ConversationStore>, clock: Arc<dyn Clock>) -> Self {
        ConversationLog { store, clock }
    }

    /// Records the question and its answer, in that order.
    pub async fn append_exchange(
        &self,
        user_id: &str,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<()> {
        let now = self.clock.now();
        self.store
            .append(
                user_id,
                vec![
                    Message::user(user_text, now),
                    Message::assistant(assistant_text, now),
                ],
            )
            .await
    }

    /// The last `limit` messages, oldest first.
    pub async fn recent_context(&self, user_id: &str, limit: usize) -> Result<Vec<Message>> {
        let mut messages = self.store.messages(user_id).await?;
        let start = messages.len().saturating_sub(limit);
        Ok(messages.split_off(start))
    }

    /// Question/answer pairs, most recent first. A trailing unpaired message is left out.
    pub async fn full_history(&self, user_id: &str) -> Result<Vec<HistoryEntry>> {
        let messages = self.store.messages(user_id).await?;
        let mut history: Vec<HistoryEntry> = messages
            .chunks_exact(2)
            .enumerate()
            .map(|(id, pair)| HistoryEntry {
                id,
                question: pair[0].content.clone(),
                answer: pair[1].content.clone(),
                timestamp: pair[0].created_at,
            })
            .collect();
        history.reverse();
        Ok(history)
    }

    pub async fn clear(&self, user_id: &str) -> Result<()> {
        self.store.clear(user_id).await
    }

    pub async fn remove(&self, user_id: &str) -> Result<()> {
        self.store.remove(user_id).await
    }

    pub async fn message_count(&self, user_id: &str) -> Result<usize> {
        Ok(self.store.messages(user_id).await?.len())
    }

    pub async fn exchange_count(&self, user_id: &str) -> Result<usize> {
        Ok(self.message_count(user_id).await? / 2)
    }

    /// Exchanges across every user.
    pub async fn total_exchanges(&self) -> Result<usize> {
        Ok(self.store.total_messages().await? / 2)
    }
}
