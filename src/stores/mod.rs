//! Storage seams for users, conversations and daily quotas.
//!
//! Handlers and services only see the traits below. The in-memory
//! implementations in [`memory`] back the running service; a persistent
//! backend can be swapped in by building [`Stores`] from other implementations.

mod memory;

pub use memory::{InMemoryConversationStore, InMemoryQuotaStore, InMemoryUserStore};

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{DailyQuota, Message, User};

#[derive(Debug, thiserror::Error)]
#[error("a user with this email already exists")]
pub struct EmailTaken;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts the user unless another user already holds the same email
    /// (case-insensitive). The check and the insert happen atomically.
    async fn insert(&self, user: User) -> Result<std::result::Result<User, EmailTaken>>;
    async fn get(&self, id: &str) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list(&self) -> Result<Vec<User>>;
    async fn remove(&self, id: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn messages(&self, user_id: &str) -> Result<Vec<Message>>;
    /// Appends all messages in order as one step.
    async fn append(&self, user_id: &str, messages: Vec<Message>) -> Result<()>;
    /// Leaves an empty log in place for the user.
    async fn clear(&self, user_id: &str) -> Result<()>;
    async fn remove(&self, user_id: &str) -> Result<()>;
    async fn total_messages(&self) -> Result<usize>;
}

#[async_trait]
pub trait QuotaStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<DailyQuota>>;
    async fn put(&self, user_id: &str, quota: DailyQuota) -> Result<()>;
    async fn remove(&self, user_id: &str) -> Result<()>;
    async fn all(&self) -> Result<Vec<(String, DailyQuota)>>;
}

/// Collection of all stores, shared by the services.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub conversations: Arc<dyn ConversationStore>,
    pub quotas: Arc<dyn QuotaStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Stores {
            users: Arc::new(InMemoryUserStore::default()),
            conversations: Arc::new(InMemoryConversationStore::default()),
            quotas: Arc::new(InMemoryQuotaStore::default()),
        }
    }
}
