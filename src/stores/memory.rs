use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ConversationStore, EmailTaken, QuotaStore, UserStore};
use crate::models::{DailyQuota, Message, User};

/// Users in registration order.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> Result<std::result::Result<User, EmailTaken>> {
        let mut users = self.users.write().await;
        if users.iter().any(|existing| existing.has_email(&user.email)) {
            return Ok(Err(EmailTaken));
        }
        users.push(user.clone());
        Ok(Ok(user))
    }

    async fn get(&self, id: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.has_email(email)).cloned())
    }

    async fn list(&self) -> Result<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn remove(&self, id: &str) -> Result<Option<User>> {
        let mut users = self.users.write().await;
        let removed = users
            .iter()
            .position(|user| user.id == id)
            .map(|index| users.remove(index));
        Ok(removed)
    }
}

#[derive(Default)]
pub struct InMemoryConversationStore {
    logs: RwLock<HashMap<String, Vec<Message>>>,
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn messages(&self, user_id: &str) -> Result<Vec<Message>> {
        let logs = self.logs.read().await;
        Ok(logs.get(user_id).cloned().unwrap_or_default())
    }

    async fn append(&self, user_id: &str, messages: Vec<Message>) -> Result<()> {
        let mut logs = self.logs.write().await;
        logs.entry(user_id.to_string()).or_default().extend(messages);
        Ok(())
    }

    async fn clear(&self, user_id: &str) -> Result<()> {
        let mut logs = self.logs.write().await;
        logs.insert(user_id.to_string(), Vec::new());
        Ok(())
    }

    async fn remove(&self, user_id: &str) -> Result<()> {
        self.logs.write().await.remove(user_id);
        Ok(())
    }

    async fn total_messages(&self) -> Result<usize> {
        let logs = self.logs.read().await;
        Ok(logs.values().map(Vec::len).sum())
    }
}

#[derive(Default)]
pub struct InMemoryQuotaStore {
    quotas: RwLock<HashMap<String, DailyQuota>>,
}

#[async_trait]
impl QuotaStore for InMemoryQuotaStore {
    async fn get(&self, user_id: &str) -> Result<Option<DailyQuota>> {
        Ok(self.quotas.read().await.get(user_id).copied())
    }

    async fn put(&self, user_id: &str, quota: DailyQuota) -> Result<()> {
        self.quotas.write().await.insert(user_id.to_string(), quota);
        Ok(())
    }

    async fn remove(&self, user_id: &str) -> Result<()> {
        self.quotas.write().await.remove(user_id);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<(String, DailyQuota)>> {
        let quotas = self.quotas.read().await;
        Ok(quotas
            .iter()
            .map(|(user_id, quota)| (user_id.clone(), *quota))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;

    #[tokio::test]
    async fn insert_rejects_email_in_any_case() {
        let store = InMemoryUserStore::default();
        let first = User::new("Alice", "a@x.com", "hash", Role::User);
        assert!(store.insert(first).await.unwrap().is_ok());

        let second = User::new("Alice again", "A@X.COM", "hash", Role::User);
        assert!(store.insert(second).await.unwrap().is_err());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn append_keeps_order_and_clear_empties() {
        let store = InMemoryConversationStore::default();
        let now = chrono::Utc::now();
        store
            .append(
                "u1",
                vec![Message::user("hi", now), Message::assistant("hello", now)],
            )
            .await
            .unwrap();

        let messages = store.messages("u1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hi");
        assert_eq!(messages[1].content, "hello");
        assert_eq!(store.total_messages().await.unwrap(), 2);

        store.clear("u1").await.unwrap();
        assert!(store.messages("u1").await.unwrap().is_empty());
    }
}
