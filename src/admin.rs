use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::conversation::ConversationLog;
use crate::error::ApiError;
use crate::models::{DailyQuota, HistoryEntry, User};
use crate::quota::QuotaTracker;
use crate::stores::UserStore;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOverview {
    pub id: String,
    pub name: String,
    pub email: String,
    pub registered_at: DateTime<Utc>,
    pub total_messages: usize,
    pub daily_limit: DailyQuota,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: usize,
    pub total_messages: usize,
    pub active_today: usize,
    pub total_questions: usize,
}

#[derive(Debug, Serialize)]
pub struct UserIdentity {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct UserHistory {
    pub user: UserIdentity,
    pub history: Vec<HistoryEntry>,
}

/// Read-only aggregation over all stores, plus user deletion, for admin accounts.
pub struct AdminView {
    users: Arc<dyn UserStore>,
    conversations: Arc<ConversationLog>,
    quota: Arc<QuotaTracker>,
}

impl AdminView {
    pub fn new(
        users: Arc<dyn UserStore>,
        conversations: Arc<ConversationLog>,
        quota: Arc<QuotaTracker>,
    ) -> Self {
        AdminView {
            users,
            conversations,
            quota,
        }
    }

    pub async fn is_admin(&self, user_id: &str) -> Result<bool> {
        Ok(self
            .users
            .get(user_id)
            .await?
            .map(|user| user.is_admin())
            .unwrap_or(false))
    }

    pub async fn require_admin(&self, user_id: &str) -> Result<User, ApiError> {
        match self.users.get(user_id).await? {
            Some(user) if user.is_admin() => Ok(user),
            _ => {
                warn!("User {} attempted an admin action", user_id);
                Err(ApiError::forbidden(
                    "Ruxsat yo'q. Faqat admin uchun / Access denied. Admin only.",
                ))
            }
        }
    }

    pub async fn list_users(&self) -> Result<Vec<UserOverview>> {
        let mut overviews = Vec::new();
        for user in self.users.list().await? {
            overviews.push(UserOverview {
                total_messages: self.conversations.message_count(&user.id).await?,
                daily_limit: self.quota.peek(&user.id).await?,
                id: user.id,
                name: user.name,
                email: user.email,
                registered_at: user.created_at,
            });
        }
        Ok(overviews)
    }

    pub async fn stats(&self) -> Result<AdminStats> {
        let total_users = self.users.list().await?.len();
        let exchanges = self.conversations.total_exchanges().await?;
        Ok(AdminStats {
            total_users,
            total_messages: exchanges,
            active_today: self.quota.active_today().await?,
            total_questions: exchanges,
        })
    }

    pub async fn user_history(&self, user_id: &str) -> Result<UserHistory, ApiError> {
        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Foydalanuvchi topilmadi / User not found"))?;

        Ok(UserHistory {
            history: self.conversations.full_history(user_id).await?,
            user: UserIdentity {
                name: user.name,
                email: user.email,
            },
        })
    }

    /// Removes the user record, the conversation log and the quota entry together.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), ApiError> {
        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Foydalanuvchi topilmadi / User not found"))?;

        if user.is_admin() {
            return Err(ApiError::forbidden(
                "Adminni o'chirib bo'lmaydi / Cannot delete admin user",
            ));
        }

        if self.users.remove(user_id).await?.is_none() {
            return Err(ApiError::not_found(
                "Foydalanuvchi topilmadi / User not found",
            ));
        }
        self.conversations.remove(user_id).await?;
        self.quota.remove(user_id).await?;

        info!("Deleted user {} and all associated data", user_id);
        Ok(())
    }
}
