use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::error::ApiError;
use crate::models::user::Role;
use crate::models::User;
use crate::quota::QuotaTracker;
use crate::stores::Stores;

pub const MIN_PASSWORD_LEN: usize = 6;

pub struct CredentialStore {
    stores: Stores,
    quota: Arc<QuotaTracker>,
    clock: Arc<dyn Clock>,
    hasher: Argon2<'static>,
    admin_email: Option<String>,
}

fn required<'a>(field: Option<&'a str>) -> Option<&'a str> {
    field.filter(|value| !value.is_empty())
}

impl CredentialStore {
    pub fn new(
        stores: Stores,
        quota: Arc<QuotaTracker>,
        clock: Arc<dyn Clock>,
        hasher: Argon2<'static>,
        admin_email: Option<String>,
    ) -> Self {
        CredentialStore {
            stores,
            quota,
            clock,
            hasher,
            admin_email,
        }
    }

    fn role_for(&self, email: &str) -> Role {
        match &self.admin_email {
            Some(admin) if admin.to_lowercase() == email.to_lowercase() => Role::Admin,
            _ => Role::User,
        }
    }

    /// Creates the user along with an empty conversation log and a zeroed quota.
    pub async fn register(
        &self,
        name: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<User, ApiError> {
        let (Some(name), Some(email), Some(password)) =
            (required(name), required(email), required(password))
        else {
            return Err(ApiError::validation(
                "Barcha maydonlarni to'ldiring / Fill all fields",
            ));
        };

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::validation(
                "Parol kamida 6 ta belgidan iborat bo'lishi kerak / Password must be at least 6 characters",
            ));
        }

        if self.stores.users.find_by_email(email).await?.is_some() {
            info!("Registration refused, email already registered");
            return Err(ApiError::DuplicateEmail);
        }

        let password_hash = self.hash_password(password).await?;
        let user = User {
            created_at: self.clock.now(),
            ..User::new(name, email, &password_hash, self.role_for(email))
        };

        // The store re-checks the email under its own lock.
        let user = match self.stores.users.insert(user).await? {
            Ok(user) => user,
            Err(_) => return Err(ApiError::DuplicateEmail),
        };

        if let Err(e) = self.initialize_state(&user.id).await {
            error!("Rolling back registration of user {}: {:?}", user.id, e);
            self.stores.users.remove(&user.id).await?;
            return Err(e.into());
        }

        info!("User {} registered with role {:?}", user.id, user.role);
        Ok(user)
    }

    async fn initialize_state(&self, user_id: &str) -> Result<()> {
        self.stores.conversations.clear(user_id).await?;
        self.quota.reset(user_id).await
    }

    pub async fn authenticate(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<User, ApiError> {
        let (Some(email), Some(password)) = (required(email), required(password)) else {
            return Err(ApiError::validation(
                "Email va parolni kiriting / Enter email and password",
            ));
        };

        let Some(user) = self.stores.users.find_by_email(email).await? else {
            warn!("Login failed for unknown email");
            return Err(ApiError::InvalidCredentials);
        };

        if !self.verify_password(password, &user.password_hash).await? {
            warn!("Login failed for user {}", user.id);
            return Err(ApiError::InvalidCredentials);
        }

        info!("User {} logged in", user.id);
        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        self.stores.users.get(id).await
    }

    async fn hash_password(&self, password: &str) -> Result<String> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || -> Result<String> {
            let salt = SaltString::generate(&mut OsRng);
            hasher
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| anyhow!("Failed to hash password: {}", e))
        })
        .await
        .context("Password hashing task failed")?
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        tokio::task::spawn_blocking(move || -> Result<bool> {
            let parsed = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow!("Stored password hash is malformed: {}", e))?;
            Ok(hasher
                .verify_password(password.as_bytes(), &parsed)
                .is_ok())
        })
        .await
        .context("Password verification task failed")?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{cheap_hasher, FlakyConversationStore, ManualClock};

    fn credentials(admin_email: Option<&str>) -> (CredentialStore, Stores) {
        credentials_over(Stores::in_memory(), admin_email)
    }

    fn credentials_over(stores: Stores, admin_email: Option<&str>) -> (CredentialStore, Stores) {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::default());
        let quota = Arc::new(QuotaTracker::new(stores.quotas.clone(), clock.clone()));
        let credentials = CredentialStore::new(
            stores.clone(),
            quota,
            clock,
            cheap_hasher(),
            admin_email.map(str::to_string),
        );
        (credentials, stores)
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let (credentials, stores) = credentials(None);
        let user = credentials
            .register(Some("Alice"), Some("a@x.com"), Some("secret1"))
            .await
            .unwrap();

        assert_ne!(user.password_hash, "secret1");
        assert_eq!(user.role, Role::User);
        assert!(stores.quotas.get(&user.id).await.unwrap().is_some());

        let found = credentials
            .authenticate(Some("A@x.com"), Some("secret1"))
            .await
            .unwrap();
        assert_eq!(found.id, user.id);

        let wrong = credentials
            .authenticate(Some("a@x.com"), Some("secret2"))
            .await
            .unwrap_err();
        assert!(matches!(wrong, ApiError::InvalidCredentials));

        let unknown = credentials
            .authenticate(Some("b@x.com"), Some("secret1"))
            .await
            .unwrap_err();
        assert!(matches!(unknown, ApiError::InvalidCredentials));
    }

    #[tokio::test]
    async fn duplicate_email_is_case_insensitive() {
        let (credentials, _) = credentials(None);
        credentials
            .register(Some("Alice"), Some("a@x.com"), Some("secret1"))
            .await
            .unwrap();

        let err = credentials
            .register(Some("Other"), Some("A@X.com"), Some("secret2"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateEmail));
    }

    #[tokio::test]
    async fn validation_errors() {
        let (credentials, stores) = credentials(None);

        let missing = credentials
            .register(Some("Alice"), None, Some("secret1"))
            .await
            .unwrap_err();
        assert!(matches!(missing, ApiError::Validation(_)));

        let empty = credentials
            .register(Some(""), Some("a@x.com"), Some("secret1"))
            .await
            .unwrap_err();
        assert!(matches!(empty, ApiError::Validation(_)));

        let short = credentials
            .register(Some("Alice"), Some("a@x.com"), Some("12345"))
            .await
            .unwrap_err();
        assert!(matches!(short, ApiError::Validation(_)));

        assert!(stores.users.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn configured_admin_email_gets_admin_role() {
        let (credentials, _) = credentials(Some("Boss@x.com"));
        let admin = credentials
            .register(Some("Boss"), Some("boss@X.com"), Some("secret1"))
            .await
            .unwrap();
        assert!(admin.is_admin());

        let user = credentials
            .register(Some("Alice"), Some("a@x.com"), Some("secret1"))
            .await
            .unwrap();
        assert!(!user.is_admin());
    }

    #[tokio::test]
    async fn failed_setup_rolls_back_the_user() {
        let conversations = Arc::new(FlakyConversationStore::default());
        conversations.fail_clears();
        let stores = Stores {
            conversations: conversations.clone(),
            ..Stores::in_memory()
        };
        let (credentials, stores) = credentials_over(stores, None);

        let err = credentials
            .register(Some("Alice"), Some("a@x.com"), Some("secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
        assert!(stores.users.list().await.unwrap().is_empty());
        assert!(stores.quotas.all().await.unwrap().is_empty());
        assert!(stores
            .users
            .find_by_email("a@x.com")
            .await
            .unwrap()
            .is_none());
    }
}
