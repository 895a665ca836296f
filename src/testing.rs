//! Test doubles and fixtures shared by the unit and route tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, App};
use anyhow::anyhow;
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::clock::Clock;
use crate::models::{Message, User};
use crate::openai::CompletionClient;
use crate::quota::QuotaTracker;
use crate::stores::{ConversationStore, InMemoryConversationStore, Stores};
use crate::{routes, AppConfig, AppState};

pub const ADMIN_EMAIL: &str = "admin@advey.uz";
pub const PASSWORD: &str = "secret1";

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        ManualClock {
            now: Mutex::new(Utc::now()),
        }
    }
}

impl ManualClock {
    pub fn advance_days(&self, days: i64) {
        *self.now.lock().unwrap() += Duration::days(days);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Echoes the last prompt message back, or fails or hangs when asked to.
#[derive(Default)]
pub struct FakeCompletionClient {
    fail_next: AtomicBool,
    hang: AtomicBool,
    calls: AtomicUsize,
    last_prompt: Mutex<Vec<Message>>,
}

impl FakeCompletionClient {
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Every later call stays pending forever.
    pub fn hang(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Vec<Message> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for FakeCompletionClient {
    async fn complete(&self, messages: &[Message]) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = messages.to_vec();

        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(anyhow!("upstream returned 503 Service Unavailable"));
        }

        let question = messages.last().map(|m| m.content.as_str()).unwrap_or("");
        Ok(format!("Answer to: {}", question))
    }
}

/// In-memory conversation store whose writes can be made to fail.
#[derive(Default)]
pub struct FlakyConversationStore {
    inner: InMemoryConversationStore,
    fail_append: AtomicBool,
    fail_clear: AtomicBool,
}

impl FlakyConversationStore {
    pub fn fail_appends(&self) {
        self.fail_append.store(true, Ordering::SeqCst);
    }

    pub fn fail_clears(&self) {
        self.fail_clear.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConversationStore for FlakyConversationStore {
    async fn messages(&self, user_id: &str) -> anyhow::Result<Vec<Message>> {
        self.inner.messages(user_id).await
    }

    async fn append(&self, user_id: &str, messages: Vec<Message>) -> anyhow::Result<()> {
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(anyhow!("conversation store is read-only"));
        }
        self.inner.append(user_id, messages).await
    }

    async fn clear(&self, user_id: &str) -> anyhow::Result<()> {
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(anyhow!("conversation store is read-only"));
        }
        self.inner.clear(user_id).await
    }

    async fn remove(&self, user_id: &str) -> anyhow::Result<()> {
        self.inner.remove(user_id).await
    }

    async fn total_messages(&self) -> anyhow::Result<usize> {
        self.inner.total_messages().await
    }
}

/// Argon2id with tiny costs so tests stay fast.
pub fn cheap_hasher() -> Argon2<'static> {
    Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(1024, 1, 1, None).unwrap(),
    )
}

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: "test-secret".to_string(),
        groq_api_key: "unused".to_string(),
        groq_api_base: "http://localhost:0".to_string(),
        groq_model: "test-model".to_string(),
        admin_email: Some(ADMIN_EMAIL.to_string()),
    }
}

pub struct TestContext {
    pub state: Arc<AppState>,
    pub stores: Stores,
    pub clock: Arc<ManualClock>,
    pub completions: Arc<FakeCompletionClient>,
}

impl TestContext {
    pub fn new() -> Self {
        let stores = Stores::in_memory();
        let clock = Arc::new(ManualClock::default());
        let completions = Arc::new(FakeCompletionClient::default());
        let state = Arc::new(AppState::new(
            &test_config(),
            stores.clone(),
            clock.clone(),
            completions.clone(),
            cheap_hasher(),
        ));
        TestContext {
            state,
            stores,
            clock,
            completions,
        }
    }

    pub async fn register(&self, name: &str, email: &str) -> User {
        self.state
            .credentials
            .register(Some(name), Some(email), Some(PASSWORD))
            .await
            .unwrap()
    }

    pub fn token_for(&self, user: &User) -> String {
        self.state.jwt_keys.sign(&user.id).unwrap()
    }
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {}", token))
}

/// The production route table on top of the context's state.
pub fn test_app(
    ctx: &TestContext,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let jwt_keys = ctx.state.jwt_keys.clone();
    App::new()
        .wrap(Cors::permissive())
        .app_data(web::Data::new(ctx.state.clone()))
        .app_data(routes::json_config())
        .configure(move |cfg| routes::configure(cfg, jwt_keys))
}

/// Polls until spawned releases have landed.
pub async fn wait_for_count(tracker: &QuotaTracker, user_id: &str, expected: u32) {
    let settled = tokio::time::timeout(std::time::Duration::from_secs(1), async {
        while tracker.peek(user_id).await.unwrap().count != expected {
            tokio::task::yield_now().await;
        }
    })
    .await;
    assert!(
        settled.is_ok(),
        "quota count for {user_id} never reached {expected}"
    );
}
