use std::sync::Arc;

use actix_cors::Cors;
use actix_web::web;
use argon2::Argon2;
use shuttle_actix_web::ShuttleActixWeb;
use shuttle_runtime::SecretStore;
use tracing::info;

mod admin;
mod auth;
mod clock;
mod config;
mod conversation;
mod credentials;
mod error;
mod middleware;
mod models;
mod openai;
mod orchestrator;
mod prompts;
mod quota;
mod routes;
mod stores;
mod types;

#[cfg(test)]
mod testing;

use crate::admin::AdminView;
use crate::auth::JWTKeys;
use crate::clock::{Clock, SystemClock};
pub use crate::config::AppConfig;
use crate::conversation::ConversationLog;
use crate::credentials::CredentialStore;
use crate::openai::{CompletionClient, GenerationParams, OpenAICompletionClient};
use crate::orchestrator::ChatOrchestrator;
use crate::quota::QuotaTracker;
use crate::stores::Stores;

pub struct AppState {
    pub jwt_keys: Arc<JWTKeys>,
    pub credentials: CredentialStore,
    pub quota: Arc<QuotaTracker>,
    pub conversations: Arc<ConversationLog>,
    pub orchestrator: ChatOrchestrator,
    pub admin: AdminView,
}

impl AppState {
    pub fn new(
        app_config: &AppConfig,
        stores: Stores,
        clock: Arc<dyn Clock>,
        completions: Arc<dyn CompletionClient>,
        hasher: Argon2<'static>,
    ) -> Self {
        let quota = Arc::new(QuotaTracker::new(stores.quotas.clone(), clock.clone()));
        let conversations = Arc::new(ConversationLog::new(
            stores.conversations.clone(),
            clock.clone(),
        ));

        AppState {
            jwt_keys: Arc::new(JWTKeys::new(app_config.jwt_secret.as_bytes())),
            credentials: CredentialStore::new(
                stores.clone(),
                quota.clone(),
                clock.clone(),
                hasher,
                app_config.admin_email.clone(),
            ),
            orchestrator: ChatOrchestrator::new(
                quota.clone(),
                conversations.clone(),
                completions,
                clock,
            ),
            admin: AdminView::new(stores.users, conversations.clone(), quota.clone()),
            quota,
            conversations,
        }
    }
}

#[shuttle_runtime::main]
async fn main(
    #[shuttle_runtime::Secrets] secret_store: SecretStore,
) -> ShuttleActixWeb<impl FnOnce(&mut web::ServiceConfig) + Send + Clone + 'static> {
    let app_config = AppConfig::new(&secret_store)?;

    let completions = Arc::new(OpenAICompletionClient::new(
        &app_config.groq_api_key,
        &app_config.groq_api_base,
        GenerationParams {
            model: app_config.groq_model.clone(),
            ..Default::default()
        },
    ));

    let app_state = web::Data::new(Arc::new(AppState::new(
        &app_config,
        Stores::in_memory(),
        Arc::new(SystemClock),
        completions,
        Argon2::default(),
    )));
    let jwt_keys = app_state.jwt_keys.clone();

    info!(
        "Starting Advey API with model {} (admin configured: {})",
        app_config.groq_model,
        app_config.admin_email.is_some()
    );

    let config = move |cfg: &mut web::ServiceConfig| {
        cfg.service(
            web::scope("")
                .wrap(Cors::permissive())
                .app_data(app_state.clone())
                .app_data(routes::json_config())
                .configure(|cfg| routes::configure(cfg, jwt_keys.clone())),
        );
    };

    Ok(config.into())
}
