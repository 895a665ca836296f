use std::sync::Arc;

use actix_web::{delete, get, post, web};
use tracing::info;

use crate::error::ApiError;
use crate::middleware::auth::AuthenticatedUser;
use crate::orchestrator::ChatOutcome;
use crate::prompts::Language;
use crate::routes::current_user;
use crate::types::{ChatRequest, HistoryResponse, MessageResponse, StatsResponse};
use crate::AppState;

#[post("")]
async fn chat(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
    web::Json(req_body): web::Json<ChatRequest>,
) -> Result<web::Json<ChatOutcome>, ApiError> {
    let user = current_user(&app_state, &authenticated_user).await?;
    let language = Language::parse(req_body.language.as_deref());

    // Whitespace-only counts as empty, but the text is kept as sent.
    let message = req_body
        .message
        .as_deref()
        .filter(|message| !message.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Xabar bo'sh / Message is empty"))?;

    info!("User {} sent a chat message", user.id);
    let outcome = app_state
        .orchestrator
        .handle_chat(&user.id, message, language)
        .await?;

    Ok(web::Json(outcome))
}

#[get("/history")]
async fn get_history(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
) -> Result<web::Json<HistoryResponse>, ApiError> {
    let user = current_user(&app_state, &authenticated_user).await?;
    let history = app_state.conversations.full_history(&user.id).await?;
    Ok(web::Json(HistoryResponse { history }))
}

#[delete("/history")]
async fn clear_history(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
) -> Result<web::Json<MessageResponse>, ApiError> {
    let user = current_user(&app_state, &authenticated_user).await?;
    app_state.conversations.clear(&user.id).await?;
    info!("User {} cleared their history", user.id);
    Ok(web::Json(MessageResponse::new(
        "Tarix tozalandi / History cleared",
    )))
}

#[get("/stats")]
async fn get_stats(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
) -> Result<web::Json<StatsResponse>, ApiError> {
    let user = current_user(&app_state, &authenticated_user).await?;
    Ok(web::Json(StatsResponse {
        remaining_questions: app_state.quota.remaining(&user.id).await?,
        total_questions: app_state.conversations.exchange_count(&user.id).await?,
    }))
}
