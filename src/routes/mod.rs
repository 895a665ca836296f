pub mod admin;
pub mod auth;
pub mod chat;

use std::sync::Arc;

use actix_web::{get, web, HttpRequest};
use serde_json::{json, Value};

use crate::auth::JWTKeys;
use crate::error::ApiError;
use crate::middleware::auth::{AuthenticatedUser, Authentication};
use crate::models::User;
use crate::AppState;

#[get("/health")]
async fn health() -> web::Json<Value> {
    web::Json(json!({ "status": "ok", "message": "Advey API is running" }))
}

/// Resolves the token's subject to a live user; deleted users are unauthorized.
pub async fn current_user(
    app_state: &AppState,
    authenticated_user: &AuthenticatedUser,
) -> Result<User, ApiError> {
    app_state
        .credentials
        .find_by_id(&authenticated_user.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Foydalanuvchi topilmadi / User not found"))
}

/// Malformed JSON bodies get the same error shape as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        ApiError::Validation(format!("Noto'g'ri so'rov / Invalid request: {}", err)).into()
    })
}

pub fn configure(cfg: &mut web::ServiceConfig, jwt_keys: Arc<JWTKeys>) {
    cfg.service(health)
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login),
        )
        .service(
            web::scope("/chat")
                .wrap(Authentication {
                    jwt_keys: jwt_keys.clone(),
                })
                .service(chat::chat)
                .service(chat::get_history)
                .service(chat::clear_history)
                .service(chat::get_stats),
        )
        .service(
            web::scope("/admin")
                .wrap(Authentication { jwt_keys })
                .service(admin::check)
                .service(admin::list_users)
                .service(admin::stats)
                .service(admin::user_history)
                .service(admin::delete_user),
        );
}
