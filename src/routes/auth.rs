use std::sync::Arc;

use actix_web::{post, web, HttpResponse};
use anyhow::Context;
use tracing::info;

use crate::error::ApiError;
use crate::models::User;
use crate::types::{AuthResponse, LoginRequest, RegisterRequest};
use crate::AppState;

fn auth_response(app_state: &AppState, user: User) -> Result<AuthResponse, ApiError> {
    let token = app_state
        .jwt_keys
        .sign(&user.id)
        .context("Failed to sign JWT")?;
    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

#[post("/register")]
async fn register(
    app_state: web::Data<Arc<AppState>>,
    web::Json(req_body): web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Register attempt");
    let user = app_state
        .credentials
        .register(
            req_body.name.as_deref(),
            req_body.email.as_deref(),
            req_body.password.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Created().json(auth_response(&app_state, user)?))
}

#[post("/login")]
async fn login(
    app_state: web::Data<Arc<AppState>>,
    web::Json(req_body): web::Json<LoginRequest>,
) -> Result<web::Json<AuthResponse>, ApiError> {
    let user = app_state
        .credentials
        .authenticate(req_body.email.as_deref(), req_body.password.as_deref())
        .await?;

    Ok(web::Json(auth_response(&app_state, user)?))
}
