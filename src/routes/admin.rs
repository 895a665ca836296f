use std::sync::Arc;

use actix_web::{delete, get, web};

use crate::admin::{AdminStats, UserHistory};
use crate::error::ApiError;
use crate::middleware::auth::AuthenticatedUser;
use crate::routes::current_user;
use crate::types::{AdminCheckResponse, MessageResponse, UsersResponse};
use crate::AppState;

#[get("/check")]
async fn check(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
) -> Result<web::Json<AdminCheckResponse>, ApiError> {
    let user = current_user(&app_state, &authenticated_user).await?;
    Ok(web::Json(AdminCheckResponse {
        is_admin: app_state.admin.is_admin(&user.id).await?,
    }))
}

#[get("/users")]
async fn list_users(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
) -> Result<web::Json<UsersResponse>, ApiError> {
    let user = current_user(&app_state, &authenticated_user).await?;
    app_state.admin.require_admin(&user.id).await?;
    let users = app_state.admin.list_users().await?;
    Ok(web::Json(UsersResponse { users }))
}

#[get("/stats")]
async fn stats(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
) -> Result<web::Json<AdminStats>, ApiError> {
    let user = current_user(&app_state, &authenticated_user).await?;
    app_state.admin.require_admin(&user.id).await?;
    Ok(web::Json(app_state.admin.stats().await?))
}

#[get("/users/{user_id}/history")]
async fn user_history(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
    user_id: web::Path<String>,
) -> Result<web::Json<UserHistory>, ApiError> {
    let user = current_user(&app_state, &authenticated_user).await?;
    app_state.admin.require_admin(&user.id).await?;
    Ok(web::Json(app_state.admin.user_history(&user_id).await?))
}

#[delete("/users/{user_id}")]
async fn delete_user(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
    user_id: web::Path<String>,
) -> Result<web::Json<MessageResponse>, ApiError> {
    let user = current_user(&app_state, &authenticated_user).await?;
    app_state.admin.require_admin(&user.id).await?;
    app_state.admin.delete_user(&user_id).await?;
    Ok(web::Json(MessageResponse::new(
        "Foydalanuvchi o'chirildi / User deleted successfully",
    )))
}
