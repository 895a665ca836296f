use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::prompts::Language;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Bu email allaqachon ro'yxatdan o'tgan / Email already registered")]
    DuplicateEmail,

    #[error("Email yoki parol noto'g'ri / Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{}", quota_message(.0))]
    QuotaExceeded(Option<Language>),

    #[error("AI javob berishda xatolik / AI response error")]
    Upstream(#[source] anyhow::Error),

    #[error("Server xatosi / Server error")]
    Internal(#[from] anyhow::Error),
}

fn quota_message(language: &Option<Language>) -> &'static str {
    match language {
        Some(Language::Uz) => "Kunlik limit tugadi (20/20). Ertaga qayta urinib ko'ring.",
        _ => "Daily limit reached (20/20). Try again tomorrow.",
    }
}

impl ApiError {
    pub fn validation(message: &str) -> Self {
        ApiError::Validation(message.to_string())
    }

    pub fn forbidden(message: &str) -> Self {
        ApiError::Forbidden(message.to_string())
    }

    pub fn not_found(message: &str) -> Self {
        ApiError::NotFound(message.to_string())
    }

    pub fn unauthorized(message: &str) -> Self {
        ApiError::Unauthorized(message.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining: Option<u32>,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::DuplicateEmail
            | ApiError::InvalidCredentials => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Upstream(e) => error!("Upstream completion failed: {:?}", e),
            ApiError::Internal(e) => error!("Internal error: {:?}", e),
            _ => {}
        }

        let remaining = match self {
            ApiError::QuotaExceeded(_) => Some(0),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            message: self.to_string(),
            remaining,
        })
    }
}
