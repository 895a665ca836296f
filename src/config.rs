use anyhow::anyhow;
use shuttle_runtime::SecretStore;

use crate::openai::{DEFAULT_API_BASE, DEFAULT_MODEL};

#[derive(Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub groq_api_key: String,
    pub groq_api_base: String,
    pub groq_model: String,
    pub admin_email: Option<String>,
}

impl AppConfig {
    pub fn new(secret_store: &SecretStore) -> Result<Self, anyhow::Error> {
        let jwt_secret = secret_store
            .get("JWT_SECRET")
            .ok_or_else(|| anyhow!("JWT_SECRET not found"))?;

        let groq_api_key = secret_store
            .get("GROQ_API_KEY")
            .ok_or_else(|| anyhow!("GROQ_API_KEY not found"))?;

        let groq_api_base = secret_store
            .get("GROQ_API_BASE")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let groq_model = secret_store
            .get("GROQ_MODEL")
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        // Without an admin email nobody gets the admin role
        let admin_email = secret_store
            .get("ADMIN_EMAIL")
            .filter(|email| !email.trim().is_empty());

        Ok(AppConfig {
            jwt_secret,
            groq_api_key,
            groq_api_base,
            groq_model,
            admin_email,
        })
    }
}
