use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Tokens expire one week after issue.
pub const TOKEN_TTL_SECS: usize = 3600 * 24 * 7;

#[derive(Clone)]
pub struct JWTKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

impl JWTKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn sign(&self, user_id: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            exp: now + TOKEN_TTL_SECS,
            iat: now,
        };

        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|token_data| token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_token_verifies_with_same_secret_only() {
        let keys = JWTKeys::new(b"secret");
        let token = keys.sign("user-1").unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);

        assert!(JWTKeys::new(b"other").verify(&token).is_err());
        assert!(keys.verify("not-a-token").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = JWTKeys::new(b"secret");
        let issued = Utc::now().timestamp() as usize - TOKEN_TTL_SECS - 3600;
        let claims = Claims {
            sub: "user-1".to_string(),
            exp: issued + TOKEN_TTL_SECS,
            iat: issued,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();

        assert!(keys.verify(&token).is_err());
    }
}
