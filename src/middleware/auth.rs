use std::{
    future::{ready, Ready},
    sync::Arc,
};

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::auth::JWTKeys;
use crate::error::ApiError;

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

/// Why a request carries no [`AuthenticatedUser`].
#[derive(Clone, Copy, Debug)]
enum AuthRejection {
    MissingToken,
    InvalidToken,
}

impl From<AuthRejection> for ApiError {
    fn from(rejection: AuthRejection) -> Self {
        match rejection {
            AuthRejection::MissingToken => ApiError::unauthorized("Token topilmadi / Token not found"),
            AuthRejection::InvalidToken => ApiError::unauthorized("Token yaroqsiz / Invalid token"),
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let extensions = req.extensions();
        let result = match extensions.get::<AuthenticatedUser>() {
            Some(user) => Ok(user.clone()),
            None => Err(extensions
                .get::<AuthRejection>()
                .copied()
                .unwrap_or(AuthRejection::MissingToken)
                .into()),
        };
        ready(result)
    }
}

pub struct Authentication {
    pub jwt_keys: Arc<JWTKeys>,
}

// Middleware factory is `Transform` trait
// `S` - type of the next service
// `B` - type of response's body
impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticationMiddleware {
            service,
            jwt_keys: self.jwt_keys.clone(),
        }))
    }
}

pub struct AuthenticationMiddleware<S> {
    service: S,
    jwt_keys: Arc<JWTKeys>,
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Extract the bearer token, validate it, and record the outcome in the request extensions
        let auth_header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match auth_header {
            Some(token) => match self.jwt_keys.verify(token) {
                Ok(claims) => {
                    debug!("Authenticated user: {}", &claims.sub);
                    req.extensions_mut().insert(AuthenticatedUser {
                        user_id: claims.sub,
                    });
                }
                Err(e) => {
                    warn!("Invalid token on {}: {:?}", req.path(), e);
                    req.extensions_mut().insert(AuthRejection::InvalidToken);
                }
            },
            None => {
                debug!("No Authorization header found on {}", req.path());
                req.extensions_mut().insert(AuthRejection::MissingToken);
            }
        };

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            Ok(res)
        })
    }
}
