//! Authentication middleware for the control API.
//!
//! This module provides authentication handling for the Actix Web-based
//! control API, implementing bearer token authentication.

use crate::api::actix_error::ApiError;
use crate::config::ApiConfig;
use crate::error::Error;

use actix_web::{
    Error as ActixError,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures::future::{LocalBoxFuture, Ready, ready};
use std::sync::Arc;
use tracing;

/// Whether a request carries the expected bearer token.
///
/// Returns `true` when the config requires no authentication at all.
fn request_is_authorized(req: &ServiceRequest, config: &ApiConfig) -> bool {
    let Some(bearer) = config
        .authenticate
        .as_ref()
        .and_then(|auth| auth.bearer.as_ref())
    else {
        return true;
    };

    req.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| token == bearer.token)
}

/// Authentication middleware factory
pub struct Authentication {
    config: Arc<ApiConfig>,
}

impl Authentication {
    /// Create a new Authentication middleware
    pub fn new(config: Arc<ApiConfig>) -> Self {
        Self { config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Transform = AuthenticationMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticationMiddleware {
            service,
            config: self.config.clone(),
        }))
    }
}

/// Authentication middleware implementation
pub struct AuthenticationMiddleware<S> {
    service: S,
    config: Arc<ApiConfig>,
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Skip authentication for OPTIONS requests (CORS preflight)
        if req.method() == "OPTIONS" || request_is_authorized(&req, &self.config) {
            let fut = self.service.call(req);
            return Box::pin(async move {
                let res = fut.await?;
                Ok(res)
            });
        }

        tracing::warn!("Authentication failed: Invalid or missing bearer token");
        Box::pin(async move {
            // Convert to ApiError first, then into ActixError
            Err(ApiError::from(Error::Unauthorized(
                "Invalid or missing bearer token".to_string(),
            ))
            .into())
        })
    }
}
