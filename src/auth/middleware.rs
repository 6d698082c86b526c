use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ResponseError,
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;
use std::rc::Rc;

use crate::auth::extractors::CurrentUser;
use crate::auth::token::verify_token;
use crate::config::Config;
use crate::error::AppError;

/// Request-level access guard for the `/api` scope.
///
/// This is the single chokepoint for protected operations: it extracts the
/// bearer token, verifies it against the configured signing secret, resolves
/// the encoded user id to a live user record, and attaches the resulting
/// [`CurrentUser`] to request extensions. A missing or malformed header, a
/// bad or expired token, or a vanished user all fail with 401 before any
/// handler runs.
///
/// Rejections are rendered into a response right here, carrying the same
/// `{success, message}` envelope as every other error.
pub struct AccessGuard;

impl<S, B> Transform<S, ServiceRequest> for AccessGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AccessGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessGuardService {
            service: Rc::new(service),
        }))
    }
}

pub struct AccessGuardService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AccessGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            // Registration and login are the only unguarded endpoints in the scope.
            let path = req.path();
            if path == "/api/user/register" || path == "/api/user/login" {
                return service
                    .call(req)
                    .await
                    .map(ServiceResponse::map_into_left_body);
            }

            match resolve_identity(&req).await {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(err) => {
                    let response = err.error_response().map_into_right_body();
                    Ok(req.into_response(response))
                }
            }
        })
    }
}

/// Token to identity: verify the bearer token, then resolve its subject to a
/// live user record.
async fn resolve_identity(req: &ServiceRequest) -> Result<CurrentUser, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Not authorized, token missing".to_string()))?;

    let config = req
        .app_data::<web::Data<Config>>()
        .ok_or_else(|| AppError::Internal("Config not registered".to_string()))?;
    let claims = verify_token(token, &config.jwt_secret)?;

    let pool = req
        .app_data::<web::Data<PgPool>>()
        .ok_or_else(|| AppError::Internal("Database pool not registered".to_string()))?;

    sqlx::query_as::<_, CurrentUser>("SELECT id, name, email FROM users WHERE id = $1")
        .bind(claims.sub)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))
}
