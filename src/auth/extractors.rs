use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use serde::Serialize;
use sqlx::FromRow;
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;

/// The identity resolved by `AccessGuard` for the current request.
///
/// The guard verifies the bearer token, loads the subject's live user record
/// and inserts this struct into request extensions; handlers obtain it through
/// this extractor. The password hash is deliberately not part of the identity.
///
/// If the identity is missing from the extensions (the guard did not run, or
/// failed to insert it), extraction fails with `AppError::Unauthorized`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl FromRequest for CurrentUser {
    type Error = ActixError; // AppError converts into ActixError via ResponseError
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<CurrentUser>().cloned() {
            Some(user) => ready(Ok(user)),
            None => {
                let err = AppError::Unauthorized(
                    "Identity not found in request. Ensure AccessGuard is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
