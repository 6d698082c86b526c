//!
//! # Custom Error Handling
//!
//! Defines `AppError`, the single error type used throughout the application,
//! and its mapping onto HTTP responses. Every error body carries the same
//! envelope: `{"success": false, "message": "..."}`.
//!
//! Two rules are enforced here rather than in individual handlers:
//!
//! - a `NotFound` produced by an ownership miss is byte-identical to one
//!   produced by a genuinely absent record, so existence of another user's
//!   resource never leaks;
//! - database and other unexpected failures are surfaced with a constant
//!   "Something went wrong" message, and the detail goes to the log only.

use actix_web::error::{JsonPayloadError, PathError, ResponseError};
use actix_web::{HttpRequest, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// All error conditions the API can surface.
#[derive(Debug)]
pub enum AppError {
    /// Bad or missing credentials, or a bad/expired token (HTTP 401).
    Unauthorized(String),
    /// Malformed or missing input (HTTP 400).
    Validation(String),
    /// Unique-constraint violation, e.g. a duplicate email (HTTP 409).
    Conflict(String),
    /// Resource absent, or present but not owned by the caller (HTTP 404).
    NotFound(String),
    /// Database failure (HTTP 500). The message is logged, never sent.
    Database(String),
    /// Any other unexpected server-side failure (HTTP 500). Logged, not sent.
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Database(msg) => write!(f, "Database Error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(json!({
                "success": false,
                "message": msg
            })),
            AppError::Validation(msg) => HttpResponse::BadRequest().json(json!({
                "success": false,
                "message": msg
            })),
            AppError::Conflict(msg) => HttpResponse::Conflict().json(json!({
                "success": false,
                "message": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "success": false,
                "message": msg
            })),
            AppError::Database(msg) | AppError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "success": false,
                    "message": "Something went wrong"
                }))
            }
        }
    }
}

/// Error handler for `web::JsonConfig`: a body that fails to deserialize
/// (wrong type, unknown enum variant, malformed JSON) is a validation failure
/// and must carry the standard envelope, not the framework's plain-text 400.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(err.to_string()).into()
}

/// Error handler for `web::PathConfig`: an unparseable path segment (e.g. a
/// task id that is not a UUID) gets the same treatment.
pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(err.to_string()).into()
}

/// Maps `sqlx::Error` onto the taxonomy.
///
/// `RowNotFound` becomes `NotFound`; a unique-constraint violation
/// (Postgres SQLSTATE 23505) becomes `Conflict`; everything else is a
/// `Database` error.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                AppError::Conflict("Record already exists".into())
            }
            _ => AppError::Database(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(format!("Invalid token: {}", error))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(error.to_string())
    }
}
