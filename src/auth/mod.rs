pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::PublicUser;

// Re-export necessary items
pub use extractors::CurrentUser;
pub use middleware::AccessGuard;
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims};

lazy_static! {
    // Display names must contain at least one non-whitespace character.
    static ref NAME_REGEX: regex::Regex = regex::Regex::new(r"\S").unwrap();
}

/// Payload for a user login request.
///
/// Only presence is checked here. Email format is deliberately not validated
/// at login: an address that cannot belong to any account takes the same
/// "Invalid credentials" path as a wrong password.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// User's email address.
    #[validate(length(min = 1))]
    pub email: String,
    /// User's password.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name for the new account.
    #[validate(
        length(min = 1, max = 100),
        regex(path = "NAME_REGEX", message = "Name must not be blank")
    )]
    pub name: String,
    /// Email address for the new account. Must be a valid email format.
    #[validate(email)]
    pub email: String,
    /// Password for the new account. Must be at least 8 characters long.
    #[validate(length(min = 8))]
    pub password: String,
}

/// Response structure after successful authentication (login or registration).
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    /// The JWT for session authentication.
    pub token: String,
    /// Public fields of the authenticated user; never includes the hash.
    pub user: PublicUser,
}
