use crate::{
    auth::{
        generate_token, hash_password, verify_password, AuthResponse, CurrentUser, LoginRequest,
        RegisterRequest,
    },
    config::Config,
    error::AppError,
    models::user::{ChangePasswordRequest, PublicUser, UpdateProfileRequest, UserCredentials},
};
use actix_web::{get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Register a new user
///
/// Creates the account, issues a token and returns both. The email is
/// lowercased before any lookup so uniqueness holds regardless of case.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    payload: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let mut data = payload.into_inner();
    data.email = data.email.trim().to_lowercase();
    data.validate()?;

    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
        .bind(&data.email)
        .fetch_optional(&**pool)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&data.password)?;

    // The unique constraint on email still backs this up; a racing duplicate
    // insert surfaces as 409 through the sqlx error mapping.
    let user = sqlx::query_as::<_, PublicUser>(
        "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4)
         RETURNING id, name, email",
    )
    .bind(Uuid::new_v4())
    .bind(&data.name)
    .bind(&data.email)
    .bind(&password_hash)
    .fetch_one(&**pool)
    .await?;

    let token = generate_token(user.id, &config.jwt_secret)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        success: true,
        token,
        user,
    }))
}

/// Login user
///
/// The failure message is identical for an unknown email and a wrong
/// password, so the response never reveals which one it was.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    payload: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let mut data = payload.into_inner();
    data.email = data.email.trim().to_lowercase();
    data.validate()?;

    let user = sqlx::query_as::<_, UserCredentials>(
        "SELECT id, name, email, password_hash FROM users WHERE email = $1",
    )
    .bind(&data.email)
    .fetch_optional(&**pool)
    .await?;

    let user = match user {
        Some(user) => {
            if !verify_password(&data.password, &user.password_hash)? {
                return Err(AppError::Unauthorized("Invalid credentials".into()));
            }
            user
        }
        None => return Err(AppError::Unauthorized("Invalid credentials".into())),
    };

    let token = generate_token(user.id, &config.jwt_secret)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        success: true,
        token,
        user: PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
        },
    }))
}

/// Current user
///
/// Returns the identity the access guard resolved for this request.
#[get("/me")]
pub async fn me(user: CurrentUser) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "user": user
    }))
}

/// Update profile (name and email)
///
/// Rejects an email already used by a different account with 409.
#[put("/profile")]
pub async fn update_profile(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    payload: web::Json<UpdateProfileRequest>,
) -> Result<impl Responder, AppError> {
    let mut data = payload.into_inner();
    data.email = data.email.trim().to_lowercase();
    data.validate()?;

    let taken = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1 AND id <> $2")
        .bind(&data.email)
        .bind(user.id)
        .fetch_optional(&**pool)
        .await?;

    if taken.is_some() {
        return Err(AppError::Conflict("Email already in use".into()));
    }

    let updated = sqlx::query_as::<_, PublicUser>(
        "UPDATE users SET name = $2, email = $3 WHERE id = $1 RETURNING id, name, email",
    )
    .bind(user.id)
    .bind(&data.name)
    .bind(&data.email)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "user": updated
    })))
}

/// Change password
///
/// Verifies the current password, re-hashes and persists the new one.
/// Previously issued tokens stay valid for their remaining lifetime.
#[put("/password")]
pub async fn change_password(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    payload: web::Json<ChangePasswordRequest>,
) -> Result<impl Responder, AppError> {
    let data = payload.into_inner();
    data.validate()?;

    let stored_hash =
        sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
            .bind(user.id)
            .fetch_optional(&**pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if !verify_password(&data.current_password, &stored_hash)? {
        return Err(AppError::Unauthorized("Current password is incorrect".into()));
    }

    let new_hash = hash_password(&data.new_password)?;

    sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(user.id)
        .bind(&new_hash)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Password changed successfully"
    })))
}
