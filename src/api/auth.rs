//! Authentication endpoints: register, login, refresh, logout, profile.
//!
//! Login and refresh set the session cookie; logout clears it. Because
//! tokens are stateless, logout cannot revoke an issued token: it expires
//! on its own after the cookie is gone.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::session::{CurrentUser, AUTH_COOKIE};
use crate::auth::token::TOKEN_TTL_DAYS;
use crate::auth::{hash_password, validate_password_strength, verify_password};
use crate::db::{LoginRequest, LoginResponse, RegisterRequest, User, UserResponse};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_email, validate_name, validate_role};

/// Simple acknowledgement body
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Session cookie carrying a freshly issued token
fn auth_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::None)
        .path("/")
        .max_age(time::Duration::days(TOKEN_TTL_DAYS))
        .build()
}

/// Register a new user
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_email(&req.email) {
        errors.add("email", e);
    }
    if let Some(e) = validate_password_strength(&req.password) {
        errors.add("password", e);
    }
    if let Err(e) = validate_name(&req.name, "Name") {
        errors.add("name", e);
    }
    let role = req.role.clone().unwrap_or_else(|| "user".to_string());
    if let Err(e) = validate_role(&role) {
        errors.add("role", e);
    }
    errors.finish()?;

    let id = Uuid::new_v4().to_string();
    let password_hash = hash_password(&req.password)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO users (id, email, password_hash, name, role, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&req.email)
    .bind(&password_hash)
    .bind(&req.name)
    .bind(&role)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            ApiError::conflict("A user with this email already exists")
        } else {
            tracing::error!("Failed to create user: {}", e);
            ApiError::database("Failed to create user")
        }
    })?;

    tracing::info!("Registered user {}", req.email);

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id,
            email: req.email,
            name: req.name,
            role,
        }),
    ))
}

/// Validate credentials, issue a token and set the session cookie
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await?;

    // One message for both unknown email and wrong password
    let user = user.ok_or_else(|| ApiError::unauthenticated("Invalid credentials"))?;
    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::unauthenticated("Invalid credentials"));
    }

    let token = state
        .tokens
        .issue(&user)
        .map_err(|e| ApiError::internal(format!("Failed to issue session token: {}", e)))?;
    let jar = jar.add(auth_cookie(token, state.config.auth.cookie_secure));

    tracing::info!("User {} logged in", user.email);

    Ok((
        jar,
        Json(LoginResponse {
            message: "Login successful".to_string(),
            user: UserResponse::from(user),
        }),
    ))
}

/// Re-issue a token for the authenticated caller and reset the cookie.
/// Fails without issuing anything when the user no longer exists.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&current.id)
        .fetch_optional(&state.db)
        .await?;

    let user = user.ok_or_else(|| ApiError::not_found("User not found"))?;

    let token = state
        .tokens
        .issue(&user)
        .map_err(|e| ApiError::internal(format!("Failed to issue session token: {}", e)))?;
    let jar = jar.add(auth_cookie(token, state.config.auth.cookie_secure));

    Ok((
        jar,
        Json(MessageResponse {
            message: "Session refreshed".to_string(),
        }),
    ))
}

/// Clear the session cookie
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let mut cookie = Cookie::from(AUTH_COOKIE);
    cookie.set_path("/");
    let jar = jar.remove(cookie);

    (
        jar,
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}

/// Identity claims of the current session
pub async fn profile(current: CurrentUser) -> Json<UserResponse> {
    Json(UserResponse {
        id: current.id,
        email: current.email,
        name: current.name,
        role: current.role,
    })
}
