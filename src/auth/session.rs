//! Cookie-based session handling.
//!
//! The session token travels in the `auth_token` cookie. Protected routes are
//! gated by [`require_auth`]; handlers that need the caller's identity take a
//! [`CurrentUser`] extractor, which re-validates the cookie.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use super::token::Claims;
use crate::api::error::ApiError;
use crate::AppState;

/// Name of the session cookie
pub const AUTH_COOKIE: &str = "auth_token";

/// Identity of the authenticated caller, decoded from the session token
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        }
    }
}

fn session_claims(jar: &CookieJar, state: &AppState) -> Result<Claims, ApiError> {
    let token = jar
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ApiError::unauthenticated("Authentication required"))?;

    // Do not leak whether the signature or the expiry failed
    state
        .tokens
        .validate(&token)
        .map_err(|_| ApiError::unauthenticated("Invalid or expired session"))
}

/// Middleware gating protected routes: rejects requests without a valid
/// session cookie before any handler runs
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    session_claims(&jar, &state)?;
    Ok(next.run(request).await)
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let claims = session_claims(&jar, state)?;
        Ok(CurrentUser::from(claims))
    }
}
