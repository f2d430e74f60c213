//! Authentication extractors.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use super::db as auth_db;
use crate::config;
use crate::db::{try_lock, LogOnError};
use crate::state::AppState;

pub const SESSION_COOKIE_NAME: &str = "vm_session";

/// Authenticated request context.
/// Add this as a handler parameter to require authentication.
/// Redirects to /login if not authenticated.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| Redirect::to("/login").into_response())?;

        let session_id = jar
            .get(SESSION_COOKIE_NAME)
            .map(|c| c.value().to_string())
            .ok_or_else(|| Redirect::to("/login").into_response())?;

        let conn = try_lock(&state.db)
            .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response())?;

        // Clean up expired logins occasionally (~10% chance)
        if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
            if let Some(n) = auth_db::cleanup_expired_sessions(&conn)
                .log_warn("Failed to clean up expired login sessions")
            {
                if n > 0 {
                    tracing::debug!("Removed {} expired login sessions", n);
                }
            }
        }

        let (user_id, username) = auth_db::get_session_user(&conn, &session_id)
            .map_err(|e| {
                tracing::error!("Session lookup failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
            })?
            .ok_or_else(|| Redirect::to("/login").into_response())?;

        Ok(AuthContext { user_id, username })
    }
}

/// Optional authentication extractor.
/// Returns Some(AuthContext) if authenticated, None otherwise.
pub struct OptionalAuth(pub Option<AuthContext>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match AuthContext::from_request_parts(parts, state).await {
            Ok(auth) => Ok(OptionalAuth(Some(auth))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}
