//! Authentication handlers for login, register, and logout.

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;

use super::db as auth_db;
use super::middleware::{OptionalAuth, SESSION_COOKIE_NAME};
use super::password;
use crate::config::SESSION_DURATION_HOURS;
use crate::db::try_lock;
use crate::filters;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub version: &'static str,
}

#[derive(Template)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
}

fn login_error(jar: CookieJar, message: &str) -> Response {
    let template = LoginTemplate {
        error: Some(message.to_string()),
        version: env!("CARGO_PKG_VERSION"),
    };
    (jar, Html(template.render().unwrap_or_default())).into_response()
}

fn register_error(jar: CookieJar, message: &str) -> Response {
    let template = RegisterTemplate {
        error: Some(message.to_string()),
    };
    (jar, Html(template.render().unwrap_or_default())).into_response()
}

/// Create a login session and attach its cookie
fn start_login(state: &AppState, jar: CookieJar, user_id: i64) -> Result<CookieJar, &'static str> {
    let conn = try_lock(&state.db).map_err(|_| "Database error")?;

    // Update last login time (log but don't fail on error)
    if let Err(e) = auth_db::update_last_login(&conn, user_id) {
        tracing::warn!("Failed to update last login for user {}: {}", user_id, e);
    }

    let session_id = auth_db::generate_session_id();
    auth_db::create_session(&conn, user_id, &session_id, SESSION_DURATION_HOURS).map_err(|e| {
        tracing::error!("Failed to create login session for user {}: {}", user_id, e);
        "Failed to create session"
    })?;

    let session_cookie = Cookie::build((SESSION_COOKIE_NAME, session_id))
        .path("/")
        .http_only(true)
        .secure(false) // Set to true in production with HTTPS
        .max_age(time::Duration::hours(SESSION_DURATION_HOURS))
        .build();

    Ok(jar.add(session_cookie))
}

/// GET /login - Show login page, or go home if already logged in
pub async fn login_page(OptionalAuth(auth): OptionalAuth) -> Response {
    if auth.is_some() {
        return Redirect::to("/").into_response();
    }
    let template = LoginTemplate {
        error: None,
        version: env!("CARGO_PKG_VERSION"),
    };
    Html(template.render().unwrap_or_default()).into_response()
}

/// POST /login - Process login
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    if form.username.is_empty() || form.password.is_empty() {
        return login_error(jar, "Username and password are required");
    }

    let user = match try_lock(&state.db) {
        Ok(conn) => auth_db::get_user_by_username(&conn, &form.username),
        Err(_) => return login_error(jar, "Database error"),
    };

    let (user_id, password_hash) = match user {
        Ok(Some(user)) => user,
        Ok(None) => return login_error(jar, "Invalid username or password"),
        Err(e) => {
            tracing::error!("User lookup failed: {}", e);
            return login_error(jar, "Database error");
        }
    };

    // Argon2 verification runs without holding the database lock
    if !password::verify_password(&form.password, &password_hash) {
        tracing::info!("Failed login for {}", form.username);
        return login_error(jar, "Invalid username or password");
    }

    match start_login(&state, jar.clone(), user_id) {
        Ok(jar) => {
            tracing::info!("User {} logged in", form.username);
            (jar, Redirect::to("/")).into_response()
        }
        Err(message) => login_error(jar, message),
    }
}

/// GET /register - Show registration page
pub async fn register_page(OptionalAuth(auth): OptionalAuth) -> Response {
    if auth.is_some() {
        return Redirect::to("/").into_response();
    }
    let template = RegisterTemplate { error: None };
    Html(template.render().unwrap_or_default()).into_response()
}

/// POST /register - Create the account and log in
pub async fn register_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    if !is_valid_username(&form.username) {
        return register_error(jar, "Username must be 3-32 alphanumeric characters or underscores");
    }
    if form.password.is_empty() {
        return register_error(jar, "Password is required");
    }

    let password_hash = match password::hash_password(&form.password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("Password hashing failed: {}", e);
            return register_error(jar, "Failed to process password");
        }
    };

    let user_id = {
        let conn = match try_lock(&state.db) {
            Ok(conn) => conn,
            Err(_) => return register_error(jar, "Database error"),
        };

        match auth_db::username_exists(&conn, &form.username) {
            Ok(true) => return register_error(jar, "Username already exists"),
            Err(e) => {
                tracing::error!("Username check failed: {}", e);
                return register_error(jar, "Database error");
            }
            Ok(false) => {}
        }

        match auth_db::create_user(&conn, &form.username, &password_hash) {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("Failed to create user {}: {}", form.username, e);
                return register_error(jar, "Failed to create account");
            }
        }
    };

    tracing::info!("Registered user {}", form.username);

    match start_login(&state, jar.clone(), user_id) {
        Ok(jar) => (jar, Redirect::to("/")).into_response(),
        Err(message) => register_error(jar, message),
    }
}

/// POST /logout - Log out and clear session
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE_NAME) {
        if let Ok(conn) = try_lock(&state.db) {
            if let Err(e) = auth_db::delete_session(&conn, session_cookie.value()) {
                tracing::warn!("Failed to delete session during logout: {}", e);
            }
        }
    }

    let session_cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .max_age(time::Duration::seconds(0))
        .build();

    (jar.remove(session_cookie), Redirect::to("/login"))
}

fn is_valid_username(username: &str) -> bool {
    username.len() >= 3
        && username.len() <= 32
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(is_valid_username("abc"));
        assert!(is_valid_username("user123"));
        assert!(is_valid_username("my_user"));
        assert!(is_valid_username("a".repeat(32).as_str()));
    }

    #[test]
    fn test_invalid_usernames() {
        assert!(!is_valid_username("ab")); // too short
        assert!(!is_valid_username(&"a".repeat(33))); // too long
        assert!(!is_valid_username("user name")); // space
        assert!(!is_valid_username("user-name")); // hyphen
        assert!(!is_valid_username("")); // empty
        assert!(!is_valid_username("حافظ")); // non-ASCII
    }
}
