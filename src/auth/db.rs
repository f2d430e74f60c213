//! User and login-session queries.
//!
//! The tables themselves are created by `crate::db::schema`.

use chrono::{Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::db::{now_str, time_str};

/// Create a new user, returns the user ID
pub fn create_user(conn: &Connection, username: &str, password_hash: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
        params![username, password_hash, now_str()],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get user by username, returns (user_id, password_hash)
pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<Option<(i64, String)>> {
    conn.query_row(
        "SELECT id, password_hash FROM users WHERE username = ?1",
        params![username],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

/// Check if a username already exists (case-insensitive)
pub fn username_exists(conn: &Connection, username: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE username = ?1",
        params![username],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Update user's last login timestamp
pub fn update_last_login(conn: &Connection, user_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE users SET last_login_at = ?1 WHERE id = ?2",
        params![now_str(), user_id],
    )?;
    Ok(())
}

/// Create a new login session
pub fn create_session(
    conn: &Connection,
    user_id: i64,
    session_id: &str,
    duration_hours: i64,
) -> Result<()> {
    let now = Utc::now();
    let expires = now + Duration::hours(duration_hours);
    conn.execute(
        "INSERT INTO sessions (id, user_id, created_at, expires_at, last_access_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![session_id, user_id, time_str(&now), time_str(&expires), time_str(&now)],
    )?;
    Ok(())
}

/// Validate a login session and get user info, returns (user_id, username)
pub fn get_session_user(conn: &Connection, session_id: &str) -> Result<Option<(i64, String)>> {
    let now = now_str();
    let user = conn
        .query_row(
            r#"
            SELECT u.id, u.username
            FROM sessions s
            JOIN users u ON s.user_id = u.id
            WHERE s.id = ?1 AND s.expires_at > ?2
            "#,
            params![session_id, now],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    if user.is_some() {
        if let Err(e) = conn.execute(
            "UPDATE sessions SET last_access_at = ?1 WHERE id = ?2",
            params![now, session_id],
        ) {
            tracing::warn!("Failed to refresh session access time: {}", e);
        }
    }
    Ok(user)
}

/// Delete a login session (logout)
pub fn delete_session(conn: &Connection, session_id: &str) -> Result<()> {
    conn.execute("DELETE FROM sessions WHERE id = ?1", params![session_id])?;
    Ok(())
}

/// Cleanup expired login sessions, returns count of deleted sessions
pub fn cleanup_expired_sessions(conn: &Connection) -> Result<usize> {
    conn.execute("DELETE FROM sessions WHERE expires_at < ?1", params![now_str()])
}

/// Random 32-character session token
pub fn generate_session_id() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    (0..32)
        .map(|_| {
            let idx = rng.random_range(0..36u8);
            if idx < 10 {
                (b'0' + idx) as char
            } else {
                (b'a' + idx - 10) as char
            }
        })
        .collect()
}
