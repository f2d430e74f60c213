pub mod chapters;
pub mod memorization;
pub mod schema;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

// Re-export all public items from submodules
pub use chapters::*;
pub use memorization::*;
pub use schema::run_migrations;

pub type DbPool = Arc<Mutex<Connection>>;

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
    /// Log the error at warn level and return None
    fn log_warn(self, context: &str) -> Option<T>;
    /// Log the error at warn level and return the default
    fn log_warn_default(self, context: &str) -> T
    where
        T: Default;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
    fn log_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                None
            }
        }
    }

    fn log_warn_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                T::default()
            }
        }
    }
}

/// Error returned when database lock cannot be acquired
#[derive(Debug, Error)]
#[error("Database unavailable")]
pub struct DbLockError;

/// Try to acquire the database lock, returning an error if poisoned
pub fn try_lock(pool: &DbPool) -> std::result::Result<MutexGuard<'_, Connection>, DbLockError> {
    pool.lock().map_err(|_: PoisonError<_>| {
        tracing::error!("Database mutex poisoned - a thread panicked while holding the lock");
        DbLockError
    })
}

/// Open (or create) the database file and bring its schema up to date
pub fn init_db(path: &Path) -> Result<DbPool> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    // Create backup before migrations if database exists
    if path.exists() {
        let backup_path = path.with_extension("db.backup");
        if let Err(e) = std::fs::copy(path, &backup_path) {
            tracing::warn!("Could not create database backup: {}", e);
        }
    }

    let conn = open(path)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Open a connection with foreign keys enforced and migrations applied
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Timestamp format stored in every TEXT time column.
///
/// Fixed precision keeps lexical order equal to chronological order.
pub fn time_str(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn now_str() -> String {
    time_str(&Utc::now())
}

/// Parse a stored timestamp inside a row mapper
pub(crate) fn parse_time(column: usize, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_time_str_round_trip() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let s = time_str(&dt);
        assert_eq!(s, "2024-03-01T12:30:00.000000Z");
        assert_eq!(parse_time(0, &s).unwrap(), dt);
    }

    #[test]
    fn test_time_str_sorts_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let later = earlier + chrono::Duration::milliseconds(1500);
        assert!(time_str(&earlier) < time_str(&later));
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert!(parse_time(3, "yesterday").is_err());
    }

    #[test]
    fn test_log_warn_default() {
        let failed: std::result::Result<i64, DbLockError> = Err(DbLockError);
        assert_eq!(failed.log_warn_default("lock"), 0);
        let ok: std::result::Result<i64, DbLockError> = Ok(7);
        assert_eq!(ok.log_warn("lock"), Some(7));
    }

    #[test]
    fn test_poisoned_lock_reports_unavailable() {
        let pool: DbPool = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
        let poisoner = pool.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        let err = try_lock(&pool).unwrap_err();
        assert_eq!(err.to_string(), "Database unavailable");
    }
}
