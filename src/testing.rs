//! Test utilities for database setup.
//!
//! Reuses the real schema initialization so tests never carry their own copy
//! of the table definitions.

use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;

/// Test environment with a migrated database in a temporary directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    /// Connection with the full schema applied
    pub conn: Connection,
}

impl TestEnv {
    /// Create a database through `crate::db::open()` in a fresh temp dir.
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let conn = crate::db::open(&temp.path().join("verse_memo.db"))?;
        Ok(Self { temp, conn })
    }

    /// Insert a user with a placeholder credential, returns the user ID.
    pub fn create_user(&self, username: &str) -> i64 {
        crate::auth::db::create_user(&self.conn, username, "not-a-real-hash")
            .expect("insert test user")
    }

    /// Get the temporary directory path for creating test files.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }
}
