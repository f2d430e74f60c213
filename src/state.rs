//! Application state shared by all handlers.

use crate::config::Settings;
use crate::db::DbPool;
use crate::memorize::{SessionAggregator, SqliteStore};
use rusqlite::Connection;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared database (users, login sessions, chapters, memorization sessions)
    pub db: DbPool,
    pub settings: Settings,
}

impl AppState {
    pub fn new(db: DbPool, settings: Settings) -> Self {
        Self { db, settings }
    }

    /// Request-scoped aggregator over a locked connection
    pub fn aggregator<'c>(&self, conn: &'c Connection) -> SessionAggregator<SqliteStore<'c>> {
        SessionAggregator::new(SqliteStore::new(conn), self.settings.scoring)
    }
}
