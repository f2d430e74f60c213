//! Application configuration.
//!
//! Values come from `config.toml` first, then environment variables (a `.env`
//! file is loaded if present), then the defaults in `crate::paths`.

use serde::Deserialize;
use std::path::PathBuf;

use crate::paths;
use crate::scoring::CompareOptions;

// ==================== Config File ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct AppConfig {
    database: Option<DatabaseConfig>,
    content: Option<ContentConfig>,
    server: Option<ServerConfig>,
    #[serde(default)]
    scoring: CompareOptions,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentConfig {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServerConfig {
    port: Option<u16>,
}

/// Resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_path: PathBuf,
    /// Chapter file imported at startup
    pub content_path: PathBuf,
    pub port: u16,
    pub scoring: CompareOptions,
}

impl Settings {
    /// Load settings with priority: config.toml > env > default
    pub fn load() -> Self {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let file = match std::fs::read_to_string(CONFIG_FILE) {
            Ok(contents) => Some(contents),
            Err(_) => {
                tracing::debug!("No {} found, using environment and defaults", CONFIG_FILE);
                None
            }
        };

        Self::resolve(file.as_deref(), |key| std::env::var(key).ok())
    }

    /// Merge config file text and an environment lookup
    pub fn resolve(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Self {
        let config = match file.map(toml::from_str::<AppConfig>) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                tracing::warn!("Ignoring malformed {}: {}", CONFIG_FILE, e);
                AppConfig::default()
            }
            None => AppConfig::default(),
        };

        let database_path = config
            .database
            .and_then(|db| db.path)
            .or_else(|| env("DATABASE_PATH"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(paths::db_path()));

        let content_path = config
            .content
            .and_then(|c| c.path)
            .or_else(|| env("CONTENT_PATH"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(paths::DEFAULT_CONTENT_PATH));

        let port = config
            .server
            .and_then(|s| s.port)
            .or_else(|| env("PORT").and_then(|p| p.parse().ok()))
            .unwrap_or(SERVER_PORT);

        Self {
            database_path,
            content_path,
            port,
            scoring: config.scoring,
        }
    }

    /// Get the full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", SERVER_ADDR, self.port)
    }
}

pub const CONFIG_FILE: &str = "config.toml";

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Default server port
pub const SERVER_PORT: u16 = 3000;

// ==================== Login Sessions ====================

/// Login session duration in hours (1 week)
pub const SESSION_DURATION_HOURS: i64 = 24 * 7;

/// Probability threshold for expired login cleanup (0-255, lower = less frequent)
/// Value of 25 means ~10% chance (25/256) on each authenticated request
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;

// ==================== Reports ====================

/// Completed sessions listed in a report's history
pub const HISTORY_LIMIT: usize = 10;
