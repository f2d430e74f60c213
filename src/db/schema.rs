//! Schema for the application database.
//!
//! ## Migration System
//!
//! Version-gated: each migration checks the recorded version, runs its SQL
//! inside a transaction and records the new version in `db_version`. A new
//! database runs every migration once; an existing one only runs the ones it
//! is missing.

use rusqlite::{params, Connection, Result};

use super::now_str;

/// Current schema version
/// Increment this when adding a new migration
pub const DB_VERSION: i32 = 4;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Bootstrap: db_version must exist before the version can be read
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS db_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL,
            description TEXT
        );
        "#,
    )?;

    let current_version = get_schema_version(conn)?;
    tracing::debug!("schema version: {}", current_version);

    if current_version < 1 {
        migrate_v0_to_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v1_to_v2(conn)?;
    }
    if current_version < 3 {
        migrate_v2_to_v3(conn)?;
    }
    if current_version < 4 {
        migrate_v3_to_v4(conn)?;
    }

    Ok(())
}

// ============================================================
// VERSION-GATED MIGRATIONS
// ============================================================

/// v0→v1: users and login sessions
fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
    tracing::info!("Running migration v0→v1: Create auth tables");

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE COLLATE NOCASE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL,
            last_login_at TEXT
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            last_access_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
        CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
        "#,
    )?;
    record_version(&tx, 1, "Create auth tables (users, sessions)")?;
    tx.commit()
}

/// v1→v2: read-only poem content
fn migrate_v1_to_v2(conn: &Connection) -> Result<()> {
    tracing::info!("Running migration v1→v2: Create chapter tables");

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS chapters (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL UNIQUE,
            author TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS verses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            chapter_id INTEGER NOT NULL,
            number INTEGER NOT NULL,
            content TEXT NOT NULL,
            FOREIGN KEY (chapter_id) REFERENCES chapters(id) ON DELETE CASCADE,
            UNIQUE (chapter_id, number)
        );

        CREATE INDEX IF NOT EXISTS idx_verses_chapter_id ON verses(chapter_id);
        "#,
    )?;
    record_version(&tx, 2, "Create chapter tables (chapters, verses)")?;
    tx.commit()
}

/// v2→v3: memorization sessions and verse attempts
fn migrate_v2_to_v3(conn: &Connection) -> Result<()> {
    tracing::info!("Running migration v2→v3: Create memorization tables");

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS memorization_sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            chapter_id INTEGER NOT NULL,
            started_at TEXT NOT NULL,
            completed_at TEXT,
            total_score REAL,
            grade TEXT,
            FOREIGN KEY (user_id) REFERENCES users(id),
            FOREIGN KEY (chapter_id) REFERENCES chapters(id),
            CHECK ((completed_at IS NULL) = (total_score IS NULL)),
            CHECK ((completed_at IS NULL) = (grade IS NULL)),
            CHECK (total_score IS NULL OR (total_score >= 0 AND total_score <= 100))
        );

        CREATE TABLE IF NOT EXISTS verse_attempts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id INTEGER NOT NULL,
            verse_id INTEGER NOT NULL,
            user_input TEXT NOT NULL,
            similarity REAL NOT NULL CHECK (similarity >= 0 AND similarity <= 1),
            attempted_at TEXT NOT NULL,
            FOREIGN KEY (session_id) REFERENCES memorization_sessions(id),
            FOREIGN KEY (verse_id) REFERENCES verses(id),
            UNIQUE (session_id, verse_id)
        );

        CREATE INDEX IF NOT EXISTS idx_mem_sessions_user_chapter
            ON memorization_sessions(user_id, chapter_id, completed_at);
        CREATE INDEX IF NOT EXISTS idx_verse_attempts_session_id ON verse_attempts(session_id);
        "#,
    )?;
    record_version(&tx, 3, "Create memorization tables (memorization_sessions, verse_attempts)")?;
    tx.commit()
}

/// v3→v4: comparison options stored per session
///
/// Existing rows get the defaults the server used before the columns existed.
fn migrate_v3_to_v4(conn: &Connection) -> Result<()> {
    tracing::info!("Running migration v3→v4: Store comparison options per session");

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        r#"
        ALTER TABLE memorization_sessions
            ADD COLUMN fold_arabic INTEGER NOT NULL DEFAULT 1;
        ALTER TABLE memorization_sessions
            ADD COLUMN ignore_case INTEGER NOT NULL DEFAULT 0;
        "#,
    )?;
    record_version(&tx, 4, "Add comparison options to memorization_sessions")?;
    tx.commit()
}

// ============================================================
// MIGRATION HELPERS
// ============================================================

/// Record a schema version after successful migration
fn record_version(conn: &Connection, version: i32, description: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO db_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        params![version, now_str(), description],
    )?;
    tracing::info!("Recorded schema version {} - {}", version, description);
    Ok(())
}

/// Get current schema version (0 if no versions recorded)
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM db_version",
        [],
        |row| row.get(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_reach_latest_version() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), DB_VERSION);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM db_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, DB_VERSION as i64);
    }

    #[test]
    fn test_completion_columns_must_agree() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        seed_session_owner(&conn);

        // completed_at without a score is rejected
        let result = conn.execute(
            r#"
            INSERT INTO memorization_sessions (user_id, chapter_id, started_at, completed_at)
            VALUES (1, 1, 'a', 'b')
            "#,
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_v3_sessions_get_default_options() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE db_version (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL,
                description TEXT
            );
            "#,
        )
        .unwrap();
        migrate_v0_to_v1(&conn).unwrap();
        migrate_v1_to_v2(&conn).unwrap();
        migrate_v2_to_v3(&conn).unwrap();
        seed_session_owner(&conn);
        conn.execute(
            "INSERT INTO memorization_sessions (user_id, chapter_id, started_at) VALUES (1, 1, 'a')",
            [],
        )
        .unwrap();

        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 4);

        let (fold_arabic, ignore_case): (bool, bool) = conn
            .query_row(
                "SELECT fold_arabic, ignore_case FROM memorization_sessions WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert!(fold_arabic);
        assert!(!ignore_case);
    }

    fn seed_session_owner(conn: &Connection) {
        conn.execute_batch(
            r#"
            INSERT INTO users (username, password_hash, created_at) VALUES ('reader', 'x', 'now');
            INSERT INTO chapters (title, created_at) VALUES ('Ozymandias', 'now');
            "#,
        )
        .unwrap();
    }
}
