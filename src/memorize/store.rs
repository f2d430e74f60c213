//! Storage seam for the session aggregator.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode};
use thiserror::Error;

use crate::db;
use crate::domain::{
    Chapter, MemorizationSession, NewVerseAttempt, SessionCompletion, Verse, VerseAttempt,
};
use crate::scoring::CompareOptions;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness guard rejected the write
    #[error("conflicting write: {0}")]
    Conflict(String),
    #[error("session {0} is not open")]
    NotOpen(i64),
    #[error("stored row is inconsistent: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Sqlite(rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match e.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => StoreError::Conflict(e.to_string()),
            _ => StoreError::Sqlite(e),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything the aggregator reads and writes.
pub trait MemorizationStore {
    fn chapter(&self, chapter_id: i64) -> StoreResult<Option<Chapter>>;

    /// Verses ordered by number
    fn chapter_verses(&self, chapter_id: i64) -> StoreResult<Vec<Verse>>;

    fn create_session(
        &self,
        user_id: i64,
        chapter_id: i64,
        started_at: DateTime<Utc>,
        options: CompareOptions,
    ) -> StoreResult<MemorizationSession>;

    fn session(&self, session_id: i64) -> StoreResult<Option<MemorizationSession>>;

    /// Fails with `NotOpen` if the session is no longer open
    fn complete_session(&self, session_id: i64, completion: &SessionCompletion) -> StoreResult<()>;

    fn insert_attempt(&self, attempt: &NewVerseAttempt) -> StoreResult<VerseAttempt>;

    /// Record the last attempt of a session and complete it.
    ///
    /// The default runs the two writes one after the other; a failure between
    /// them leaves every verse recorded on an open session.
    fn insert_final_attempt(
        &self,
        attempt: &NewVerseAttempt,
        completion: &SessionCompletion,
    ) -> StoreResult<VerseAttempt> {
        let stored = self.insert_attempt(attempt)?;
        self.complete_session(attempt.session_id, completion)?;
        Ok(stored)
    }

    /// Attempts in verse order
    fn session_attempts(&self, session_id: i64) -> StoreResult<Vec<VerseAttempt>>;

    /// Newest completed sessions first
    fn recent_completed_sessions(
        &self,
        user_id: i64,
        chapter_id: i64,
        limit: usize,
    ) -> StoreResult<Vec<MemorizationSession>>;
}

/// SQLite-backed store over a connection borrowed for one request.
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl MemorizationStore for SqliteStore<'_> {
    fn chapter(&self, chapter_id: i64) -> StoreResult<Option<Chapter>> {
        Ok(db::get_chapter(self.conn, chapter_id)?)
    }

    fn chapter_verses(&self, chapter_id: i64) -> StoreResult<Vec<Verse>> {
        Ok(db::get_chapter_verses(self.conn, chapter_id)?)
    }

    fn create_session(
        &self,
        user_id: i64,
        chapter_id: i64,
        started_at: DateTime<Utc>,
        options: CompareOptions,
    ) -> StoreResult<MemorizationSession> {
        let id =
            db::insert_memorization_session(self.conn, user_id, chapter_id, &started_at, &options)?;
        Ok(MemorizationSession {
            id,
            user_id,
            chapter_id,
            started_at,
            completion: None,
            options,
        })
    }

    fn session(&self, session_id: i64) -> StoreResult<Option<MemorizationSession>> {
        Ok(db::get_memorization_session(self.conn, session_id)?)
    }

    fn complete_session(&self, session_id: i64, completion: &SessionCompletion) -> StoreResult<()> {
        if db::complete_memorization_session(self.conn, session_id, completion)? {
            Ok(())
        } else {
            Err(StoreError::NotOpen(session_id))
        }
    }

    fn insert_attempt(&self, attempt: &NewVerseAttempt) -> StoreResult<VerseAttempt> {
        let id = db::insert_verse_attempt(self.conn, attempt)?;
        Ok(stored_attempt(id, attempt))
    }

    /// Both writes share one transaction.
    fn insert_final_attempt(
        &self,
        attempt: &NewVerseAttempt,
        completion: &SessionCompletion,
    ) -> StoreResult<VerseAttempt> {
        match db::record_final_attempt(self.conn, attempt, completion)? {
            Some(id) => Ok(stored_attempt(id, attempt)),
            None => Err(StoreError::NotOpen(attempt.session_id)),
        }
    }

    fn session_attempts(&self, session_id: i64) -> StoreResult<Vec<VerseAttempt>> {
        Ok(db::get_session_attempts(self.conn, session_id)?)
    }

    fn recent_completed_sessions(
        &self,
        user_id: i64,
        chapter_id: i64,
        limit: usize,
    ) -> StoreResult<Vec<MemorizationSession>> {
        Ok(db::get_recent_completed_sessions(
            self.conn, user_id, chapter_id, limit,
        )?)
    }
}

fn stored_attempt(id: i64, attempt: &NewVerseAttempt) -> VerseAttempt {
    VerseAttempt {
        id,
        session_id: attempt.session_id,
        verse_id: attempt.verse_id,
        user_input: attempt.user_input.to_string(),
        similarity: attempt.similarity,
        attempted_at: attempt.attempted_at,
    }
}
