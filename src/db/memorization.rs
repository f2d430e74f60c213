//! Memorization sessions and verse attempts

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use super::{parse_time, time_str};
use crate::domain::{MemorizationSession, NewVerseAttempt, SessionCompletion, VerseAttempt};
use crate::scoring::{CompareOptions, LetterGrade};

const SESSION_COLUMNS: &str = "id, user_id, chapter_id, started_at, completed_at, total_score, \
     grade, fold_arabic, ignore_case";

fn row_to_session(row: &Row) -> Result<MemorizationSession> {
    let started_at: String = row.get(3)?;
    let completed_at: Option<String> = row.get(4)?;
    let total_score: Option<f64> = row.get(5)?;
    let grade: Option<String> = row.get(6)?;

    let completion = match (completed_at, total_score, grade) {
        (Some(at), Some(total_score), Some(grade)) => {
            let grade = LetterGrade::from_str(&grade).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    6,
                    rusqlite::types::Type::Text,
                    format!("unknown grade {:?}", grade).into(),
                )
            })?;
            Some(SessionCompletion {
                completed_at: parse_time(4, &at)?,
                total_score,
                grade,
            })
        }
        _ => None,
    };

    Ok(MemorizationSession {
        id: row.get(0)?,
        user_id: row.get(1)?,
        chapter_id: row.get(2)?,
        started_at: parse_time(3, &started_at)?,
        completion,
        options: CompareOptions {
            fold_arabic: row.get(7)?,
            ignore_case: row.get(8)?,
        },
    })
}

fn row_to_attempt(row: &Row) -> Result<VerseAttempt> {
    let attempted_at: String = row.get(5)?;
    Ok(VerseAttempt {
        id: row.get(0)?,
        session_id: row.get(1)?,
        verse_id: row.get(2)?,
        user_input: row.get(3)?,
        similarity: row.get(4)?,
        attempted_at: parse_time(5, &attempted_at)?,
    })
}

/// Start a session scored with `options`, returns the session ID
pub fn insert_memorization_session(
    conn: &Connection,
    user_id: i64,
    chapter_id: i64,
    started_at: &DateTime<Utc>,
    options: &CompareOptions,
) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO memorization_sessions
            (user_id, chapter_id, started_at, fold_arabic, ignore_case)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            user_id,
            chapter_id,
            time_str(started_at),
            options.fold_arabic,
            options.ignore_case,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_memorization_session(
    conn: &Connection,
    session_id: i64,
) -> Result<Option<MemorizationSession>> {
    conn.query_row(
        &format!("SELECT {} FROM memorization_sessions WHERE id = ?1", SESSION_COLUMNS),
        params![session_id],
        row_to_session,
    )
    .optional()
}

/// Write the completion fields of a still-open session.
///
/// Returns false when the session was already completed (or does not exist).
pub fn complete_memorization_session(
    conn: &Connection,
    session_id: i64,
    completion: &SessionCompletion,
) -> Result<bool> {
    let updated = conn.execute(
        r#"
        UPDATE memorization_sessions
        SET completed_at = ?1, total_score = ?2, grade = ?3
        WHERE id = ?4 AND completed_at IS NULL
        "#,
        params![
            time_str(&completion.completed_at),
            completion.total_score,
            completion.grade.as_str(),
            session_id,
        ],
    )?;
    Ok(updated == 1)
}

/// Most recent completed sessions of a user for one chapter, newest first
pub fn get_recent_completed_sessions(
    conn: &Connection,
    user_id: i64,
    chapter_id: i64,
    limit: usize,
) -> Result<Vec<MemorizationSession>> {
    let mut stmt = conn.prepare(&format!(
        r#"
        SELECT {}
        FROM memorization_sessions
        WHERE user_id = ?1 AND chapter_id = ?2 AND completed_at IS NOT NULL
        ORDER BY completed_at DESC, id DESC
        LIMIT ?3
        "#,
        SESSION_COLUMNS
    ))?;

    let sessions = stmt
        .query_map(params![user_id, chapter_id, limit as i64], row_to_session)?
        .collect::<Result<Vec<_>>>()?;
    Ok(sessions)
}

pub fn insert_verse_attempt(conn: &Connection, attempt: &NewVerseAttempt) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO verse_attempts (session_id, verse_id, user_input, similarity, attempted_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            attempt.session_id,
            attempt.verse_id,
            attempt.user_input,
            attempt.similarity,
            time_str(&attempt.attempted_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert the last attempt of a session and complete it in one transaction.
///
/// Returns None, with nothing written, when the session is no longer open.
pub fn record_final_attempt(
    conn: &Connection,
    attempt: &NewVerseAttempt,
    completion: &SessionCompletion,
) -> Result<Option<i64>> {
    let tx = conn.unchecked_transaction()?;
    let attempt_id = insert_verse_attempt(&tx, attempt)?;
    if !complete_memorization_session(&tx, attempt.session_id, completion)? {
        return Ok(None);
    }
    tx.commit()?;
    Ok(Some(attempt_id))
}

/// Attempts of a session in verse order
pub fn get_session_attempts(conn: &Connection, session_id: i64) -> Result<Vec<VerseAttempt>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT va.id, va.session_id, va.verse_id, va.user_input, va.similarity, va.attempted_at
        FROM verse_attempts va
        JOIN verses v ON v.id = va.verse_id
        WHERE va.session_id = ?1
        ORDER BY v.number
        "#,
    )?;

    let attempts = stmt
        .query_map(params![session_id], row_to_attempt)?
        .collect::<Result<Vec<_>>>()?;
    Ok(attempts)
}
