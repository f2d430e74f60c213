//! Session state machine: open until the final verse is recorded, then
//! completed with a mean score and a letter grade.

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use super::report::{SessionReport, VerseReport};
use super::store::{MemorizationStore, StoreError};
use crate::config;
use crate::domain::{Chapter, MemorizationSession, NewVerseAttempt, SessionCompletion, Verse};
use crate::scoring::{self, compare, CompareOptions, DiffToken, GradeError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("chapter {0} not found")]
    ChapterNotFound(i64),
    #[error("chapter {0} has no verses")]
    EmptyChapter(i64),
    #[error("session {0} not found")]
    SessionNotFound(i64),
    #[error("session {0} is already completed")]
    AlreadyCompleted(i64),
    #[error("session {0} is not completed yet")]
    NotCompleted(i64),
    /// Indices are 0-based, the message counts from 1
    #[error("expected verse {}, got verse {}", .expected + 1, .got + 1)]
    OutOfOrder { expected: usize, got: usize },
    #[error("verse {} is beyond the chapter's {} verses", .index + 1, .verse_count)]
    VerseOutOfRange { index: usize, verse_count: usize },
    #[error(transparent)]
    Grade(#[from] GradeError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// What the user should type next.
#[derive(Debug, Clone, Serialize)]
pub enum SessionProgress {
    Next(VersePrompt),
    Completed,
}

#[derive(Debug, Clone, Serialize)]
pub struct VersePrompt {
    pub chapter: Chapter,
    pub session_id: i64,
    /// 0-based position of `verse` in the chapter
    pub index: usize,
    pub verse: Verse,
    /// Shown above the prompt as a cue
    pub previous: Option<Verse>,
    pub verse_count: usize,
}

/// Immediate feedback for one submitted verse.
#[derive(Debug, Clone, Serialize)]
pub struct VerseFeedback {
    pub session_id: i64,
    pub verse_index: usize,
    pub verse_count: usize,
    pub verse: Verse,
    pub similarity: f64,
    pub percent: f64,
    pub diff: Vec<DiffToken>,
    /// Set when this verse finished the session
    pub completion: Option<SessionCompletion>,
}

/// Mean similarity as a 0-100 score with one decimal place.
pub fn session_score(similarities: &[f64]) -> f64 {
    if similarities.is_empty() {
        return 0.0;
    }
    let mean = similarities.iter().sum::<f64>() / similarities.len() as f64;
    scoring::to_percent(mean)
}

pub struct SessionAggregator<S> {
    store: S,
    options: CompareOptions,
    history_limit: usize,
}

impl<S: MemorizationStore> SessionAggregator<S> {
    pub fn new(store: S, options: CompareOptions) -> Self {
        Self {
            store,
            options,
            history_limit: config::HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Open a new session for a chapter, scored with the current options for
    /// its whole life.
    pub fn start(&self, user_id: i64, chapter_id: i64) -> SessionResult<MemorizationSession> {
        self.store
            .chapter(chapter_id)?
            .ok_or(SessionError::ChapterNotFound(chapter_id))?;
        if self.store.chapter_verses(chapter_id)?.is_empty() {
            return Err(SessionError::EmptyChapter(chapter_id));
        }

        let session = self.store.create_session(user_id, chapter_id, Utc::now(), self.options)?;
        tracing::info!(
            "Started session {} for user {} on chapter {}",
            session.id,
            user_id,
            chapter_id
        );
        Ok(session)
    }

    /// The next verse to type, or `Completed`.
    pub fn progress(&self, user_id: i64, session_id: i64) -> SessionResult<SessionProgress> {
        let session = self.owned_session(user_id, session_id)?;
        if session.is_completed() {
            return Ok(SessionProgress::Completed);
        }

        let chapter = self.chapter_of(&session)?;
        let mut verses = self.store.chapter_verses(session.chapter_id)?;
        let index = self.store.session_attempts(session_id)?.len();
        let verse_count = verses.len();

        if index >= verse_count {
            return Err(SessionError::Store(StoreError::Corrupt(format!(
                "session {} has {} attempts for {} verses",
                session_id, index, verse_count
            ))));
        }

        let previous = index.checked_sub(1).map(|i| verses[i].clone());
        let verse = verses.swap_remove(index);

        Ok(SessionProgress::Next(VersePrompt {
            chapter,
            session_id,
            index,
            verse,
            previous,
            verse_count,
        }))
    }

    /// Score one verse, record the attempt and complete the session after the
    /// final verse.
    pub fn submit(
        &self,
        user_id: i64,
        session_id: i64,
        verse_index: usize,
        input: &str,
    ) -> SessionResult<VerseFeedback> {
        let session = self.owned_session(user_id, session_id)?;
        if session.is_completed() {
            return Err(SessionError::AlreadyCompleted(session_id));
        }

        let verses = self.store.chapter_verses(session.chapter_id)?;
        let verse_count = verses.len();
        if verse_index >= verse_count {
            return Err(SessionError::VerseOutOfRange {
                index: verse_index,
                verse_count,
            });
        }

        let attempts = self.store.session_attempts(session_id)?;
        if verse_index != attempts.len() {
            return Err(SessionError::OutOfOrder {
                expected: attempts.len(),
                got: verse_index,
            });
        }

        let verse = &verses[verse_index];
        let comparison = compare(&verse.content, input, &session.options);
        let attempt = NewVerseAttempt {
            session_id,
            verse_id: verse.id,
            user_input: input,
            similarity: comparison.similarity,
            attempted_at: Utc::now(),
        };
        let rejected = |e: StoreError| match e {
            // A concurrent submit for the same verse won the race
            StoreError::Conflict(_) => SessionError::OutOfOrder {
                expected: verse_index + 1,
                got: verse_index,
            },
            StoreError::NotOpen(_) => SessionError::AlreadyCompleted(session_id),
            other => SessionError::Store(other),
        };

        let completion = if verse_index + 1 == verse_count {
            let mut similarities: Vec<f64> = attempts.iter().map(|a| a.similarity).collect();
            similarities.push(comparison.similarity);
            let completion = completion_for(&similarities)?;
            self.store.insert_final_attempt(&attempt, &completion).map_err(rejected)?;
            log_completion(session_id, &completion);
            Some(completion)
        } else {
            self.store.insert_attempt(&attempt).map_err(rejected)?;
            None
        };

        tracing::debug!(
            "Session {} verse {}/{} similarity {:.3}",
            session_id,
            verse_index + 1,
            verse_count,
            comparison.similarity
        );

        Ok(VerseFeedback {
            session_id,
            verse_index,
            verse_count,
            verse: verse.clone(),
            similarity: comparison.similarity,
            percent: scoring::to_percent(comparison.similarity),
            diff: comparison.diff,
            completion,
        })
    }

    /// Complete an open session whose attempts already cover every verse.
    ///
    /// A store that writes the final attempt and the completion separately can
    /// fail between the two. The stored similarities are enough to finish the
    /// session on the next read.
    fn settle(&self, session: MemorizationSession) -> SessionResult<MemorizationSession> {
        if session.is_completed() {
            return Ok(session);
        }
        let verse_count = self.store.chapter_verses(session.chapter_id)?.len();
        let attempts = self.store.session_attempts(session.id)?;
        if verse_count == 0 || attempts.len() < verse_count {
            return Ok(session);
        }

        let similarities: Vec<f64> = attempts.iter().map(|a| a.similarity).collect();
        let completion = completion_for(&similarities)?;
        match self.store.complete_session(session.id, &completion) {
            Ok(()) => {
                tracing::warn!(
                    "Session {} had every verse recorded but was still open",
                    session.id
                );
                log_completion(session.id, &completion);
                Ok(MemorizationSession {
                    completion: Some(completion),
                    ..session
                })
            }
            // Another request finished it first
            Err(StoreError::NotOpen(_)) => self
                .store
                .session(session.id)?
                .ok_or(SessionError::SessionNotFound(session.id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Report for a completed session, with the user's recent history for the
    /// same chapter.
    ///
    /// Diffs are recomputed with the options the session was scored with, so
    /// they agree with the stored similarities.
    pub fn report(&self, user_id: i64, session_id: i64) -> SessionResult<SessionReport> {
        let session = self.owned_session(user_id, session_id)?;
        let completion = session
            .completion
            .clone()
            .ok_or(SessionError::NotCompleted(session_id))?;

        let chapter = self.chapter_of(&session)?;
        let verses = self.store.chapter_verses(session.chapter_id)?;
        let attempts = self.store.session_attempts(session_id)?;

        let mut verse_reports = Vec::with_capacity(attempts.len());
        for attempt in attempts {
            let verse = verses
                .iter()
                .find(|v| v.id == attempt.verse_id)
                .cloned()
                .ok_or_else(|| {
                    StoreError::Corrupt(format!(
                        "attempt {} points at verse {} outside chapter {}",
                        attempt.id, attempt.verse_id, session.chapter_id
                    ))
                })?;
            let diff = compare(&verse.content, &attempt.user_input, &session.options).diff;
            verse_reports.push(VerseReport {
                percent: scoring::to_percent(attempt.similarity),
                verse,
                attempt,
                diff,
            });
        }

        let history = self.store.recent_completed_sessions(
            user_id,
            session.chapter_id,
            self.history_limit,
        )?;

        Ok(SessionReport {
            chapter,
            session,
            completion,
            verses: verse_reports,
            history,
        })
    }

    /// Sessions of other users are reported as missing.
    fn owned_session(&self, user_id: i64, session_id: i64) -> SessionResult<MemorizationSession> {
        match self.store.session(session_id)? {
            Some(session) if session.user_id == user_id => self.settle(session),
            _ => Err(SessionError::SessionNotFound(session_id)),
        }
    }

    fn chapter_of(&self, session: &MemorizationSession) -> SessionResult<Chapter> {
        self.store
            .chapter(session.chapter_id)?
            .ok_or(SessionError::ChapterNotFound(session.chapter_id))
    }
}

fn completion_for(similarities: &[f64]) -> SessionResult<SessionCompletion> {
    let total_score = session_score(similarities);
    Ok(SessionCompletion {
        completed_at: Utc::now(),
        total_score,
        grade: scoring::grade(total_score)?,
    })
}

fn log_completion(session_id: i64, completion: &SessionCompletion) {
    tracing::info!(
        "Completed session {}: {:.1} ({})",
        session_id,
        completion.total_score,
        completion.grade
    );
}
