use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::{CompareOptions, LetterGrade};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Accepting verse attempts
    Open,
    /// Final verse recorded, score and grade set
    Completed,
}

/// Score, grade and timestamp written when a session finishes.
///
/// Kept as one value so a session either has all three or none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCompletion {
    pub completed_at: DateTime<Utc>,
    /// Mean similarity as a 0-100 percentage, one decimal place
    pub total_score: f64,
    pub grade: LetterGrade,
}

/// One practice run of one chapter by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorizationSession {
    pub id: i64,
    pub user_id: i64,
    pub chapter_id: i64,
    pub started_at: DateTime<Utc>,
    pub completion: Option<SessionCompletion>,
    /// Comparison rules fixed when the session started
    pub options: CompareOptions,
}

impl MemorizationSession {
    pub fn state(&self) -> SessionState {
        if self.completion.is_some() {
            SessionState::Completed
        } else {
            SessionState::Open
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state() == SessionState::Completed
    }
}

/// A stored submission for one verse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerseAttempt {
    pub id: i64,
    pub session_id: i64,
    pub verse_id: i64,
    /// Exactly what the user typed
    pub user_input: String,
    pub similarity: f64,
    pub attempted_at: DateTime<Utc>,
}

/// Attempt data before it has an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVerseAttempt<'a> {
    pub session_id: i64,
    pub verse_id: i64,
    pub user_input: &'a str,
    pub similarity: f64,
    pub attempted_at: DateTime<Utc>,
}
