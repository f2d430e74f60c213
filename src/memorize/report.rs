//! Read model for the session report page.

use serde::Serialize;

use crate::domain::{Chapter, MemorizationSession, SessionCompletion, Verse, VerseAttempt};
use crate::scoring::DiffToken;

#[derive(Debug, Clone, Serialize)]
pub struct VerseReport {
    pub verse: Verse,
    pub attempt: VerseAttempt,
    /// Attempt similarity as a 0-100 percentage
    pub percent: f64,
    pub diff: Vec<DiffToken>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub chapter: Chapter,
    pub session: MemorizationSession,
    pub completion: SessionCompletion,
    /// One entry per verse, in verse order
    pub verses: Vec<VerseReport>,
    /// The user's latest completed sessions for this chapter, newest first
    pub history: Vec<MemorizationSession>,
}

impl SessionReport {
    /// Seconds between start and completion
    pub fn duration_secs(&self) -> i64 {
        (self.completion.completed_at - self.session.started_at)
            .num_seconds()
            .max(0)
    }

    pub fn duration_display(&self) -> String {
        let secs = self.duration_secs();
        if secs >= 60 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else {
            format!("{}s", secs)
        }
    }

    pub fn perfect_verses(&self) -> usize {
        self.verses.iter().filter(|v| v.attempt.similarity >= 1.0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::LetterGrade;
    use chrono::{Duration, Utc};

    fn report(elapsed: Duration) -> SessionReport {
        let started_at = Utc::now();
        SessionReport {
            chapter: Chapter {
                id: 1,
                title: "Poem".into(),
                author: None,
            },
            session: MemorizationSession {
                id: 1,
                user_id: 1,
                chapter_id: 1,
                started_at,
                completion: None,
                options: Default::default(),
            },
            completion: SessionCompletion {
                completed_at: started_at + elapsed,
                total_score: 100.0,
                grade: LetterGrade::APlus,
            },
            verses: vec![],
            history: vec![],
        }
    }

    #[test]
    fn test_duration_display() {
        assert_eq!(report(Duration::seconds(42)).duration_display(), "42s");
        assert_eq!(report(Duration::seconds(125)).duration_display(), "2m 5s");
    }
}
