//! Memorization sessions: start, verse-by-verse scoring, completion and reports.

pub mod aggregator;
pub mod report;
pub mod store;

pub use aggregator::{
    session_score, SessionAggregator, SessionError, SessionProgress, SessionResult, VerseFeedback,
    VersePrompt,
};
pub use report::{SessionReport, VerseReport};
pub use store::{MemorizationStore, SqliteStore, StoreError, StoreResult};
