pub mod chapter;
pub mod session;

pub use chapter::{Chapter, Verse};
pub use session::{
    MemorizationSession, NewVerseAttempt, SessionCompletion, SessionState, VerseAttempt,
};
