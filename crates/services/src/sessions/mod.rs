mod analysis;
mod progress;
mod service;
mod ticker;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use analysis::QuizAnalysis;
pub use progress::{QuestionStatus, SessionProgress};
pub use service::{Advance, LastQuestionPolicy, QuizSession};
pub use ticker::{TICK_PERIOD, Ticker};
pub use workflow::{QuizSessionController, SessionState};
