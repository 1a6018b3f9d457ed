#![forbid(unsafe_code)]

pub mod error;
pub mod loader;
pub mod sessions;

pub use quiz_core::Clock;

pub use error::{LoadError, SessionError};
pub use loader::QuizLoader;

pub use sessions::{
    Advance, LastQuestionPolicy, QuestionStatus, QuizAnalysis, QuizSession,
    QuizSessionController, SessionProgress, SessionState, Ticker,
};
