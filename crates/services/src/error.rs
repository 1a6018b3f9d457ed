//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{LedgerError, QuizDefinitionError, QuizId};

use crate::sessions::SessionState;

/// Errors emitted by `QuizLoader`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("quiz {0} not found")]
    NotFound(QuizId),
    #[error("quiz {id} is invalid: {source}")]
    InvalidDefinition {
        id: QuizId,
        #[source]
        source: QuizDefinitionError,
    },
    #[error("failed to fetch quiz {id}: {message}")]
    Transport { id: QuizId, message: String },
}

impl LoadError {
    /// Transport failures may succeed on a later attempt; the others will not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, LoadError::Transport { .. })
    }
}

/// Errors emitted by quiz sessions and the session controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("{option:?} is not an option of question {index}")]
    InvalidOption { index: usize, option: String },
    #[error("question {index} is out of range (total {total})")]
    QuestionOutOfRange { index: usize, total: usize },
    #[error("session already finished")]
    SessionClosed,
    #[error("no active session (state: {state})")]
    NotActive { state: SessionState },
}

impl From<LedgerError> for SessionError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidOption { index, option } => {
                SessionError::InvalidOption { index, option }
            }
            LedgerError::IndexOutOfRange { index, total } => {
                SessionError::QuestionOutOfRange { index, total }
            }
        }
    }
}
