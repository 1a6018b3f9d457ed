use std::sync::Arc;

use content::{InMemoryQuizSource, QuizSource, SourceError};
use quiz_core::model::{QuizDefinition, QuizDefinitionError, QuizId};

use crate::error::LoadError;

/// Fetches quiz records and validates them before anything else sees them.
#[derive(Clone)]
pub struct QuizLoader {
    source: Arc<dyn QuizSource>,
}

impl QuizLoader {
    #[must_use]
    pub fn new(source: Arc<dyn QuizSource>) -> Self {
        Self { source }
    }

    #[must_use]
    pub fn in_memory(source: InMemoryQuizSource) -> Self {
        Self::new(Arc::new(source))
    }

    /// Fetch and validate the quiz `id`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::NotFound` for unknown ids, `LoadError::InvalidDefinition` when the
    /// payload cannot be parsed or fails validation, and `LoadError::Transport` for I/O and
    /// network failures.
    pub async fn load(&self, id: QuizId) -> Result<Arc<QuizDefinition>, LoadError> {
        let record = self.source.fetch_quiz(id).await.map_err(|err| match err {
            SourceError::NotFound => LoadError::NotFound(id),
            SourceError::Serialization(message) => LoadError::InvalidDefinition {
                id,
                source: QuizDefinitionError::Malformed(message),
            },
            other => LoadError::Transport {
                id,
                message: other.to_string(),
            },
        })?;

        let quiz = record
            .into_definition()
            .map_err(|source| LoadError::InvalidDefinition { id, source })?;

        tracing::info!(quiz_id = %id, questions = quiz.total(), "quiz loaded");
        Ok(Arc::new(quiz))
    }
}
