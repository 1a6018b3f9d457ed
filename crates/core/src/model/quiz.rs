use thiserror::Error;

use crate::model::ids::QuizId;
use crate::model::question::{Question, QuestionError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizDefinitionError {
    #[error("quiz has no questions")]
    NoQuestions,

    #[error("quiz payload is malformed: {0}")]
    Malformed(String),

    #[error("question {index} is invalid: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: QuestionError,
    },
}

/// Immutable quiz: a title plus an ordered, non-empty list of questions.
///
/// Loaded once and then shared read-only between the session and scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDefinition {
    id: QuizId,
    title: String,
    questions: Vec<Question>,
}

impl QuizDefinition {
    /// # Errors
    ///
    /// Returns `QuizDefinitionError::NoQuestions` for an empty question list.
    pub fn new(
        id: QuizId,
        title: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, QuizDefinitionError> {
        if questions.is_empty() {
            return Err(QuizDefinitionError::NoQuestions);
        }
        Ok(Self {
            id,
            title: title.into(),
            questions,
        })
    }

    /// Validate raw `(text, options, correct)` triples and build a definition.
    ///
    /// The first invalid question wins; its index is reported.
    ///
    /// # Errors
    ///
    /// Returns `QuizDefinitionError` if there are no questions or any question fails validation.
    pub fn from_parts<I>(
        id: QuizId,
        title: impl Into<String>,
        parts: I,
    ) -> Result<Self, QuizDefinitionError>
    where
        I: IntoIterator<Item = (String, Vec<String>, String)>,
    {
        let questions = parts
            .into_iter()
            .enumerate()
            .map(|(index, (text, options, correct))| {
                Question::new(text, options, correct)
                    .map_err(|source| QuizDefinitionError::InvalidQuestion { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(id, title, questions)
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Number of questions. Never zero.
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }
}
