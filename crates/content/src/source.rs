use async_trait::async_trait;
use quiz_core::model::{QuizDefinition, QuizDefinitionError, QuizId};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by content sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("not found")]
    NotFound,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Wire shape of a question as served by the content service.
///
/// The service names the prompt `question`; older exports use `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(alias = "question", default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
}

/// Wire shape of a quiz. Unvalidated: convert with [`QuizRecord::into_definition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRecord {
    pub id: QuizId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<QuestionRecord>,
}

// The content service emits explicit `null` for unset columns.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl QuizRecord {
    /// Validate the record and convert it into a domain `QuizDefinition`.
    ///
    /// # Errors
    ///
    /// Returns `QuizDefinitionError` if there are no questions or any question is malformed.
    pub fn into_definition(self) -> Result<QuizDefinition, QuizDefinitionError> {
        QuizDefinition::from_parts(
            self.id,
            self.title,
            self.questions
                .into_iter()
                .map(|q| (q.text, q.options, q.answer)),
        )
    }
}

/// Read-only contract for fetching quiz definitions.
#[async_trait]
pub trait QuizSource: Send + Sync {
    /// Fetch the raw record for `id`.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::NotFound` if the id is unknown, or other source errors.
    async fn fetch_quiz(&self, id: QuizId) -> Result<QuizRecord, SourceError>;
}

/// Simple in-memory source for testing and demos.
#[derive(Clone, Default)]
pub struct InMemoryQuizSource {
    quizzes: Arc<Mutex<HashMap<QuizId, QuizRecord>>>,
}

impl InMemoryQuizSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Transport` if the internal lock is poisoned.
    pub fn insert(&self, record: QuizRecord) -> Result<(), SourceError> {
        let mut guard = self
            .quizzes
            .lock()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        guard.insert(record.id, record);
        Ok(())
    }

    /// Builder-style insert for tests.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_quiz(self, record: QuizRecord) -> Self {
        self.insert(record).expect("fresh in-memory source lock");
        self
    }
}

#[async_trait]
impl QuizSource for InMemoryQuizSource {
    async fn fetch_quiz(&self, id: QuizId) -> Result<QuizRecord, SourceError> {
        let guard = self
            .quizzes
            .lock()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        guard.get(&id).cloned().ok_or(SourceError::NotFound)
    }
}
