use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::quiz::QuizDefinition;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{option:?} is not an option of question {index}")]
    InvalidOption { index: usize, option: String },

    #[error("question index {index} is out of range (total {total})")]
    IndexOutOfRange { index: usize, total: usize },
}

/// The user's chosen option per question index.
///
/// Keys are sparse: a missing key means the question is unanswered. Entries can be
/// overwritten but never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerLedger {
    total: usize,
    answers: BTreeMap<usize, String>,
}

impl AnswerLedger {
    /// Creates an empty ledger for a quiz with `total` questions.
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            total,
            answers: BTreeMap::new(),
        }
    }

    /// Creates an empty ledger sized for `quiz`.
    #[must_use]
    pub fn for_quiz(quiz: &QuizDefinition) -> Self {
        Self::new(quiz.total())
    }

    /// Record `option` as the answer to question `index`, replacing any earlier answer.
    ///
    /// Returns the previously stored answer, if any.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::IndexOutOfRange` if `index` is outside the quiz, or
    /// `LedgerError::InvalidOption` if `option` is not declared by that question.
    /// The ledger is left untouched on error.
    pub fn record(
        &mut self,
        quiz: &QuizDefinition,
        index: usize,
        option: &str,
    ) -> Result<Option<String>, LedgerError> {
        let question = quiz
            .question(index)
            .filter(|_| index < self.total)
            .ok_or(LedgerError::IndexOutOfRange {
                index,
                total: self.total,
            })?;

        if !question.has_option(option) {
            return Err(LedgerError::InvalidOption {
                index,
                option: option.to_string(),
            });
        }

        Ok(self.answers.insert(index, option.to_string()))
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    #[must_use]
    pub fn is_answered(&self, index: usize) -> bool {
        self.answers.contains_key(&index)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct questions with a stored answer.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.total.saturating_sub(self.answered_count())
    }

    /// Stored answers keyed by question index, in question order.
    #[must_use]
    pub fn answers(&self) -> &BTreeMap<usize, String> {
        &self.answers
    }
}
