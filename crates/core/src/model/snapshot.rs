use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::QuizId;
use crate::model::ledger::AnswerLedger;
use crate::model::quiz::QuizDefinition;
use crate::model::session_clock::SessionClock;
use crate::scoring::{self, QuestionVerdict, ScoreSummary};

/// Frozen, read-only view of a finished attempt.
///
/// Built exactly once when an attempt finishes; scoring reads only from here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    quiz: Arc<QuizDefinition>,
    ledger: AnswerLedger,
    clock: SessionClock,
    ended_at: DateTime<Utc>,
}

impl SessionSnapshot {
    /// Stop `clock` at `ended_at` (if still running) and freeze the attempt.
    #[must_use]
    pub fn freeze(
        quiz: Arc<QuizDefinition>,
        ledger: AnswerLedger,
        mut clock: SessionClock,
        ended_at: DateTime<Utc>,
    ) -> Self {
        clock.stop(ended_at);
        let ended_at = clock.ended_at().unwrap_or(ended_at);
        Self {
            quiz,
            ledger,
            clock,
            ended_at,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &QuizDefinition {
        &self.quiz
    }

    #[must_use]
    pub fn shared_quiz(&self) -> Arc<QuizDefinition> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn ledger(&self) -> &AnswerLedger {
        &self.ledger
    }

    #[must_use]
    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.clock.elapsed_seconds()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.clock.started_at()
    }

    #[must_use]
    pub fn ended_at(&self) -> DateTime<Utc> {
        self.ended_at
    }

    #[must_use]
    pub fn score(&self) -> ScoreSummary {
        scoring::score(&self.quiz, &self.ledger)
    }

    #[must_use]
    pub fn verdicts(&self) -> Vec<QuestionVerdict> {
        scoring::verdicts(&self.quiz, &self.ledger)
    }

    #[must_use]
    pub fn to_record(&self) -> SnapshotRecord {
        SnapshotRecord {
            quiz_id: self.quiz.id(),
            answers: self.ledger.answers().clone(),
            elapsed_seconds: self.elapsed_seconds(),
            started_at: self.started_at(),
            ended_at: self.ended_at,
        }
    }
}

/// Serializable artifact handed to the analysis presenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub quiz_id: QuizId,
    pub answers: BTreeMap<usize, String>,
    pub elapsed_seconds: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}
