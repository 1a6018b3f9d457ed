use chrono::{DateTime, Utc};
use serde::Serialize;

use quiz_core::model::{QuizId, SessionSnapshot};
use quiz_core::scoring::{QuestionVerdict, ScoreSummary};

/// Result-screen data for a finished attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnalysis {
    pub quiz_id: QuizId,
    pub title: String,
    pub summary: ScoreSummary,
    pub verdicts: Vec<QuestionVerdict>,
    pub answered: usize,
    pub unanswered: usize,
    pub answered_incorrectly: usize,
    pub elapsed_seconds: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl QuizAnalysis {
    #[must_use]
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        let verdicts = snapshot.verdicts();
        let answered_incorrectly = verdicts
            .iter()
            .filter(|verdict| verdict.is_answered && !verdict.is_correct)
            .count();
        Self {
            quiz_id: snapshot.quiz().id(),
            title: snapshot.quiz().title().to_string(),
            summary: snapshot.score(),
            answered: snapshot.ledger().answered_count(),
            unanswered: snapshot.ledger().unanswered_count(),
            answered_incorrectly,
            verdicts,
            elapsed_seconds: snapshot.elapsed_seconds(),
            started_at: snapshot.started_at(),
            ended_at: snapshot.ended_at(),
        }
    }

    /// Verdicts for the questions that were not answered correctly.
    pub fn missed(&self) -> impl Iterator<Item = &QuestionVerdict> {
        self.verdicts.iter().filter(|verdict| !verdict.is_correct)
    }
}
