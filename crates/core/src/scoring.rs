//! Pure scoring over a quiz and its answers.
//!
//! Nothing here knows about session state; callers hand in a definition and a
//! ledger (normally from a frozen `SessionSnapshot`) and get derived values back.

use serde::{Deserialize, Serialize};

use crate::model::{AnswerLedger, QuizDefinition};

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Performance band for a percentage score.
///
/// Bands use inclusive lower bounds:
/// - `Excellent`: 90..=100
/// - `Good`: 70..90
/// - `Average`: 50..70
/// - `NeedsImprovement`: 0..50
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceCategory {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

impl PerformanceCategory {
    #[must_use]
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            90..=u8::MAX => Self::Excellent,
            70..=89 => Self::Good,
            50..=69 => Self::Average,
            _ => Self::NeedsImprovement,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub correct: usize,
    pub total: usize,
    pub percentage: u8,
    pub category: PerformanceCategory,
}

impl ScoreSummary {
    #[must_use]
    pub fn new(correct: usize, total: usize) -> Self {
        let percentage = percentage(correct, total);
        Self {
            correct,
            total,
            percentage,
            category: PerformanceCategory::from_percentage(percentage),
        }
    }

    /// Questions not answered correctly, unanswered ones included.
    #[must_use]
    pub fn incorrect(&self) -> usize {
        self.total.saturating_sub(self.correct)
    }
}

/// `round(100 * correct / total)` with halves rounded up, in integer arithmetic.
///
/// Returns 0 for an empty total; `correct` is capped at `total`.
#[must_use]
pub fn percentage(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total) as u128;
    let total = total as u128;
    let rounded = (200 * correct + total) / (2 * total);
    u8::try_from(rounded).unwrap_or(100)
}

//
// ─── VERDICTS ──────────────────────────────────────────────────────────────────
//

/// Coarse per-question outcome, handy for review lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Correct,
    Incorrect,
    Unanswered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionVerdict {
    pub index: usize,
    pub user_answer: Option<String>,
    pub correct_option: String,
    pub is_correct: bool,
    pub is_answered: bool,
}

impl QuestionVerdict {
    #[must_use]
    pub fn status(&self) -> VerdictStatus {
        match (self.is_answered, self.is_correct) {
            (true, true) => VerdictStatus::Correct,
            (true, false) => VerdictStatus::Incorrect,
            (false, _) => VerdictStatus::Unanswered,
        }
    }
}

/// One verdict per question, in question order.
#[must_use]
pub fn verdicts(quiz: &QuizDefinition, ledger: &AnswerLedger) -> Vec<QuestionVerdict> {
    quiz.questions()
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let user_answer = ledger.get(index);
            QuestionVerdict {
                index,
                user_answer: user_answer.map(str::to_string),
                correct_option: question.correct_option().to_string(),
                is_correct: user_answer.is_some_and(|answer| question.is_correct(answer)),
                is_answered: user_answer.is_some(),
            }
        })
        .collect()
}

#[must_use]
pub fn score(quiz: &QuizDefinition, ledger: &AnswerLedger) -> ScoreSummary {
    let correct = quiz
        .questions()
        .iter()
        .enumerate()
        .filter(|(index, question)| {
            ledger
                .get(*index)
                .is_some_and(|answer| question.is_correct(answer))
        })
        .count();

    ScoreSummary::new(correct, quiz.total())
}
