use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use quiz_core::model::{
    AnswerLedger, Navigator, Question, QuizDefinition, SessionClock, SessionSnapshot, Step,
};

use super::progress::{QuestionStatus, SessionProgress};
use crate::error::SessionError;

//
// ─── POLICY ────────────────────────────────────────────────────────────────────
//

/// What `next()` does when the last question is already showing.
///
/// Jumping through the question grid never finishes the quiz under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastQuestionPolicy {
    /// `next()` on the last question finishes the attempt.
    #[default]
    Finish,
    /// `next()` on the last question stays put; only `finish()` ends the attempt.
    Stay,
}

/// Outcome of a relative move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved(usize),
    Stayed(usize),
    Finished,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory quiz attempt.
///
/// Owns the navigator, answer ledger and elapsed-time clock for one run through a quiz.
/// Timestamps come from the caller so time stays deterministic in tests.
/// Once finished every mutation fails with `SessionError::SessionClosed`.
pub struct QuizSession {
    quiz: Arc<QuizDefinition>,
    navigator: Navigator,
    ledger: AnswerLedger,
    clock: SessionClock,
    policy: LastQuestionPolicy,
    snapshot: Option<SessionSnapshot>,
}

impl QuizSession {
    /// Start a fresh attempt at `started_at`: first question, empty ledger, running clock.
    #[must_use]
    pub fn start(quiz: Arc<QuizDefinition>, started_at: DateTime<Utc>) -> Self {
        Self {
            navigator: Navigator::for_quiz(&quiz),
            ledger: AnswerLedger::for_quiz(&quiz),
            clock: SessionClock::start(started_at),
            quiz,
            policy: LastQuestionPolicy::default(),
            snapshot: None,
        }
    }

    #[must_use]
    pub fn with_last_question_policy(mut self, policy: LastQuestionPolicy) -> Self {
        self.policy = policy;
        self
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
    pub fn last_question_policy(&self) -> LastQuestionPolicy {
        self.policy
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.navigator.current()
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        // The navigator never leaves 0..total and total is never zero.
        &self.quiz.questions()[self.navigator.current()]
    }

    /// Answer stored for the current question, if any.
    #[must_use]
    pub fn current_answer(&self) -> Option<&str> {
        self.ledger.get(self.navigator.current())
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
    pub fn is_finished(&self) -> bool {
        self.snapshot.is_some()
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&SessionSnapshot> {
        self.snapshot.as_ref()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.quiz.total(),
            current: self.navigator.current(),
            answered: self.ledger.answered_count(),
            unanswered: self.ledger.unanswered_count(),
            is_finished: self.is_finished(),
        }
    }

    #[must_use]
    pub fn question_statuses(&self) -> Vec<QuestionStatus> {
        (0..self.quiz.total())
            .map(|index| {
                if self.ledger.is_answered(index) {
                    QuestionStatus::Answered
                } else {
                    QuestionStatus::Unanswered
                }
            })
            .collect()
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.is_finished() {
            return Err(SessionError::SessionClosed);
        }
        Ok(())
    }

    /// Record `option` for the current question, replacing any earlier choice.
    ///
    /// Returns the previous answer, if there was one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionClosed` after finishing, or
    /// `SessionError::InvalidOption` if `option` is not one of the question's options.
    pub fn select_answer(&mut self, option: &str) -> Result<Option<String>, SessionError> {
        self.ensure_open()?;
        let index = self.navigator.current();
        let previous = self.ledger.record(&self.quiz, index, option)?;
        tracing::debug!(index, option, replaced = previous.is_some(), "answer recorded");
        Ok(previous)
    }

    /// Jump to `index`, clamped into range. Never finishes the attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionClosed` after finishing.
    pub fn go_to(&mut self, index: usize) -> Result<usize, SessionError> {
        self.ensure_open()?;
        let landed = self.navigator.jump(index);
        tracing::debug!(requested = index, landed, "jumped to question");
        Ok(landed)
    }

    /// Move forward one question. On the last question the configured
    /// [`LastQuestionPolicy`] decides between finishing at `now` and staying put.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionClosed` after finishing.
    pub fn next(&mut self, now: DateTime<Utc>) -> Result<Advance, SessionError> {
        self.ensure_open()?;
        match self.navigator.next() {
            Step::Moved => Ok(Advance::Moved(self.navigator.current())),
            Step::Complete => match self.policy {
                LastQuestionPolicy::Finish => {
                    self.finish(now);
                    Ok(Advance::Finished)
                }
                LastQuestionPolicy::Stay => Ok(Advance::Stayed(self.navigator.current())),
            },
            Step::AtStart => Ok(Advance::Stayed(self.navigator.current())),
        }
    }

    /// Move back one question; stays on the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionClosed` after finishing.
    pub fn previous(&mut self) -> Result<Advance, SessionError> {
        self.ensure_open()?;
        match self.navigator.previous() {
            Step::Moved => Ok(Advance::Moved(self.navigator.current())),
            Step::AtStart | Step::Complete => Ok(Advance::Stayed(self.navigator.current())),
        }
    }

    /// Count one timer tick and reconcile with `now`. Returns the elapsed seconds.
    ///
    /// After finishing this only reports the frozen value.
    pub fn tick(&mut self, now: DateTime<Utc>) -> u64 {
        self.clock.tick();
        self.clock.reconcile(now)
    }

    /// Reconcile elapsed time with `now` without counting a tick.
    pub fn refresh_elapsed(&mut self, now: DateTime<Utc>) -> u64 {
        self.clock.reconcile(now)
    }

    /// Stop the clock at `now` and freeze the attempt.
    ///
    /// Idempotent: later calls return the snapshot taken by the first one.
    pub fn finish(&mut self, now: DateTime<Utc>) -> &SessionSnapshot {
        let Self {
            quiz,
            ledger,
            clock,
            snapshot,
            ..
        } = self;
        snapshot.get_or_insert_with(|| {
            clock.stop(now);
            let frozen = SessionSnapshot::freeze(Arc::clone(quiz), ledger.clone(), *clock, now);
            tracing::info!(
                quiz_id = %quiz.id(),
                answered = ledger.answered_count(),
                elapsed_seconds = frozen.elapsed_seconds(),
                "quiz finished"
            );
            frozen
        })
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", &self.quiz.id())
            .field("total", &self.quiz.total())
            .field("current", &self.navigator.current())
            .field("answered", &self.ledger.answered_count())
            .field("clock", &self.clock)
            .field("policy", &self.policy)
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::QuizId;
    use quiz_core::scoring::PerformanceCategory;
    use quiz_core::time::fixed_now;

    fn build_quiz(correct: &[&str]) -> Arc<QuizDefinition> {
        let options = || ["A", "B", "C", "D"].map(String::from).to_vec();
        Arc::new(
            QuizDefinition::from_parts(
                QuizId::new(1),
                "Letters",
                correct
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (format!("Question {i}"), options(), (*c).to_string())),
            )
            .unwrap(),
        )
    }

    fn answer_all(session: &mut QuizSession, answers: &[&str]) {
        for (index, option) in answers.iter().enumerate() {
            session.go_to(index).unwrap();
            session.select_answer(option).unwrap();
        }
    }

    #[test]
    fn starts_on_first_question_with_empty_ledger() {
        let session = QuizSession::start(build_quiz(&["A", "B"]), fixed_now());
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.current_question().text(), "Question 0");
        assert_eq!(session.ledger().answered_count(), 0);
        assert_eq!(session.elapsed_seconds(), 0);
        assert!(!session.is_finished());
    }

    #[test]
    fn scenario_partial_credit_is_average() {
        let mut session = QuizSession::start(build_quiz(&["B", "A", "C"]), fixed_now());
        answer_all(&mut session, &["B", "A", "D"]);

        let summary = session.finish(fixed_now()).score();

        assert_eq!(summary.correct, 2);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.percentage, 67);
        assert_eq!(summary.category, PerformanceCategory::Average);
    }

    #[test]
    fn scenario_unanswered_questions_need_improvement() {
        let mut session = QuizSession::start(build_quiz(&["B", "A", "C"]), fixed_now());
        session.select_answer("B").unwrap();

        assert_eq!(session.ledger().unanswered_count(), 2);
        let summary = session.finish(fixed_now()).score();
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.percentage, 33);
        assert_eq!(summary.category, PerformanceCategory::NeedsImprovement);
    }

    #[test]
    fn scenario_invalid_option_leaves_ledger_unchanged() {
        let mut session = QuizSession::start(build_quiz(&["B", "A", "C"]), fixed_now());
        session.select_answer("A").unwrap();
        let before = session.ledger().clone();

        let err = session.select_answer("Z").unwrap_err();

        assert!(matches!(err, SessionError::InvalidOption { index: 0, ref option } if option == "Z"));
        assert_eq!(session.ledger(), &before);
    }

    #[test]
    fn scenario_mutation_after_finish_is_rejected() {
        let mut session = QuizSession::start(build_quiz(&["B", "A", "C"]), fixed_now());
        session.select_answer("B").unwrap();
        let snapshot = session.finish(fixed_now() + Duration::seconds(4)).clone();

        assert!(matches!(
            session.select_answer("A"),
            Err(SessionError::SessionClosed)
        ));
        assert!(matches!(session.go_to(2), Err(SessionError::SessionClosed)));
        assert!(matches!(
            session.next(fixed_now()),
            Err(SessionError::SessionClosed)
        ));
        assert!(matches!(session.previous(), Err(SessionError::SessionClosed)));
        assert_eq!(session.snapshot(), Some(&snapshot));
    }

    #[test]
    fn finish_is_idempotent() {
        let mut session = QuizSession::start(build_quiz(&["A", "B"]), fixed_now());
        session.select_answer("A").unwrap();

        let first = session.finish(fixed_now() + Duration::seconds(10)).clone();
        let second = session.finish(fixed_now() + Duration::seconds(99)).clone();

        assert_eq!(first, second);
        assert_eq!(first.score(), second.score());
        assert_eq!(second.elapsed_seconds(), 10);
    }

    #[test]
    fn overwriting_an_answer_keeps_one_entry() {
        let mut session = QuizSession::start(build_quiz(&["A", "B"]), fixed_now());
        assert_eq!(session.select_answer("C").unwrap(), None);
        assert_eq!(session.select_answer("A").unwrap(), Some("C".to_string()));
        assert_eq!(session.current_answer(), Some("A"));
        assert_eq!(session.ledger().answered_count(), 1);
    }

    #[test]
    fn next_walks_to_last_question_then_finishes_by_default() {
        let mut session = QuizSession::start(build_quiz(&["A", "B", "C", "D"]), fixed_now());

        for expected in 1..4 {
            assert_eq!(session.next(fixed_now()).unwrap(), Advance::Moved(expected));
        }
        assert_eq!(session.current_index(), 3);

        assert_eq!(session.next(fixed_now()).unwrap(), Advance::Finished);
        assert!(session.is_finished());
    }

    #[test]
    fn stay_policy_keeps_last_question_until_finish() {
        let mut session = QuizSession::start(build_quiz(&["A", "B", "C"]), fixed_now())
            .with_last_question_policy(LastQuestionPolicy::Stay);

        for _ in 0..10 {
            session.next(fixed_now()).unwrap();
        }

        assert_eq!(session.current_index(), 2);
        assert!(!session.is_finished());
        assert_eq!(session.next(fixed_now()).unwrap(), Advance::Stayed(2));

        session.finish(fixed_now());
        assert!(session.is_finished());
    }

    #[test]
    fn jumping_to_last_question_never_finishes() {
        let mut session = QuizSession::start(build_quiz(&["A", "B", "C"]), fixed_now());
        assert_eq!(session.go_to(2).unwrap(), 2);
        session.select_answer("C").unwrap();
        assert!(!session.is_finished());
    }

    #[test]
    fn go_to_clamps_out_of_range() {
        let mut session = QuizSession::start(build_quiz(&["A", "B", "C"]), fixed_now());
        assert_eq!(session.go_to(50).unwrap(), 2);
        assert_eq!(session.current_index(), 2);
    }

    #[test]
    fn previous_on_first_question_stays() {
        let mut session = QuizSession::start(build_quiz(&["A", "B"]), fixed_now());
        assert_eq!(session.previous().unwrap(), Advance::Stayed(0));
        session.next(fixed_now()).unwrap();
        assert_eq!(session.previous().unwrap(), Advance::Moved(0));
    }

    #[test]
    fn elapsed_is_monotonic_and_reconciles_with_wall_clock() {
        let mut session = QuizSession::start(build_quiz(&["A"]), fixed_now());
        let mut last = 0;
        for second in 1..=5 {
            let now = fixed_now() + Duration::seconds(second);
            let elapsed = session.tick(now);
            assert!(elapsed >= last);
            last = elapsed;
        }
        assert_eq!(last, 5);

        // Missed ticks while backgrounded are recovered from the wall clock.
        let elapsed = session.refresh_elapsed(fixed_now() + Duration::seconds(30));
        assert_eq!(elapsed, 30);

        let snapshot = session.finish(fixed_now() + Duration::seconds(31));
        assert_eq!(snapshot.elapsed_seconds(), 31);
        assert_eq!(session.tick(fixed_now() + Duration::seconds(60)), 31);
    }

    #[test]
    fn frozen_elapsed_agrees_with_recorded_timestamps() {
        let mut session = QuizSession::start(build_quiz(&["A"]), fixed_now());
        for _ in 0..5 {
            session.tick(fixed_now());
        }

        let record = session.finish(fixed_now() + Duration::seconds(2)).to_record();

        assert_eq!(record.elapsed_seconds, 2);
        assert_eq!(
            (record.ended_at - record.started_at).num_seconds(),
            2
        );
    }

    #[test]
    fn progress_and_statuses_track_answers() {
        let mut session = QuizSession::start(build_quiz(&["A", "B", "C"]), fixed_now());
        session.go_to(1).unwrap();
        session.select_answer("B").unwrap();

        let progress = session.progress();
        assert_eq!(
            progress,
            SessionProgress {
                total: 3,
                current: 1,
                answered: 1,
                unanswered: 2,
                is_finished: false,
            }
        );
        assert_eq!(
            session.question_statuses(),
            vec![
                QuestionStatus::Unanswered,
                QuestionStatus::Answered,
                QuestionStatus::Unanswered,
            ]
        );
    }

    #[test]
    fn verdicts_sum_to_score() {
        let mut session = QuizSession::start(build_quiz(&["A", "B", "C", "D", "A"]), fixed_now());
        answer_all(&mut session, &["A", "A", "C"]);
        let snapshot = session.finish(fixed_now());

        let verdicts = snapshot.verdicts();
        assert_eq!(verdicts.len(), 5);
        assert_eq!(
            verdicts.iter().filter(|v| v.is_correct).count(),
            snapshot.score().correct
        );
    }
}
