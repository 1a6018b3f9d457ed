use std::fmt;

use quiz_core::model::{QuizId, SessionSnapshot};

use super::analysis::QuizAnalysis;
use super::service::{Advance, LastQuestionPolicy, QuizSession};
use super::ticker::{TICK_PERIOD, Ticker};
use crate::Clock;
use crate::error::SessionError;
use crate::loader::QuizLoader;

/// Lifecycle state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Active,
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Idle => "idle",
            SessionState::Loading => "loading",
            SessionState::Active => "active",
            SessionState::Finished => "finished",
        };
        f.write_str(label)
    }
}

enum Phase {
    Idle,
    Loading(QuizId),
    Active {
        session: QuizSession,
        ticker: Option<Ticker>,
    },
    Finished {
        session: QuizSession,
    },
}

impl Phase {
    fn state(&self) -> SessionState {
        match self {
            Phase::Idle => SessionState::Idle,
            Phase::Loading(_) => SessionState::Loading,
            Phase::Active { .. } => SessionState::Active,
            Phase::Finished { .. } => SessionState::Finished,
        }
    }
}

/// Resets an in-flight load back to `Idle` if the `start` future is dropped.
struct LoadGuard<'a> {
    phase: &'a mut Phase,
    armed: bool,
}

impl<'a> LoadGuard<'a> {
    fn begin(phase: &'a mut Phase, id: QuizId) -> Self {
        *phase = Phase::Loading(id);
        Self { phase, armed: true }
    }

    fn complete(mut self, next: Phase) {
        *self.phase = next;
        self.armed = false;
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            if let Phase::Loading(id) = self.phase {
                tracing::debug!(quiz_id = %id, "quiz load cancelled");
            }
            *self.phase = Phase::Idle;
        }
    }
}

fn spawn_ticker(ticking: bool) -> Option<Ticker> {
    if !ticking {
        return None;
    }
    let ticker = Ticker::spawn(TICK_PERIOD);
    if ticker.is_none() {
        tracing::warn!("no async runtime available; session timer disabled");
    }
    ticker
}

/// Drives one quiz attempt at a time: load, answer, navigate, time, finish.
///
/// State machine: `Idle -> Loading -> Active -> Finished`. A failed or cancelled load
/// returns to `Idle`. Starting while `Active` abandons the current attempt first.
pub struct QuizSessionController {
    clock: Clock,
    loader: QuizLoader,
    policy: LastQuestionPolicy,
    ticking: bool,
    phase: Phase,
}

impl QuizSessionController {
    #[must_use]
    pub fn new(clock: Clock, loader: QuizLoader) -> Self {
        Self {
            clock,
            loader,
            policy: LastQuestionPolicy::default(),
            ticking: true,
            phase: Phase::Idle,
        }
    }

    #[must_use]
    pub fn with_last_question_policy(mut self, policy: LastQuestionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enable or disable the background one-second timer (enabled by default).
    #[must_use]
    pub fn with_ticking(mut self, ticking: bool) -> Self {
        self.ticking = ticking;
        self
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.phase.state()
    }

    /// The current attempt, whether active or finished.
    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        match &self.phase {
            Phase::Active { session, .. } | Phase::Finished { session } => Some(session),
            Phase::Idle | Phase::Loading(_) => None,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&SessionSnapshot> {
        match &self.phase {
            Phase::Finished { session } => session.snapshot(),
            _ => None,
        }
    }

    #[must_use]
    pub fn analysis(&self) -> Option<QuizAnalysis> {
        self.snapshot().map(QuizAnalysis::from_snapshot)
    }

    /// Elapsed seconds of the current attempt, reconciled with the clock while active.
    pub fn elapsed_seconds(&mut self) -> Option<u64> {
        let now = self.clock.now();
        match &mut self.phase {
            Phase::Active { session, .. } => Some(session.refresh_elapsed(now)),
            Phase::Finished { session } => Some(session.elapsed_seconds()),
            Phase::Idle | Phase::Loading(_) => None,
        }
    }

    /// Load quiz `id` and begin a fresh attempt.
    ///
    /// An active attempt is abandoned first. Dropping the returned future before it
    /// completes cancels the load and leaves the controller `Idle`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionClosed` while a finished attempt is showing
    /// (call `abandon` or `retry` first), or `SessionError::Load` when loading fails.
    pub async fn start(&mut self, id: QuizId) -> Result<(), SessionError> {
        match self.phase {
            Phase::Finished { .. } => return Err(SessionError::SessionClosed),
            Phase::Active { .. } => {
                tracing::info!(quiz_id = %id, "reloading; current attempt abandoned");
                self.abandon();
            }
            Phase::Idle | Phase::Loading(_) => {}
        }

        tracing::debug!(quiz_id = %id, "loading quiz");
        let guard = LoadGuard::begin(&mut self.phase, id);
        match self.loader.load(id).await {
            Ok(quiz) => {
                let session = QuizSession::start(quiz, self.clock.now())
                    .with_last_question_policy(self.policy);
                let ticker = spawn_ticker(self.ticking);
                guard.complete(Phase::Active { session, ticker });
                tracing::info!(quiz_id = %id, "quiz session started");
                Ok(())
            }
            Err(err) => {
                guard.complete(Phase::Idle);
                tracing::warn!(quiz_id = %id, error = %err, "quiz load failed");
                Err(err.into())
            }
        }
    }

    /// Drop the current attempt without scoring it. The controller returns to `Idle`.
    pub fn abandon(&mut self) {
        if let Phase::Active { session, .. } | Phase::Finished { session } = &self.phase {
            tracing::debug!(quiz_id = %session.quiz().id(), "session abandoned");
        }
        self.phase = Phase::Idle;
    }

    fn active_mut(&mut self) -> Result<&mut QuizSession, SessionError> {
        match &mut self.phase {
            Phase::Active { session, .. } => Ok(session),
            Phase::Finished { .. } => Err(SessionError::SessionClosed),
            phase => Err(SessionError::NotActive {
                state: phase.state(),
            }),
        }
    }

    /// Move a finished attempt out of `Active`, stopping its timer.
    fn settle(&mut self) {
        let finished = matches!(
            &self.phase,
            Phase::Active { session, .. } if session.is_finished()
        );
        if finished {
            if let Phase::Active { session, ticker } =
                std::mem::replace(&mut self.phase, Phase::Idle)
            {
                drop(ticker);
                self.phase = Phase::Finished { session };
            }
        }
    }

    /// Record an answer for the current question.
    ///
    /// # Errors
    ///
    /// See [`QuizSession::select_answer`]; also `SessionError::NotActive` without an attempt.
    pub fn select_answer(&mut self, option: &str) -> Result<Option<String>, SessionError> {
        self.active_mut()?.select_answer(option)
    }

    /// Jump to a question by index (clamped).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionClosed` after finishing or `SessionError::NotActive`.
    pub fn go_to(&mut self, index: usize) -> Result<usize, SessionError> {
        self.active_mut()?.go_to(index)
    }

    /// Advance one question; may finish the attempt depending on the policy.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionClosed` after finishing or `SessionError::NotActive`.
    pub fn next(&mut self) -> Result<Advance, SessionError> {
        let now = self.clock.now();
        let advance = self.active_mut()?.next(now)?;
        self.settle();
        Ok(advance)
    }

    /// # Errors
    ///
    /// Returns `SessionError::SessionClosed` after finishing or `SessionError::NotActive`.
    pub fn previous(&mut self) -> Result<Advance, SessionError> {
        self.active_mut()?.previous()
    }

    /// Finish the current attempt and return its snapshot.
    ///
    /// Calling this again after finishing returns the same snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` when no attempt is loaded.
    pub fn finish(&mut self) -> Result<&SessionSnapshot, SessionError> {
        let now = self.clock.now();
        match &mut self.phase {
            Phase::Active { session, .. } => {
                session.finish(now);
            }
            Phase::Finished { .. } => {}
            phase => {
                return Err(SessionError::NotActive {
                    state: phase.state(),
                });
            }
        }
        self.settle();
        self.snapshot().ok_or(SessionError::NotActive {
            state: self.phase.state(),
        })
    }

    /// Count one timer tick against the active attempt and return the elapsed seconds.
    ///
    /// After finishing the frozen value is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` when no attempt is loaded.
    pub fn tick(&mut self) -> Result<u64, SessionError> {
        let now = self.clock.now();
        match &mut self.phase {
            Phase::Active { session, .. } => {
                let elapsed = session.tick(now);
                tracing::trace!(elapsed, "tick");
                Ok(elapsed)
            }
            Phase::Finished { session } => Ok(session.elapsed_seconds()),
            phase => Err(SessionError::NotActive {
                state: phase.state(),
            }),
        }
    }

    /// Wait for the background timer, apply the tick, and return the elapsed seconds.
    ///
    /// Pends forever when no timer is running, so it is safe to use as a `select!` branch.
    pub async fn next_tick(&mut self) -> u64 {
        let ticked = match &mut self.phase {
            Phase::Active {
                ticker: Some(ticker),
                ..
            } => ticker.tick().await,
            _ => false,
        };
        if !ticked {
            return std::future::pending().await;
        }
        match self.tick() {
            Ok(elapsed) => elapsed,
            Err(_) => std::future::pending().await,
        }
    }

    /// Start a fresh attempt on the same quiz without fetching it again.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` when no quiz has been loaded.
    pub fn retry(&self) -> Result<Self, SessionError> {
        let quiz = self
            .session()
            .map(QuizSession::shared_quiz)
            .ok_or(SessionError::NotActive {
                state: self.state(),
            })?;
        tracing::info!(quiz_id = %quiz.id(), "retrying quiz");
        let session =
            QuizSession::start(quiz, self.clock.now()).with_last_question_policy(self.policy);
        Ok(Self {
            clock: self.clock,
            loader: self.loader.clone(),
            policy: self.policy,
            ticking: self.ticking,
            phase: Phase::Active {
                session,
                ticker: spawn_ticker(self.ticking),
            },
        })
    }
}

impl fmt::Debug for QuizSessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSessionController")
            .field("clock", &self.clock)
            .field("policy", &self.policy)
            .field("ticking", &self.ticking)
            .field("state", &self.state())
            .field("session", &self.session())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
