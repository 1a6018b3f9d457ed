use crate::model::quiz::QuizDefinition;

/// Result of a relative move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The index changed.
    Moved,
    /// `previous()` at the first question; nothing changed.
    AtStart,
    /// `next()` at the last question; nothing changed, the quiz is complete.
    Complete,
}

/// Current question position, always within `0..total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigator {
    current: usize,
    total: usize,
}

impl Navigator {
    /// Returns `None` when `total` is zero.
    #[must_use]
    pub fn new(total: usize) -> Option<Self> {
        (total > 0).then_some(Self { current: 0, total })
    }

    #[must_use]
    pub fn for_quiz(quiz: &QuizDefinition) -> Self {
        Self {
            current: 0,
            total: quiz.total().max(1),
        }
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.total
    }

    /// Move to `index`, clamped to the last question. Returns the new index.
    pub fn jump(&mut self, index: usize) -> usize {
        self.current = index.min(self.total - 1);
        self.current
    }

    pub fn next(&mut self) -> Step {
        if self.is_last() {
            return Step::Complete;
        }
        self.current += 1;
        Step::Moved
    }

    pub fn previous(&mut self) -> Step {
        if self.is_first() {
            return Step::AtStart;
        }
        self.current -= 1;
        Step::Moved
    }
}
