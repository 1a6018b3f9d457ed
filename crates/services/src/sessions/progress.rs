/// Aggregated view of session progress, useful for a question grid or status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub current: usize,
    pub answered: usize,
    pub unanswered: usize,
    pub is_finished: bool,
}

/// Per-question marker for the question grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStatus {
    Answered,
    Unanswered,
}
