use std::fmt::Write as _;

use quiz_core::scoring::VerdictStatus;
use services::{QuestionStatus, QuizAnalysis, QuizSession};

/// Elapsed seconds as `m:ss`; minutes are not wrapped into hours.
#[must_use]
pub fn format_elapsed(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Current question with numbered options; the recorded answer is marked.
#[must_use]
pub fn render_question(session: &QuizSession) -> String {
    let question = session.current_question();
    let selected = session.current_answer();
    let mut out = format!(
        "\nQuestion {}/{}: {}\n",
        session.current_index() + 1,
        session.quiz().total(),
        question.text()
    );
    for (number, option) in question.options().iter().enumerate() {
        let marker = if selected == Some(option.as_str()) { '*' } else { ' ' };
        let _ = writeln!(out, " {marker} {}. {option}", number + 1);
    }
    out
}

/// One-line progress plus the question grid (`#` answered, `.` open, `[]` current).
#[must_use]
pub fn render_status(session: &QuizSession, elapsed_seconds: u64) -> String {
    let progress = session.progress();
    let grid: Vec<String> = session
        .question_statuses()
        .iter()
        .enumerate()
        .map(|(index, status)| {
            let mark = match status {
                QuestionStatus::Answered => '#',
                QuestionStatus::Unanswered => '.',
            };
            if index == progress.current {
                format!("[{mark}]")
            } else {
                mark.to_string()
            }
        })
        .collect();
    format!(
        "answered {}/{} | unanswered {} | time {} | {}",
        progress.answered,
        progress.total,
        progress.unanswered,
        format_elapsed(elapsed_seconds),
        grid.join(" ")
    )
}

/// Result screen for a finished attempt.
#[must_use]
pub fn render_analysis(analysis: &QuizAnalysis) -> String {
    let summary = &analysis.summary;
    let mut out = String::new();
    let _ = writeln!(out, "\n{} - results", analysis.title);
    let _ = writeln!(
        out,
        "Score: {}/{} ({}%) - {}",
        summary.correct,
        summary.total,
        summary.percentage,
        summary.category.label()
    );
    let _ = writeln!(
        out,
        "Answered: {} | Unanswered: {} | Wrong: {}",
        analysis.answered, analysis.unanswered, analysis.answered_incorrectly
    );
    let _ = writeln!(out, "Time: {}", format_elapsed(analysis.elapsed_seconds));
    out.push('\n');
    for verdict in &analysis.verdicts {
        let line = match verdict.status() {
            VerdictStatus::Correct => format!("correct ({})", verdict.correct_option),
            VerdictStatus::Incorrect => format!(
                "wrong: {} (answer: {})",
                verdict.user_answer.as_deref().unwrap_or_default(),
                verdict.correct_option
            ),
            VerdictStatus::Unanswered => {
                format!("not answered (answer: {})", verdict.correct_option)
            }
        };
        let _ = writeln!(out, "  Q{}: {line}", verdict.index + 1);
    }
    let missed: Vec<String> = analysis
        .missed()
        .map(|verdict| format!("Q{}", verdict.index + 1))
        .collect();
    if !missed.is_empty() {
        let _ = writeln!(out, "\nTo review: {}", missed.join(", "));
    }
    out
}
