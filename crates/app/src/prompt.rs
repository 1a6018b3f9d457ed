use quiz_core::model::Question;

/// A line typed at the quiz prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptCommand {
    /// 1-based option number as shown on screen.
    Pick(usize),
    /// Option given by its text.
    Answer(String),
    Next,
    Previous,
    /// 1-based question number.
    GoTo(usize),
    Status,
    Finish,
    Quit,
    Help,
}

impl PromptCommand {
    /// Parse one prompt line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let command = match line {
            "n" | "next" => Self::Next,
            "p" | "prev" | "previous" => Self::Previous,
            "s" | "status" => Self::Status,
            "f" | "finish" => Self::Finish,
            "q" | "quit" => Self::Quit,
            "h" | "help" | "?" => Self::Help,
            _ => {
                if let Some(rest) = line.strip_prefix("g ").or_else(|| line.strip_prefix("goto ")) {
                    if let Ok(number) = rest.trim().parse::<usize>() {
                        return Some(Self::GoTo(number));
                    }
                }
                match line.parse::<usize>() {
                    Ok(number) => Self::Pick(number),
                    Err(_) => Self::Answer(line.to_string()),
                }
            }
        };
        Some(command)
    }
}

/// Turn an answer command into the option text to record.
///
/// A number that is itself one of the options selects that option; otherwise it
/// picks by position. Numbers outside the option list fall back to their literal
/// text, which the session then rejects as an invalid option.
pub fn resolve_option(question: &Question, command: &PromptCommand) -> Option<String> {
    match command {
        PromptCommand::Pick(number) => {
            let literal = number.to_string();
            if question.has_option(&literal) {
                return Some(literal);
            }
            Some(
                number
                    .checked_sub(1)
                    .and_then(|index| question.options().get(index))
                    .cloned()
                    .unwrap_or(literal),
            )
        }
        PromptCommand::Answer(text) => Some(text.clone()),
        _ => None,
    }
}

pub const HELP: &str = "\
Commands:
  <number> | <text>  answer the current question
                     (a number that is an option's text selects that option)
  n / p              next / previous question
  g <number>         jump to a question
  s                  show status
  f                  finish and score
  q                  quit without scoring";

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question::new(
            "Pick one",
            vec!["Red".into(), "Green".into(), "Blue".into()],
            "Green",
        )
        .unwrap()
    }

    #[test]
    fn parses_navigation_commands() {
        assert_eq!(PromptCommand::parse(" n "), Some(PromptCommand::Next));
        assert_eq!(PromptCommand::parse("p"), Some(PromptCommand::Previous));
        assert_eq!(PromptCommand::parse("g 3"), Some(PromptCommand::GoTo(3)));
        assert_eq!(PromptCommand::parse("f"), Some(PromptCommand::Finish));
        assert_eq!(PromptCommand::parse("q"), Some(PromptCommand::Quit));
        assert_eq!(PromptCommand::parse("   "), None);
    }

    #[test]
    fn numbers_and_text_are_answers() {
        assert_eq!(PromptCommand::parse("2"), Some(PromptCommand::Pick(2)));
        assert_eq!(
            PromptCommand::parse("Blue"),
            Some(PromptCommand::Answer("Blue".into()))
        );
        assert_eq!(
            PromptCommand::parse("g x"),
            Some(PromptCommand::Answer("g x".into()))
        );
    }

    #[test]
    fn resolves_option_numbers_against_question() {
        let question = question();
        assert_eq!(
            resolve_option(&question, &PromptCommand::Pick(2)),
            Some("Green".into())
        );
        assert_eq!(
            resolve_option(&question, &PromptCommand::Pick(0)),
            Some("0".into())
        );
        assert_eq!(
            resolve_option(&question, &PromptCommand::Pick(9)),
            Some("9".into())
        );
        assert_eq!(resolve_option(&question, &PromptCommand::Next), None);
    }

    #[test]
    fn numeric_option_text_wins_over_position() {
        let question = Question::new(
            "Count down",
            vec!["4".into(), "3".into(), "2".into(), "1".into()],
            "1",
        )
        .unwrap();

        assert_eq!(
            resolve_option(&question, &PromptCommand::Pick(1)),
            Some("1".into())
        );
        assert_eq!(
            resolve_option(&question, &PromptCommand::Pick(4)),
            Some("4".into())
        );
        assert_eq!(
            resolve_option(&question, &PromptCommand::Pick(7)),
            Some("7".into())
        );
    }
}
