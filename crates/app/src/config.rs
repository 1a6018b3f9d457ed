use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use quiz_core::model::QuizId;
use services::LastQuestionPolicy;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(10);

/// Where quiz definitions come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceChoice {
    Api { base_url: String, token: Option<String> },
    Dir(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidQuizId { raw: String },
    InvalidLastQuestion { raw: String },
    InvalidTimeout { raw: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidQuizId { raw } => write!(f, "invalid QUIZ_ID value: {raw}"),
            ConfigError::InvalidLastQuestion { raw } => {
                write!(f, "invalid QUIZ_LAST_QUESTION value: {raw} (expected finish or stay)")
            }
            ConfigError::InvalidTimeout { raw } => {
                write!(f, "invalid QUIZ_API_TIMEOUT value: {raw} (expected whole seconds > 0)")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Runtime settings resolved from the environment (and `.env`).
///
/// Command-line flags are applied on top of this in `main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub source: SourceChoice,
    pub quiz_id: QuizId,
    pub last_question: LastQuestionPolicy,
    pub api_timeout: Duration,
    pub log_filter: String,
}

impl AppConfig {
    /// Load `.env` if present, then read the `QUIZ_*` variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let source = match non_blank("QUIZ_DIR") {
            Some(dir) => SourceChoice::Dir(PathBuf::from(dir)),
            None => SourceChoice::Api {
                base_url: non_blank("QUIZ_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
                token: non_blank("QUIZ_API_TOKEN"),
            },
        };

        let quiz_id = match non_blank("QUIZ_ID") {
            Some(raw) => raw
                .parse::<QuizId>()
                .map_err(|_| ConfigError::InvalidQuizId { raw })?,
            None => QuizId::new(1),
        };

        let last_question = match non_blank("QUIZ_LAST_QUESTION") {
            Some(raw) => parse_last_question(&raw)
                .ok_or(ConfigError::InvalidLastQuestion { raw })?,
            None => LastQuestionPolicy::default(),
        };

        let api_timeout = match non_blank("QUIZ_API_TIMEOUT") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(seconds) if seconds > 0 => Duration::from_secs(seconds),
                _ => return Err(ConfigError::InvalidTimeout { raw }),
            },
            None => DEFAULT_API_TIMEOUT,
        };

        Ok(Self {
            source,
            quiz_id,
            last_question,
            api_timeout,
            log_filter: non_blank("QUIZ_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
        })
    }
}

fn parse_last_question(raw: &str) -> Option<LastQuestionPolicy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "finish" => Some(LastQuestionPolicy::Finish),
        "stay" => Some(LastQuestionPolicy::Stay),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_local_api() {
        let config = config(&[]).unwrap();
        assert_eq!(
            config.source,
            SourceChoice::Api {
                base_url: DEFAULT_API_URL.into(),
                token: None,
            }
        );
        assert_eq!(config.quiz_id, QuizId::new(1));
        assert_eq!(config.last_question, LastQuestionPolicy::Finish);
        assert_eq!(config.api_timeout, DEFAULT_API_TIMEOUT);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn dir_takes_precedence_over_api() {
        let config = config(&[
            ("QUIZ_DIR", "/tmp/quizzes"),
            ("QUIZ_API_URL", "https://quiz.example"),
            ("QUIZ_ID", " 12 "),
            ("QUIZ_LAST_QUESTION", "Stay"),
        ])
        .unwrap();
        assert_eq!(config.source, SourceChoice::Dir(PathBuf::from("/tmp/quizzes")));
        assert_eq!(config.quiz_id, QuizId::new(12));
        assert_eq!(config.last_question, LastQuestionPolicy::Stay);
    }

    #[test]
    fn blank_token_is_ignored() {
        let config = config(&[("QUIZ_API_TOKEN", "   ")]).unwrap();
        assert!(matches!(config.source, SourceChoice::Api { token: None, .. }));
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            config(&[("QUIZ_ID", "abc")]).unwrap_err(),
            ConfigError::InvalidQuizId { raw: "abc".into() }
        );
        assert!(matches!(
            config(&[("QUIZ_LAST_QUESTION", "loop")]),
            Err(ConfigError::InvalidLastQuestion { .. })
        ));
    }

    #[test]
    fn api_timeout_is_whole_seconds() {
        let parsed = config(&[("QUIZ_API_TIMEOUT", " 25 ")]).unwrap();
        assert_eq!(parsed.api_timeout, Duration::from_secs(25));

        for raw in ["0", "1.5", "soon"] {
            assert_eq!(
                config(&[("QUIZ_API_TIMEOUT", raw)]).unwrap_err(),
                ConfigError::InvalidTimeout { raw: raw.into() }
            );
        }
    }
}
