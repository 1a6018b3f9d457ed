mod config;
mod prompt;
mod report;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use content::{HttpQuizSource, HttpSourceConfig, JsonFileQuizSource, QuizSource};
use quiz_core::model::QuizId;
use services::{
    Advance, Clock, LastQuestionPolicy, QuizLoader, QuizSessionController, SessionError,
    SessionState,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use config::{AppConfig, SourceChoice};
use prompt::{HELP, PromptCommand, resolve_option};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidQuizId { raw: String },
    InvalidApiUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuizId { raw } => write!(f, "invalid --quiz-id value: {raw}"),
            ArgsError::InvalidApiUrl { raw } => write!(f, "invalid --api value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- [--quiz-id <id>] [--api <url>] [--dir <path>] \
         [--stay-on-last] [--no-timer] [--json]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --quiz-id 1");
    eprintln!("  --api {}", config::DEFAULT_API_URL);
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_API_URL, QUIZ_API_TOKEN, QUIZ_DIR, QUIZ_ID, QUIZ_LAST_QUESTION, QUIZ_LOG");
    eprintln!("  QUIZ_API_TIMEOUT (seconds, default {})", config::DEFAULT_API_TIMEOUT.as_secs());
}

struct Args {
    config: AppConfig,
    ticking: bool,
    json: bool,
}

impl Args {
    /// Apply command-line flags on top of the environment configuration.
    fn parse(
        mut config: AppConfig,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<Self, ArgsError> {
        let mut ticking = true;
        let mut json = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--quiz-id" => {
                    let value = require_value(args, "--quiz-id")?;
                    config.quiz_id = value
                        .parse::<QuizId>()
                        .map_err(|_| ArgsError::InvalidQuizId { raw: value.clone() })?;
                }
                "--api" => {
                    let value = require_value(args, "--api")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidApiUrl { raw: value });
                    }
                    let token = match &config.source {
                        SourceChoice::Api { token, .. } => token.clone(),
                        SourceChoice::Dir(_) => None,
                    };
                    config.source = SourceChoice::Api {
                        base_url: value,
                        token,
                    };
                }
                "--dir" => {
                    let value = require_value(args, "--dir")?;
                    config.source = SourceChoice::Dir(PathBuf::from(value));
                }
                "--stay-on-last" => config.last_question = LastQuestionPolicy::Stay,
                "--no-timer" => ticking = false,
                "--json" => json = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            config,
            ticking,
            json,
        })
    }
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr so the quiz prompt on stdout stays readable.
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("logging disabled: {err}");
    }
}

fn build_source(config: &AppConfig) -> Result<Arc<dyn QuizSource>, Box<dyn std::error::Error>> {
    let source: Arc<dyn QuizSource> = match &config.source {
        SourceChoice::Api { base_url, token } => {
            let config = HttpSourceConfig::new(base_url.clone())
                .with_token(token.clone())
                .with_timeout(config.api_timeout);
            Arc::new(HttpQuizSource::new(config)?)
        }
        SourceChoice::Dir(dir) => Arc::new(JsonFileQuizSource::new(dir.clone())),
    };
    Ok(source)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(config, &mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing(&args.config.log_filter);
    tracing::debug!(source = ?args.config.source, quiz_id = %args.config.quiz_id, "starting");

    let loader = QuizLoader::new(build_source(&args.config)?);
    let mut controller = QuizSessionController::new(Clock::default_clock(), loader)
        .with_last_question_policy(args.config.last_question)
        .with_ticking(args.ticking);

    controller.start(args.config.quiz_id).await?;
    if let Some(session) = controller.session() {
        println!("{}", session.quiz().title());
        println!("{HELP}");
        print!("{}", report::render_question(session));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while controller.state() == SessionState::Active {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    controller.abandon();
                    break;
                };
                if !handle_line(&mut controller, &line) {
                    break;
                }
            }
            elapsed = controller.next_tick() => {
                tracing::trace!(elapsed, "timer");
            }
        }
    }

    if let Some(analysis) = controller.analysis() {
        print!("{}", report::render_analysis(&analysis));
        if args.json {
            if let Some(snapshot) = controller.snapshot() {
                println!("{}", serde_json::to_string_pretty(&snapshot.to_record())?);
            }
        }
    } else {
        println!("Quiz abandoned.");
    }
    Ok(())
}

/// Apply one prompt line. Returns `false` when the user quits.
fn handle_line(controller: &mut QuizSessionController, line: &str) -> bool {
    let Some(command) = PromptCommand::parse(line) else {
        return true;
    };

    let outcome = match &command {
        PromptCommand::Pick(_) | PromptCommand::Answer(_) => {
            let option = controller
                .session()
                .and_then(|session| resolve_option(session.current_question(), &command));
            match option {
                Some(option) => controller.select_answer(&option).map(|_| ()),
                None => Ok(()),
            }
        }
        PromptCommand::Next => controller.next().map(|advance| {
            if advance == Advance::Finished {
                println!("That was the last question.");
            }
        }),
        PromptCommand::Previous => controller.previous().map(|_| ()),
        PromptCommand::GoTo(number) => controller.go_to(number.saturating_sub(1)).map(|_| ()),
        PromptCommand::Status => {
            let elapsed = controller.elapsed_seconds().unwrap_or_default();
            if let Some(session) = controller.session() {
                println!("{}", report::render_status(session, elapsed));
            }
            return true;
        }
        PromptCommand::Finish => controller.finish().map(|_| ()),
        PromptCommand::Quit => {
            controller.abandon();
            return false;
        }
        PromptCommand::Help => {
            println!("{HELP}");
            return true;
        }
    };

    match outcome {
        Ok(()) => {}
        Err(err @ SessionError::InvalidOption { .. }) => println!("{err}"),
        Err(err) => {
            tracing::warn!(error = %err, "command rejected");
            println!("{err}");
        }
    }

    if controller.state() == SessionState::Active {
        if let Some(session) = controller.session() {
            print!("{}", report::render_question(session));
        }
    }
    true
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
