#![forbid(unsafe_code)]

pub mod file;
pub mod http;
pub mod source;

pub use file::JsonFileQuizSource;
pub use http::{HttpQuizSource, HttpSourceConfig};
pub use source::{InMemoryQuizSource, QuestionRecord, QuizRecord, QuizSource, SourceError};
