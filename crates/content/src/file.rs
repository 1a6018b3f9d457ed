use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use quiz_core::model::QuizId;

use crate::source::{QuizRecord, QuizSource, SourceError};

/// Reads quizzes from `<dir>/<id>.json`, one record per file.
#[derive(Debug, Clone)]
pub struct JsonFileQuizSource {
    dir: PathBuf,
}

impl JsonFileQuizSource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path_for(&self, id: QuizId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

#[async_trait]
impl QuizSource for JsonFileQuizSource {
    async fn fetch_quiz(&self, id: QuizId) -> Result<QuizRecord, SourceError> {
        let path = self.path_for(id);
        tracing::debug!(path = %path.display(), "reading quiz file");

        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                SourceError::NotFound
            } else {
                SourceError::Transport(format!("{}: {e}", path.display()))
            }
        })?;

        let record: QuizRecord = serde_json::from_str(&raw)
            .map_err(|e| SourceError::Serialization(format!("{}: {e}", path.display())))?;

        if record.id != id {
            return Err(SourceError::Serialization(format!(
                "{} holds quiz {} instead of {id}",
                path.display(),
                record.id
            )));
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIZ_7: &str = r#"{
        "id": 7,
        "title": "Planets",
        "questions": [
            {"text": "Largest planet?", "options": ["Mars", "Jupiter"], "answer": "Jupiter"}
        ]
    }"#;

    #[tokio::test]
    async fn reads_record_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("7.json"), QUIZ_7).unwrap();

        let source = JsonFileQuizSource::new(dir.path());
        let record = source.fetch_quiz(QuizId::new(7)).await.unwrap();

        assert_eq!(record.title, "Planets");
        assert_eq!(record.questions[0].answer, "Jupiter");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileQuizSource::new(dir.path());
        let err = source.fetch_quiz(QuizId::new(1)).await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound));
    }

    #[tokio::test]
    async fn malformed_json_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2.json"), "{ not json").unwrap();

        let source = JsonFileQuizSource::new(dir.path());
        let err = source.fetch_quiz(QuizId::new(2)).await.unwrap_err();
        assert!(matches!(err, SourceError::Serialization(_)));
    }

    #[tokio::test]
    async fn mismatched_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("8.json"), QUIZ_7).unwrap();

        let source = JsonFileQuizSource::new(dir.path());
        let err = source.fetch_quiz(QuizId::new(8)).await.unwrap_err();
        assert!(matches!(err, SourceError::Serialization(msg) if msg.contains("instead of 8")));
    }
}
