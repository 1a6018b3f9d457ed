use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::QuizId;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::source::{QuizRecord, QuizSource, SourceError};

#[derive(Clone, Debug)]
pub struct HttpSourceConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl HttpSourceConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: Duration::from_secs(10),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Fetches quizzes from the content service's `GET /quizzes/{id}/view` endpoint.
#[derive(Clone)]
pub struct HttpQuizSource {
    client: Client,
    config: HttpSourceConfig,
}

impl HttpQuizSource {
    /// # Errors
    ///
    /// Returns `SourceError::Transport` if the HTTP client cannot be built.
    pub fn new(config: HttpSourceConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn view_url(&self, id: QuizId) -> String {
        format!(
            "{}/quizzes/{id}/view",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl QuizSource for HttpQuizSource {
    async fn fetch_quiz(&self, id: QuizId) -> Result<QuizRecord, SourceError> {
        let url = self.view_url(id);
        tracing::debug!(%url, "fetching quiz");

        let mut request = self.client.get(&url);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        decode_response(id, status, &body)
    }
}

/// Response envelope used by every content service endpoint.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<QuizRecord>,
}

fn decode_response(
    id: QuizId,
    status: StatusCode,
    body: &str,
) -> Result<QuizRecord, SourceError> {
    if status == StatusCode::NOT_FOUND {
        return Err(SourceError::NotFound);
    }
    if !status.is_success() {
        return Err(SourceError::Transport(format!(
            "content service returned {status}"
        )));
    }

    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| SourceError::Serialization(e.to_string()))?;

    if envelope.success == Some(false) {
        let message = envelope
            .message
            .unwrap_or_else(|| "request was not successful".into());
        return Err(SourceError::Transport(message));
    }

    let record = envelope.data.ok_or(SourceError::NotFound)?;
    if record.id != id {
        return Err(SourceError::Serialization(format!(
            "content service returned quiz {} instead of {id}",
            record.id
        )));
    }
    Ok(record)
}
