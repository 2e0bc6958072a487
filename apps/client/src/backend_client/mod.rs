//! Query backend client: the single point of entry for question/answer calls.
//!
//! No other module talks to the query backend directly. Failures are never retried:
//! the session turns every error into a terminal assistant turn.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::answer::{AnswerPayload, QueryRequest};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Query backend error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend answered but flagged the question as failed. Shown to the user verbatim.
    #[error("{0}")]
    Reported(String),

    /// The call never produced a result (the task running it crashed).
    #[error("Question aborted: {0}")]
    Aborted(String),
}

/// Answers a question against the résumé corpus.
///
/// Carried in `AppState` as `Arc<dyn QueryBackend>` so tests can swap in a fake.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn ask(&self, question: &str, token: &str) -> Result<AnswerPayload, BackendError>;
}

/// Error bodies the backend is known to produce on non-success statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "detail")]
    error: String,
}

#[derive(Clone)]
pub struct HttpQueryBackend {
    client: Client,
    url: String,
}

impl HttpQueryBackend {
    pub fn new(url: String, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url,
        })
    }
}

#[async_trait]
impl QueryBackend for HttpQueryBackend {
    async fn ask(&self, question: &str, token: &str) -> Result<AnswerPayload, BackendError> {
        let mut request = self.client.post(&self.url).json(&QueryRequest {
            question: question.to_string(),
        });
        if !token.is_empty() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Query backend returned {}: {}", status, body);
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let mut payload: AnswerPayload = serde_json::from_str(&body)?;
        if let Some(message) = payload.error.take() {
            return Err(BackendError::Reported(message));
        }

        debug!(
            "Query backend answered: has_sources={}, candidates={}",
            payload.has_sources(),
            payload.structured_data.len()
        );

        Ok(payload)
    }
}
