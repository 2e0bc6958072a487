use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::answer::AnswerPayload;
use crate::models::candidate::CandidateRecord;

/// One message in the transcript. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: Uuid,
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<CandidateRecord>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ChatTurn {
    pub fn user(text: &str) -> Self {
        Self::new(text.to_string(), true)
    }

    /// Assistant turn carrying a resolved answer.
    pub fn assistant(payload: AnswerPayload) -> Self {
        let mut turn = Self::new(payload.answer, false);
        turn.candidates = (!payload.structured_data.is_empty()).then_some(payload.structured_data);
        turn.sources = payload.sources;
        turn
    }

    /// Assistant turn standing in for a failed question.
    pub fn error(message: impl Into<String>) -> Self {
        let mut turn = Self::new(message.into(), false);
        turn.is_error = true;
        turn
    }

    pub fn candidates(&self) -> &[CandidateRecord] {
        self.candidates.as_deref().unwrap_or_default()
    }

    fn new(text: String, is_user: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            is_user,
            timestamp: Utc::now(),
            candidates: None,
            sources: Vec::new(),
            is_error: false,
        }
    }
}
