use serde::Serialize;

use crate::models::answer::AnswerPayload;
use crate::models::candidate::CandidateRecord;

/// Display strategy for one answer.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderMode {
    SingleCandidate(CandidateRecord),
    MultiCandidate(Vec<CandidateRecord>),
    PlainText(String),
}

/// Payload-free tag of a [`RenderMode`], used in view models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderKind {
    SingleCandidate,
    MultiCandidate,
    PlainText,
}

impl RenderMode {
    pub fn kind(&self) -> RenderKind {
        match self {
            RenderMode::SingleCandidate(_) => RenderKind::SingleCandidate,
            RenderMode::MultiCandidate(_) => RenderKind::MultiCandidate,
            RenderMode::PlainText(_) => RenderKind::PlainText,
        }
    }
}

/// Classifies a backend answer. Sources are rendered separately in every mode.
pub fn classify(payload: &AnswerPayload) -> RenderMode {
    classify_parts(&payload.answer, &payload.structured_data)
}

/// Same decision for an answer already split into text and records (e.g. a stored turn).
pub fn classify_parts(answer: &str, records: &[CandidateRecord]) -> RenderMode {
    match records {
        [] => RenderMode::PlainText(answer.to_string()),
        [only] => RenderMode::SingleCandidate(only.clone()),
        many => RenderMode::MultiCandidate(many.to_vec()),
    }
}
