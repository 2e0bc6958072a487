use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::candidate::CandidateRecord;

/// Request body sent to the query backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

/// Response body of the query backend.
///
/// All fields default when absent, and a `structured_data` that is not an array is
/// treated as empty so the answer falls back to plain text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerPayload {
    #[serde(default, deserialize_with = "lenient_text")]
    pub answer: String,
    /// Raw snippets in backend relevance order.
    #[serde(default, deserialize_with = "lenient_sources")]
    pub sources: Vec<String>,
    #[serde(default, deserialize_with = "lenient_records")]
    pub structured_data: Vec<CandidateRecord>,
    #[serde(
        default,
        deserialize_with = "lenient_error",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
}

impl AnswerPayload {
    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_sources<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(s) => vec![s],
        _ => Vec::new(),
    })
}

fn lenient_records<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<CandidateRecord>, D::Error> {
    let value = match Value::deserialize(deserializer)? {
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::Null),
        other => other,
    };
    Ok(match value {
        Value::Array(items) => items.iter().map(CandidateRecord::from_value).collect(),
        _ => Vec::new(),
    })
}

fn lenient_error<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}
