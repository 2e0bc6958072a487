//! Source snippet formatter.
//!
//! Snippets are free-form model output, so this is cosmetic only:
//! 1. valid JSON → 2-space pretty print (key order kept);
//! 2. anything containing `:` → pseudo key/value lines tagged for styling;
//! 3. everything else verbatim.

use serde::Serialize;
use serde_json::Value;

const STRUCTURAL: &[char] = &['{', '}', '[', ']'];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum FormattedSource {
    Json { text: String },
    KeyValue { lines: Vec<SourceLine> },
    Plain { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceLine {
    pub indent: usize,
    #[serde(flatten)]
    pub token: LineToken,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineToken {
    Structural { text: String },
    Pair { key: String, value: String },
    Text { text: String },
}

pub fn format_source(raw: &str) -> FormattedSource {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        if let Ok(text) = serde_json::to_string_pretty(&value) {
            return FormattedSource::Json { text };
        }
    }

    if raw.contains(':') {
        return FormattedSource::KeyValue {
            lines: raw.lines().map(tokenize_line).collect(),
        };
    }

    FormattedSource::Plain {
        text: raw.to_string(),
    }
}

fn tokenize_line(line: &str) -> SourceLine {
    let content = line.trim_start();
    let leading = line.chars().count() - content.chars().count();
    let closing = content.trim_end();

    let token = if closing.ends_with(STRUCTURAL) {
        LineToken::Structural {
            text: closing.to_string(),
        }
    } else if let Some((key, value)) = content.split_once(':') {
        LineToken::Pair {
            key: key.trim().to_string(),
            value: value.trim().to_string(),
        }
    } else {
        LineToken::Text {
            text: content.to_string(),
        }
    };

    SourceLine {
        indent: leading / 2,
        token,
    }
}

impl FormattedSource {
    /// Flattens any variant back into display text.
    pub fn to_display_string(&self) -> String {
        match self {
            FormattedSource::Json { text } | FormattedSource::Plain { text } => text.clone(),
            FormattedSource::KeyValue { lines } => lines
                .iter()
                .map(|line| {
                    let pad = "  ".repeat(line.indent);
                    match &line.token {
                        LineToken::Structural { text } | LineToken::Text { text } => {
                            format!("{pad}{text}")
                        }
                        LineToken::Pair { key, value } if value.is_empty() => {
                            format!("{pad}{key}:")
                        }
                        LineToken::Pair { key, value } => format!("{pad}{key}: {value}"),
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}
