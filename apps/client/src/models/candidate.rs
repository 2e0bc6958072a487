//! Candidate records as emitted by the résumé extractor behind the query backend.
//!
//! Every field is optional. The extractor is an LLM, so the same section can arrive as an
//! object, a list, a comma separated string or a stringified JSON blob. Decoding is
//! therefore done by hand from `serde_json::Value` and never fails: anything that cannot
//! be understood is dropped and the section is simply absent.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One structured résumé. Serializes back out with the backend's upper-case keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CandidateRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub education: Vec<EducationEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(skip_serializing_if = "Skills::is_empty")]
    pub skills: Skills,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub certifications: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miscellaneous: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EducationEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ExperienceEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Skills {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub technical: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub soft_skills: Vec<String>,
}

/// Renderable sections of a record, in canonical display order after the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Contact,
    Education,
    Experience,
    Skills,
    Certifications,
    Projects,
    Miscellaneous,
}

impl CandidateRecord {
    /// Decodes a record from any JSON value. Non-objects become an empty record.
    pub fn from_value(value: &Value) -> Self {
        let value = decode_stringified(value);
        let Value::Object(obj) = value.as_ref() else {
            return Self::default();
        };

        let mut education = entries(field(obj, "EDUCATION"), EducationEntry::from_object);
        if education.is_empty() {
            // Older extractor output only carries education inside the raw metadata blob.
            if let Some(meta) = field(obj, "FULL_METADATA_JSON") {
                if let Value::Object(meta) = decode_stringified(meta).as_ref() {
                    education = entries(field(meta, "EDUCATION"), EducationEntry::from_object);
                }
            }
        }

        Self {
            name: text(field(obj, "NAME")),
            location: text(field(obj, "LOCATION")),
            contact: field(obj, "CONTACT").and_then(Contact::from_value),
            education,
            experience: entries(field(obj, "EXPERIENCE"), ExperienceEntry::from_object),
            skills: field(obj, "SKILLS").map(Skills::from_value).unwrap_or_default(),
            certifications: string_list(field(obj, "CERTIFICATIONS"), LIST_SEPARATORS),
            projects: string_list(field(obj, "PROJECTS"), LINE_SEPARATORS),
            miscellaneous: text(field(obj, "MISCELLANEOUS")),
        }
    }

    /// Whether `section` has anything worth rendering.
    pub fn has_section(&self, section: Section) -> bool {
        match section {
            Section::Contact => self.contact.as_ref().is_some_and(|c| !c.is_empty()),
            Section::Education => self.education.iter().any(|e| !e.is_empty()),
            Section::Experience => self.experience.iter().any(|e| !e.is_empty()),
            Section::Skills => !self.skills.is_empty(),
            Section::Certifications => !self.certifications.is_empty(),
            Section::Projects => !self.projects.is_empty(),
            Section::Miscellaneous => self.miscellaneous.is_some(),
        }
    }
}

impl From<Value> for CandidateRecord {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

impl Contact {
    fn from_value(value: &Value) -> Option<Self> {
        let value = decode_stringified(value);
        let Value::Object(obj) = value.as_ref() else {
            return None;
        };
        let contact = Self {
            email: text(field(obj, "EMAIL")),
            phone: text(field(obj, "PHONE")),
            linkedin: text(field(obj, "LINKEDIN")),
            github: text(field(obj, "GITHUB")),
        };
        (!contact.is_empty()).then_some(contact)
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none() && self.linkedin.is_none() && self.github.is_none()
    }
}

impl EducationEntry {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            degree: text(field(obj, "DEGREE")),
            institution: text(field(obj, "INSTITUTION")),
            location: text(field(obj, "LOCATION")),
            duration: text(field(obj, "DURATION")),
            percentage: text(field(obj, "PERCENTAGE")).or_else(|| text(field(obj, "GRADE"))),
            field_of_study: text(field(obj, "FIELD_OF_STUDY")),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.degree.is_none()
            && self.institution.is_none()
            && self.location.is_none()
            && self.duration.is_none()
            && self.percentage.is_none()
            && self.field_of_study.is_none()
    }
}

impl ExperienceEntry {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            title: text(field(obj, "TITLE")),
            company: text(field(obj, "COMPANY")),
            location: text(field(obj, "LOCATION")),
            duration: text(field(obj, "DURATION")),
            responsibilities: string_list(field(obj, "RESPONSIBILITIES"), LINE_SEPARATORS),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.company.is_none()
            && self.location.is_none()
            && self.duration.is_none()
            && self.responsibilities.is_empty()
    }
}

impl Skills {
    fn from_value(value: &Value) -> Self {
        let value = decode_stringified(value);
        match value.as_ref() {
            Value::Object(obj) => Self {
                technical: string_list(field(obj, "TECHNICAL"), LIST_SEPARATORS),
                languages: string_list(field(obj, "LANGUAGES"), LIST_SEPARATORS),
                tools: string_list(field(obj, "TOOLS"), LIST_SEPARATORS),
                soft_skills: string_list(field(obj, "SOFT_SKILLS"), LIST_SEPARATORS),
            },
            // A flat list carries no categories; it is almost always the technical stack.
            other => Self {
                technical: string_list(Some(other), LIST_SEPARATORS),
                ..Self::default()
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.technical.is_empty()
            && self.languages.is_empty()
            && self.tools.is_empty()
            && self.soft_skills.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient field decoding
// ────────────────────────────────────────────────────────────────────────────

const LIST_SEPARATORS: &[char] = &[',', '\n'];
const LINE_SEPARATORS: &[char] = &['\n'];

/// Looks a key up as written, then lower-cased.
fn field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).or_else(|| obj.get(&key.to_lowercase()))
}

/// Unwraps sections the extractor stored as a JSON string, including the
/// single-quoted pseudo-JSON Python reprs sometimes leak into metadata.
///
/// A blob that still does not parse decodes to an empty array or object of the
/// same shape, so its raw text never leaks into list fields.
fn decode_stringified(value: &Value) -> Cow<'_, Value> {
    if let Value::String(raw) = value {
        let trimmed = raw.trim();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(parsed) = serde_json::from_str::<Value>(trimmed) {
                return Cow::Owned(parsed);
            }
            if let Ok(parsed) = serde_json::from_str::<Value>(&trimmed.replace('\'', "\"")) {
                return Cow::Owned(parsed);
            }
            return Cow::Owned(if trimmed.starts_with('[') {
                Value::Array(Vec::new())
            } else {
                Value::Object(Map::new())
            });
        }
    }
    Cow::Borrowed(value)
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Label for a list item: plain scalars as-is, objects by their NAME or TITLE.
fn item_label(item: &Value) -> Option<String> {
    match item {
        Value::Object(obj) => text(field(obj, "NAME")).or_else(|| text(field(obj, "TITLE"))),
        other => text(Some(other)),
    }
}

fn string_list(value: Option<&Value>, separators: &[char]) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };
    match decode_stringified(value).as_ref() {
        Value::Array(items) => items.iter().filter_map(item_label).collect(),
        Value::String(s) => s
            .split(separators)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        other => item_label(other).into_iter().collect(),
    }
}

fn entries<T>(value: Option<&Value>, parse: fn(&Map<String, Value>) -> T) -> Vec<T> {
    let Some(value) = value else {
        return Vec::new();
    };
    match decode_stringified(value).as_ref() {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match decode_stringified(item).as_ref() {
                Value::Object(obj) => Some(parse(obj)),
                _ => None,
            })
            .collect(),
        Value::Object(obj) => vec![parse(obj)],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_record_decodes() {
        let record = CandidateRecord::from_value(&json!({
            "NAME": "Ada Lovelace",
            "LOCATION": "London",
            "CONTACT": {"EMAIL": "ada@example.com", "GITHUB": "ada"},
            "EDUCATION": [{"DEGREE": "BSc", "INSTITUTION": "UCL", "PERCENTAGE": 91.5}],
            "EXPERIENCE": [{
                "TITLE": "Engineer",
                "COMPANY": "Analytical Engines",
                "DURATION": "3 years",
                "RESPONSIBILITIES": ["Wrote programs", "Reviewed designs"]
            }],
            "SKILLS": {"TECHNICAL": ["Rust", "Python"], "SOFT_SKILLS": ["Mentoring"]},
            "CERTIFICATIONS": ["AWS SAA"],
            "PROJECTS": ["Difference engine"],
            "MISCELLANEOUS": "Enjoys poetry"
        }));

        assert_eq!(record.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(record.contact.as_ref().and_then(|c| c.github.as_deref()), Some("ada"));
        assert_eq!(record.education[0].percentage.as_deref(), Some("91.5"));
        assert_eq!(record.experience[0].responsibilities.len(), 2);
        assert_eq!(record.skills.technical, vec!["Rust", "Python"]);
        assert_eq!(record.skills.soft_skills, vec!["Mentoring"]);
        assert!(record.has_section(Section::Miscellaneous));
    }

    #[test]
    fn test_empty_object_has_no_sections() {
        let record = CandidateRecord::from_value(&json!({}));
        for section in [
            Section::Contact,
            Section::Education,
            Section::Experience,
            Section::Skills,
            Section::Certifications,
            Section::Projects,
            Section::Miscellaneous,
        ] {
            assert!(!record.has_section(section), "{section:?} should be absent");
        }
    }

    #[test]
    fn test_non_object_becomes_default() {
        assert_eq!(CandidateRecord::from_value(&json!(42)), CandidateRecord::default());
        assert_eq!(CandidateRecord::from_value(&json!(null)), CandidateRecord::default());
    }

    #[test]
    fn test_stringified_sections_are_decoded() {
        let record = CandidateRecord::from_value(&json!({
            "NAME": "Bob",
            "EDUCATION": "[{\"DEGREE\": \"MSc\"}]",
            "SKILLS": "{'TECHNICAL': ['Go', 'SQL']}"
        }));
        assert_eq!(record.education[0].degree.as_deref(), Some("MSc"));
        assert_eq!(record.skills.technical, vec!["Go", "SQL"]);
    }

    #[test]
    fn test_unrepairable_blob_decodes_empty() {
        let record = CandidateRecord::from_value(&json!({
            "NAME": "Gus",
            "SKILLS": "{'TECHNICAL': ['Go', 'SQL'], 'NOTE': \"O'Brien\"}",
            "CERTIFICATIONS": "['CKA', \"Dev's Cert\"]"
        }));
        assert!(record.skills.is_empty());
        assert!(record.certifications.is_empty());
        assert!(!record.has_section(Section::Skills));
        assert_eq!(record.name.as_deref(), Some("Gus"));
    }

    #[test]
    fn test_whole_record_may_be_stringified() {
        let record = CandidateRecord::from_value(&json!("{\"NAME\": \"Carol\"}"));
        assert_eq!(record.name.as_deref(), Some("Carol"));
    }

    #[test]
    fn test_lowercase_keys_are_accepted() {
        let record = CandidateRecord::from_value(&json!({"name": "Dan", "location": "Oslo"}));
        assert_eq!(record.name.as_deref(), Some("Dan"));
        assert_eq!(record.location.as_deref(), Some("Oslo"));
    }

    #[test]
    fn test_flat_skill_list_is_technical() {
        let record = CandidateRecord::from_value(&json!({"SKILLS": ["Rust", "Kafka"]}));
        assert_eq!(record.skills.technical, vec!["Rust", "Kafka"]);
        assert!(record.skills.tools.is_empty());
    }

    #[test]
    fn test_comma_separated_skills_are_split() {
        let record = CandidateRecord::from_value(&json!({"SKILLS": {"TOOLS": "Docker, Git ,  "}}));
        assert_eq!(record.skills.tools, vec!["Docker", "Git"]);
    }

    #[test]
    fn test_grade_falls_back_for_percentage() {
        let record = CandidateRecord::from_value(&json!({"EDUCATION": [{"DEGREE": "BA", "GRADE": "A"}]}));
        assert_eq!(record.education[0].percentage.as_deref(), Some("A"));
    }

    #[test]
    fn test_education_falls_back_to_metadata_blob() {
        let record = CandidateRecord::from_value(&json!({
            "NAME": "Eve",
            "FULL_METADATA_JSON": "{\"EDUCATION\": [{\"DEGREE\": \"PhD\"}]}"
        }));
        assert_eq!(record.education.len(), 1);
        assert_eq!(record.education[0].degree.as_deref(), Some("PhD"));
    }

    #[test]
    fn test_blank_strings_are_absent() {
        let record = CandidateRecord::from_value(&json!({"NAME": "   ", "CONTACT": {"EMAIL": ""}}));
        assert!(record.name.is_none());
        assert!(record.contact.is_none());
    }

    #[test]
    fn test_empty_entries_do_not_count_as_present() {
        let record = CandidateRecord::from_value(&json!({"EXPERIENCE": [{}, {"TITLE": ""}]}));
        assert_eq!(record.experience.len(), 2);
        assert!(!record.has_section(Section::Experience));
    }

    #[test]
    fn test_object_items_use_name_or_title() {
        let record = CandidateRecord::from_value(&json!({
            "PROJECTS": [{"NAME": "Compiler"}, {"TITLE": "Kernel"}, {"URL": "x"}]
        }));
        assert_eq!(record.projects, vec!["Compiler", "Kernel"]);
    }

    #[test]
    fn test_serializes_with_backend_keys() {
        let record = CandidateRecord::from_value(&json!({"NAME": "Fay", "SKILLS": {"SOFT_SKILLS": ["Empathy"]}}));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({"NAME": "Fay", "SKILLS": {"SOFT_SKILLS": ["Empathy"]}}));
        let back: CandidateRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
