//! Candidate normalizer. Turns a loosely-shaped `CandidateRecord` into a render-ready view.
//!
//! Two flavours share one code path:
//! - full: every present section, nothing truncated;
//! - compact: used by the comparison panel, lists truncated with a `+N more` banner and
//!   a derived `total_experience_years`.
//!
//! Section omission always goes through `CandidateRecord::has_section`.

use serde::Serialize;

use crate::interpret::experience::annotate_experience_years;
use crate::models::candidate::{CandidateRecord, EducationEntry, ExperienceEntry, Section};

pub const UNKNOWN_NAME: &str = "Unknown Candidate";
pub const UNKNOWN_NAME_COMPACT: &str = "Unknown";

// ────────────────────────────────────────────────────────────────────────────
// View models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateView {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contact: Vec<ContactLine>,
    pub sections: Vec<SectionView>,
    /// Only derived for compact views.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_experience_years: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactLine {
    pub label: &'static str,
    pub value: String,
}

/// An ordered list, possibly cut short.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub omitted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub more_label: Option<String>,
}

impl<T> Listing<T> {
    fn new(mut items: Vec<T>, limit: Option<usize>) -> Self {
        let omitted = match limit {
            Some(limit) if items.len() > limit => {
                let omitted = items.len() - limit;
                items.truncate(limit);
                omitted
            }
            _ => 0,
        };
        Self {
            items,
            omitted,
            more_label: (omitted > 0).then(|| format!("+{omitted} more")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum SectionView {
    Education(Listing<EducationLine>),
    Experience(Listing<ExperienceLine>),
    Skills { groups: Vec<SkillGroup> },
    Certifications(Listing<String>),
    Projects(Listing<String>),
    Miscellaneous { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub responsibilities: Listing<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillGroup {
    pub category: &'static str,
    pub label: &'static str,
    pub skills: Listing<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Limits
// ────────────────────────────────────────────────────────────────────────────

/// Per-list truncation. `None` keeps everything.
#[derive(Debug, Clone, Copy)]
struct Limits {
    education: Option<usize>,
    experience: Option<usize>,
    responsibilities: Option<usize>,
    technical: Option<usize>,
    languages: Option<usize>,
    tools: Option<usize>,
    soft_skills: Option<usize>,
    certifications: Option<usize>,
    projects: Option<usize>,
    miscellaneous: bool,
}

const FULL: Limits = Limits {
    education: None,
    experience: None,
    responsibilities: None,
    technical: None,
    languages: None,
    tools: None,
    soft_skills: None,
    certifications: None,
    projects: None,
    miscellaneous: true,
};

const COMPACT: Limits = Limits {
    education: Some(2),
    experience: Some(2),
    responsibilities: Some(2),
    technical: Some(8),
    languages: Some(5),
    tools: Some(6),
    soft_skills: Some(5),
    certifications: Some(3),
    projects: Some(3),
    miscellaneous: false,
};

// ────────────────────────────────────────────────────────────────────────────
// Normalization
// ────────────────────────────────────────────────────────────────────────────

/// Builds the view for one record. Pure: same input and flag give the same output.
pub fn normalize(record: &CandidateRecord, compact: bool) -> CandidateView {
    let limits = if compact { COMPACT } else { FULL };

    let placeholder = if compact {
        UNKNOWN_NAME_COMPACT
    } else {
        UNKNOWN_NAME
    };
    let name = record
        .name
        .clone()
        .unwrap_or_else(|| placeholder.to_string());

    let mut sections = Vec::new();

    if record.has_section(Section::Education) {
        let lines = record
            .education
            .iter()
            .filter(|e| !e.is_empty())
            .map(education_line)
            .collect();
        sections.push(SectionView::Education(Listing::new(lines, limits.education)));
    }

    if record.has_section(Section::Experience) {
        let lines = record
            .experience
            .iter()
            .filter(|e| !e.is_empty())
            .map(|e| experience_line(e, limits.responsibilities))
            .collect();
        sections.push(SectionView::Experience(Listing::new(lines, limits.experience)));
    }

    if record.has_section(Section::Skills) {
        let skills = &record.skills;
        let groups = [
            ("technical", "Technical", &skills.technical, limits.technical),
            ("languages", "Languages", &skills.languages, limits.languages),
            ("tools", "Tools", &skills.tools, limits.tools),
            ("soft_skills", "Soft skills", &skills.soft_skills, limits.soft_skills),
        ]
        .into_iter()
        .filter(|(_, _, items, _)| !items.is_empty())
        .map(|(category, label, items, limit)| SkillGroup {
            category,
            label,
            skills: Listing::new(items.clone(), limit),
        })
        .collect();
        sections.push(SectionView::Skills { groups });
    }

    if record.has_section(Section::Certifications) {
        sections.push(SectionView::Certifications(Listing::new(
            record.certifications.clone(),
            limits.certifications,
        )));
    }

    if record.has_section(Section::Projects) {
        sections.push(SectionView::Projects(Listing::new(
            record.projects.clone(),
            limits.projects,
        )));
    }

    if limits.miscellaneous && record.has_section(Section::Miscellaneous) {
        if let Some(text) = &record.miscellaneous {
            sections.push(SectionView::Miscellaneous { text: text.clone() });
        }
    }

    CandidateView {
        name,
        location: record.location.clone(),
        contact: contact_lines(record),
        sections,
        total_experience_years: compact.then(|| annotate_experience_years(&record.experience)),
    }
}

fn contact_lines(record: &CandidateRecord) -> Vec<ContactLine> {
    let Some(contact) = record.contact.as_ref().filter(|_| record.has_section(Section::Contact))
    else {
        return Vec::new();
    };
    [
        ("Email", &contact.email),
        ("Phone", &contact.phone),
        ("LinkedIn", &contact.linkedin),
        ("GitHub", &contact.github),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        value.as_ref().map(|v| ContactLine {
            label,
            value: v.clone(),
        })
    })
    .collect()
}

fn education_line(entry: &EducationEntry) -> EducationLine {
    EducationLine {
        degree: entry.degree.clone(),
        field_of_study: entry.field_of_study.clone(),
        institution: entry.institution.clone(),
        location: entry.location.clone(),
        duration: entry.duration.clone(),
        percentage: entry.percentage.clone(),
    }
}

fn experience_line(entry: &ExperienceEntry, responsibilities: Option<usize>) -> ExperienceLine {
    ExperienceLine {
        title: entry.title.clone(),
        company: entry.company.clone(),
        location: entry.location.clone(),
        duration: entry.duration.clone(),
        responsibilities: Listing::new(entry.responsibilities.clone(), responsibilities),
    }
}
