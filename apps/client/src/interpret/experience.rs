//! Best-effort years-of-experience annotation.
//!
//! Durations are free text written by an LLM ("3 years", "2 yr", "Jan 2019 - Present").
//! Only the first integer directly followed by a year unit counts; everything else
//! contributes zero. This never fails and is not meant to be exact.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::candidate::ExperienceEntry;

static YEARS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)(?:\.\d+)?\s*\+?\s*(?:years?|yrs?|y)\b")
        .expect("years pattern is a valid regex")
});

/// Whole years mentioned in a single duration string, or 0.
pub fn years_in_duration(duration: &str) -> u32 {
    YEARS_PATTERN
        .captures(duration)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(0)
}

/// Sums the recognisable years across every experience entry.
pub fn annotate_experience_years(entries: &[ExperienceEntry]) -> u32 {
    entries
        .iter()
        .filter_map(|e| e.duration.as_deref())
        .map(years_in_duration)
        .fold(0u32, u32::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(duration: Option<&str>) -> ExperienceEntry {
        ExperienceEntry {
            duration: duration.map(String::from),
            ..ExperienceEntry::default()
        }
    }

    #[test]
    fn test_years_long_form() {
        assert_eq!(years_in_duration("3 years"), 3);
        assert_eq!(years_in_duration("1 Year"), 1);
    }

    #[test]
    fn test_years_short_forms() {
        assert_eq!(years_in_duration("2 yr"), 2);
        assert_eq!(years_in_duration("4 YRS"), 4);
        assert_eq!(years_in_duration("5y"), 5);
    }

    #[test]
    fn test_plus_and_decimal_forms() {
        assert_eq!(years_in_duration("5+ years"), 5);
        assert_eq!(years_in_duration("2.5 years"), 2);
    }

    #[test]
    fn test_number_not_followed_by_unit_is_ignored() {
        assert_eq!(years_in_duration("Jan 2019 - Dec 2021"), 0);
        assert_eq!(years_in_duration("6 months"), 0);
        assert_eq!(years_in_duration("3 yoe"), 0);
    }

    #[test]
    fn test_unit_found_after_other_numbers() {
        assert_eq!(years_in_duration("2018-2021 (3 years)"), 3);
    }

    #[test]
    fn test_garbage_never_fails() {
        assert_eq!(years_in_duration(""), 0);
        assert_eq!(years_in_duration("years"), 0);
        assert_eq!(years_in_duration("99999999999999999999 years"), 0);
    }

    #[test]
    fn test_sum_across_entries() {
        let entries = vec![entry(Some("3 years")), entry(Some("2 yr")), entry(None), entry(Some("Present"))];
        assert_eq!(annotate_experience_years(&entries), 5);
    }
}
