//! View assembly: what the UI actually draws for an answer and for the comparison panel.

use serde::Serialize;

use crate::interpret::classifier::{classify_parts, RenderKind, RenderMode};
use crate::interpret::normalizer::{normalize, CandidateView};
use crate::interpret::sources::{format_source, FormattedSource};
use crate::models::candidate::CandidateRecord;
use crate::models::chat::ChatTurn;
use crate::session::selection::{ComparisonSelector, ViewMode, MAX_SELECTION};

/// Controls that only exist for multi-candidate answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Affordances {
    pub view_toggle: bool,
    pub selection_checkboxes: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerView {
    pub mode: RenderKind,
    pub body: String,
    pub candidates: Vec<CandidateView>,
    pub affordances: Affordances,
    /// `None` suppresses the sources panel.
    pub sources: Option<Vec<FormattedSource>>,
    pub is_error: bool,
}

/// Re-renders a stored assistant turn. User turns have no answer view.
pub fn render_turn(turn: &ChatTurn) -> Option<AnswerView> {
    if turn.is_user {
        return None;
    }
    Some(build_answer_view(
        &turn.text,
        turn.candidates(),
        &turn.sources,
        turn.is_error,
    ))
}

fn build_answer_view(
    answer: &str,
    records: &[CandidateRecord],
    sources: &[String],
    is_error: bool,
) -> AnswerView {
    let mode = classify_parts(answer, records);
    let kind = mode.kind();
    let candidates = match &mode {
        RenderMode::SingleCandidate(record) => vec![normalize(record, false)],
        RenderMode::MultiCandidate(records) => records.iter().map(|r| normalize(r, false)).collect(),
        RenderMode::PlainText(_) => Vec::new(),
    };
    let multi = kind == RenderKind::MultiCandidate;

    AnswerView {
        mode: kind,
        body: answer.to_string(),
        candidates,
        affordances: Affordances {
            view_toggle: multi,
            selection_checkboxes: multi,
        },
        sources: (!sources.is_empty())
            .then(|| sources.iter().map(|s| format_source(s)).collect()),
        is_error,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareColumn {
    pub index: usize,
    pub candidate: CandidateView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareView {
    pub view_mode: ViewMode,
    pub selected: Vec<usize>,
    pub capacity: usize,
    /// Present only in compare mode with a non-empty selection.
    pub panel: Option<Vec<CompareColumn>>,
}

pub fn render_comparison(
    view_mode: ViewMode,
    selection: &ComparisonSelector,
    candidates: &[CandidateRecord],
) -> CompareView {
    let panel = (view_mode == ViewMode::Compare && !selection.is_empty()).then(|| {
        selection
            .indices()
            .iter()
            .filter_map(|&index| {
                candidates.get(index).map(|record| CompareColumn {
                    index,
                    candidate: normalize(record, true),
                })
            })
            .collect()
    });

    CompareView {
        view_mode,
        selected: selection.indices().to_vec(),
        capacity: MAX_SELECTION,
        panel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpret::sources::LineToken;
    use crate::models::answer::AnswerPayload;

    fn answer_view(payload: AnswerPayload) -> AnswerView {
        render_turn(&ChatTurn::assistant(payload)).unwrap()
    }

    fn named(name: &str) -> CandidateRecord {
        CandidateRecord {
            name: Some(name.to_string()),
            ..CandidateRecord::default()
        }
    }

    #[test]
    fn test_plain_answer_without_sources() {
        let view = answer_view(AnswerPayload {
            answer: "X".to_string(),
            ..AnswerPayload::default()
        });
        assert_eq!(view.mode, RenderKind::PlainText);
        assert_eq!(view.body, "X");
        assert!(view.candidates.is_empty());
        assert!(view.sources.is_none());
    }

    #[test]
    fn test_single_candidate_has_no_multi_affordances() {
        let view = answer_view(AnswerPayload {
            answer: "One match".to_string(),
            structured_data: vec![named("Ada")],
            ..AnswerPayload::default()
        });
        assert_eq!(view.mode, RenderKind::SingleCandidate);
        assert_eq!(view.candidates[0].name, "Ada");
        assert!(!view.affordances.view_toggle);
        assert!(!view.affordances.selection_checkboxes);
    }

    #[test]
    fn test_multi_candidate_has_affordances_and_sources() {
        let view = answer_view(AnswerPayload {
            answer: "Two matches".to_string(),
            sources: vec!["name: Bob".to_string(), r#"{"a":1}"#.to_string()],
            structured_data: vec![named("Ada"), named("Bob")],
            error: None,
        });
        assert_eq!(view.mode, RenderKind::MultiCandidate);
        assert!(view.affordances.view_toggle && view.affordances.selection_checkboxes);
        let names: Vec<_> = view.candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Bob"]);

        let sources = view.sources.unwrap();
        let FormattedSource::KeyValue { lines } = &sources[0] else {
            panic!("expected key/value");
        };
        assert_eq!(
            lines[0].token,
            LineToken::Pair {
                key: "name".to_string(),
                value: "Bob".to_string()
            }
        );
        assert!(matches!(sources[1], FormattedSource::Json { .. }));
    }

    #[test]
    fn test_user_turn_has_no_view() {
        assert!(render_turn(&ChatTurn::user("hi")).is_none());
    }

    #[test]
    fn test_error_turn_renders_as_plain_error() {
        let view = render_turn(&ChatTurn::error("boom")).unwrap();
        assert_eq!(view.mode, RenderKind::PlainText);
        assert_eq!(view.body, "boom");
        assert!(view.is_error);
    }

    #[test]
    fn test_no_panel_in_list_mode_or_empty_selection() {
        let candidates = vec![named("A"), named("B")];
        let mut selection = ComparisonSelector::default();
        let view = render_comparison(ViewMode::Compare, &selection, &candidates);
        assert!(view.panel.is_none());

        selection.toggle(1);
        let view = render_comparison(ViewMode::List, &selection, &candidates);
        assert!(view.panel.is_none());
        assert_eq!(view.selected, vec![1]);
    }

    #[test]
    fn test_panel_uses_compact_views_in_click_order() {
        let candidates = vec![named("A"), named("B"), named("C")];
        let mut selection = ComparisonSelector::default();
        selection.toggle(2);
        selection.toggle(0);
        let view = render_comparison(ViewMode::Compare, &selection, &candidates);
        let panel = view.panel.unwrap();
        let indices: Vec<_> = panel.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![2, 0]);
        assert_eq!(panel[0].candidate.name, "C");
        assert_eq!(panel[0].candidate.total_experience_years, Some(0));
    }
}
