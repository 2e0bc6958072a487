use serde::{Deserialize, Serialize};

/// Number of candidates the comparison panel can show side by side.
pub const MAX_SELECTION: usize = 3;

/// List of candidate cards, or the side-by-side comparison panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    List,
    Compare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Selection already full; nothing changed.
    Rejected,
}

/// Bounded multi-select over candidate indices, kept in click order.
///
/// Indices point into the current candidate list. Full selections reject new entries
/// instead of evicting the oldest one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonSelector {
    selected: Vec<usize>,
}

impl ComparisonSelector {
    pub fn toggle(&mut self, index: usize) -> ToggleOutcome {
        if let Some(pos) = self.selected.iter().position(|&i| i == index) {
            self.selected.remove(pos);
            return ToggleOutcome::Removed;
        }
        if self.is_full() {
            return ToggleOutcome::Rejected;
        }
        self.selected.push(index);
        ToggleOutcome::Added
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn indices(&self) -> &[usize] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.selected.len() >= MAX_SELECTION
    }
}
