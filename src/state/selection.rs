use std::collections::HashSet;
use std::ops::RangeInclusive;

use crate::state::data_model::{RowId, RowsState};

/// Set of selected row ids. Only the functions in this module mutate it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionState {
    selected: HashSet<RowId>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionChange {
    pub added: Vec<RowId>,
    pub removed: Vec<RowId>,
}

impl SelectionChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    fn sorted(mut self) -> Self {
        self.added.sort();
        self.removed.sort();
        self
    }
}

impl SelectionState {
    pub fn contains(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids in dataset order.
    pub fn ordered_ids(&self, rows: &RowsState) -> Vec<RowId> {
        rows.rows
            .iter()
            .filter(|row| self.selected.contains(&row.id))
            .map(|row| row.id.clone())
            .collect()
    }

    fn insert(&mut self, id: &RowId, change: &mut SelectionChange) {
        if self.selected.insert(id.clone()) {
            change.added.push(id.clone());
        }
    }

    fn remove(&mut self, id: &RowId, change: &mut SelectionChange) {
        if self.selected.remove(id) {
            change.removed.push(id.clone());
        }
    }

    fn clear_except(&mut self, keep: Option<&RowId>, change: &mut SelectionChange) {
        let dropped: Vec<RowId> = self
            .selected
            .iter()
            .filter(|id| Some(*id) != keep)
            .cloned()
            .collect();
        for id in dropped {
            self.remove(&id, change);
        }
    }
}

/// Selects or deselects a single row.
///
/// Without `allow_multiple` every other row is deselected first. When
/// `is_selected` is not given, the row is selected, or toggled if
/// `allow_multiple` is set.
pub fn select_row(
    state: &mut SelectionState,
    id: &RowId,
    allow_multiple: bool,
    is_selected: Option<bool>,
) -> SelectionChange {
    let mut change = SelectionChange::default();
    let target = is_selected.unwrap_or(if allow_multiple {
        !state.contains(id)
    } else {
        true
    });

    if !allow_multiple {
        state.clear_except(Some(id), &mut change);
    }
    if target {
        state.insert(id, &mut change);
    } else {
        state.remove(id, &mut change);
    }
    change.sorted()
}

/// Applies `is_selected` to every id. With multiple selection disabled only
/// the last id is kept and the rest of the selection is always reset.
pub fn select_rows(
    state: &mut SelectionState,
    ids: &[RowId],
    is_selected: bool,
    reset_selection: bool,
    enable_multiple_selection: bool,
) -> SelectionChange {
    let mut change = SelectionChange::default();
    let ids: &[RowId] = if enable_multiple_selection {
        ids
    } else {
        ids.last().map(std::slice::from_ref).unwrap_or(&[])
    };

    if reset_selection || !enable_multiple_selection {
        let keep: HashSet<&RowId> = if is_selected {
            ids.iter().collect()
        } else {
            HashSet::new()
        };
        let dropped: Vec<RowId> = state
            .selected
            .iter()
            .filter(|id| !keep.contains(id))
            .cloned()
            .collect();
        for id in dropped {
            state.remove(&id, &mut change);
        }
    }

    for id in ids {
        if is_selected {
            state.insert(id, &mut change);
        } else {
            state.remove(id, &mut change);
        }
    }
    change.sorted()
}

/// Drops ids that are no longer part of the dataset.
pub fn retain_existing(state: &mut SelectionState, rows: &RowsState) -> SelectionChange {
    let mut change = SelectionChange::default();
    let stale: Vec<RowId> = state
        .selected
        .iter()
        .filter(|id| !rows.contains(id))
        .cloned()
        .collect();
    for id in stale {
        state.remove(&id, &mut change);
    }
    change.sorted()
}

/// Row index a shift-range selection starts from.
///
/// Picks the selected index *farthest* from `current_row_index`; the first
/// one wins on ties. With nothing selected the range starts at the current row.
pub fn selection_anchor(current_row_index: usize, selected_indexes: &[usize]) -> usize {
    let mut anchor = None;
    let mut best_distance = 0;
    for &idx in selected_indexes {
        let distance = current_row_index.abs_diff(idx);
        if anchor.is_none() || distance > best_distance {
            anchor = Some(idx);
            best_distance = distance;
        }
    }
    anchor.unwrap_or(current_row_index)
}

pub fn range_between(a: usize, b: usize) -> RangeInclusive<usize> {
    a.min(b)..=a.max(b)
}
