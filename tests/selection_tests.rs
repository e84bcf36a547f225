use datagrid::state::data_model::{self, Record, Row, RowId};
use datagrid::state::selection::{self, SelectionState};

fn ids(values: &[&str]) -> Vec<RowId> {
    values.iter().map(|v| RowId::from(*v)).collect()
}

fn selected(state: &SelectionState, candidates: &[&str]) -> Vec<String> {
    candidates
        .iter()
        .filter(|id| state.contains(&RowId::from(**id)))
        .map(|id| id.to_string())
        .collect()
}

#[test]
fn test_single_select_replaces_selection() {
    let mut state = SelectionState::default();
    selection::select_row(&mut state, &RowId::from("a"), false, None);
    let change = selection::select_row(&mut state, &RowId::from("b"), false, None);

    assert_eq!(selected(&state, &["a", "b"]), vec!["b"]);
    assert_eq!(change.added, ids(&["b"]));
    assert_eq!(change.removed, ids(&["a"]));
}

#[test]
fn test_multiple_select_toggles() {
    let mut state = SelectionState::default();
    selection::select_row(&mut state, &RowId::from("a"), true, None);
    selection::select_row(&mut state, &RowId::from("b"), true, None);
    assert_eq!(state.len(), 2);

    let change = selection::select_row(&mut state, &RowId::from("a"), true, None);
    assert_eq!(selected(&state, &["a", "b"]), vec!["b"]);
    assert_eq!(change.removed, ids(&["a"]));
}

#[test]
fn test_explicit_flag_wins_over_toggle() {
    let mut state = SelectionState::default();
    selection::select_row(&mut state, &RowId::from("a"), true, Some(true));
    let change = selection::select_row(&mut state, &RowId::from("a"), true, Some(true));
    assert!(change.is_empty());
    assert!(state.contains(&RowId::from("a")));
}

#[test]
fn test_select_rows_with_reset() {
    let mut state = SelectionState::default();
    selection::select_rows(&mut state, &ids(&["a", "b"]), true, false, true);
    let change = selection::select_rows(&mut state, &ids(&["b", "c"]), true, true, true);

    assert_eq!(selected(&state, &["a", "b", "c"]), vec!["b", "c"]);
    assert_eq!(change.added, ids(&["c"]));
    assert_eq!(change.removed, ids(&["a"]));
}

#[test]
fn test_select_rows_deselect() {
    let mut state = SelectionState::default();
    selection::select_rows(&mut state, &ids(&["a", "b", "c"]), true, false, true);
    selection::select_rows(&mut state, &ids(&["a", "c"]), false, false, true);
    assert_eq!(selected(&state, &["a", "b", "c"]), vec!["b"]);
}

#[test]
fn test_select_rows_without_multiple_selection_keeps_last() {
    let mut state = SelectionState::default();
    selection::select_rows(&mut state, &ids(&["x"]), true, false, false);
    selection::select_rows(&mut state, &ids(&["a", "b", "c"]), true, false, false);
    assert_eq!(selected(&state, &["x", "a", "b", "c"]), vec!["c"]);
}

#[test]
fn test_retain_existing_drops_removed_rows() {
    let rows = data_model::normalize_rows(vec![
        Row::new("a", Record::new()),
        Row::new("c", Record::new()),
    ])
    .unwrap();

    let mut state = SelectionState::default();
    selection::select_rows(&mut state, &ids(&["a", "b", "c"]), true, false, true);
    let change = selection::retain_existing(&mut state, &rows);

    assert_eq!(change.removed, ids(&["b"]));
    assert_eq!(state.ordered_ids(&rows), ids(&["a", "c"]));
}

#[test]
fn test_anchor_is_farthest_selected_row() {
    // The farthest selected index wins, not the nearest one.
    assert_eq!(selection::selection_anchor(5, &[4, 9, 0]), 0);
    assert_eq!(selection::selection_anchor(5, &[4, 6]), 4);
    assert_eq!(selection::selection_anchor(5, &[7, 3, 9]), 9);
}

#[test]
fn test_anchor_without_selection_is_current_row() {
    assert_eq!(selection::selection_anchor(3, &[]), 3);
}

#[test]
fn test_range_between_is_inclusive_either_way() {
    assert_eq!(selection::range_between(2, 5).collect::<Vec<_>>(), vec![2, 3, 4, 5]);
    assert_eq!(selection::range_between(5, 2).collect::<Vec<_>>(), vec![2, 3, 4, 5]);
    assert_eq!(selection::range_between(4, 4).collect::<Vec<_>>(), vec![4]);
}
