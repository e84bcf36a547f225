use std::cell::Cell;
use std::rc::Rc;

use serde_json::{json, Value};

use datagrid::state::data_model::{self, ColDef, Record, Row, RowId, MIN_COLUMN_WIDTH};
use datagrid::state::events::{EventBus, GridEventKind};
use datagrid::state::options::{self, GridOptions, GridOptionsProp, LogLevel, PaginationMode};
use datagrid::state::pagination::PaginationAction;
use datagrid::state::selectors::{self, GridSelectors, Memo};
use datagrid::state::sorting::SortItem;
use datagrid::state::store::{self, ActionOutcome, GridAction, GridState, GridStore};
use datagrid::GridError;

fn record(pairs: &[(&str, Value)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn numbered_rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|idx| Row::new(idx, record(&[("n", json!(count - idx))])))
        .collect()
}

#[test]
fn test_row_id_forms() {
    assert_eq!(RowId::from(7usize).as_str(), "7");
    assert_eq!(RowId::from_value(&json!(-3)), Some(RowId::from(-3i64)));
    assert_eq!(RowId::from_value(&json!("abc")), Some(RowId::from("abc")));
    assert_eq!(RowId::from_value(&json!({"nested": true})), None);
}

#[test]
fn test_rows_from_records_uses_id_field_or_position() {
    let rows = data_model::rows_from_records(vec![
        record(&[("id", json!(10)), ("name", json!("Alice"))]),
        record(&[("name", json!("Bob"))]),
    ])
    .unwrap();
    assert_eq!(rows[0].id, RowId::from("10"));
    assert_eq!(rows[1].id, RowId::from(1usize));
}

#[test]
fn test_duplicate_ids_are_rejected() {
    let err = data_model::rows_from_records(vec![
        record(&[("id", json!("x"))]),
        record(&[("id", json!("x"))]),
    ])
    .unwrap_err();
    assert!(matches!(err, GridError::DuplicateRowId(ref id) if id.as_str() == "x"));

    let err = data_model::normalize_rows(vec![
        Row::new("a", Record::new()),
        Row::new("a", Record::new()),
    ])
    .unwrap_err();
    assert!(matches!(err, GridError::DuplicateRowId(_)));
}

#[test]
fn test_normalize_rows_builds_lookup() {
    let rows = data_model::normalize_rows(numbered_rows(3)).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows.get(&RowId::from(2usize)).unwrap().get("n"), Some(&json!(1)));
    assert!(!rows.contains(&RowId::from("missing")));
}

#[test]
fn test_normalize_columns() {
    let columns = data_model::normalize_columns(vec![
        ColDef::new("a"),
        ColDef {
            width: 10.0,
            ..ColDef::new("b")
        },
    ])
    .unwrap();
    assert_eq!(columns[1].width, MIN_COLUMN_WIDTH);

    let err = data_model::normalize_columns(vec![ColDef::new("a"), ColDef::new("a")]).unwrap_err();
    assert!(matches!(err, GridError::DuplicateField(ref field) if field == "a"));
}

#[test]
fn test_derive_columns_puts_id_first() {
    let rows = data_model::rows_from_records(vec![
        record(&[("name", json!("A")), ("id", json!(1))]),
        record(&[("age", json!(3)), ("id", json!(2))]),
    ])
    .unwrap();
    let fields: Vec<String> = data_model::derive_columns(&rows)
        .into_iter()
        .map(|col| col.field)
        .collect();
    assert_eq!(fields, vec!["id", "age", "name"]);
}

#[test]
fn test_column_value_pipeline() {
    let row = Row::new("r", record(&[("price", json!(2.5)), ("qty", json!(4))]));
    let total = ColDef::new("total")
        .with_header_name("Total")
        .with_value_getter(|row| {
            let price = row.get("price").and_then(Value::as_f64).unwrap_or(0.0);
            let qty = row.get("qty").and_then(Value::as_f64).unwrap_or(0.0);
            json!(price * qty)
        })
        .with_value_formatter(|value| format!("${}", value.as_f64().unwrap_or(0.0)));

    assert_eq!(total.header_label(), "Total");
    assert_eq!(total.cell_value(&row), json!(10.0));
    assert_eq!(total.formatted_value(&row), "$10");
    assert_eq!(ColDef::new("missing").formatted_value(&row), "");
    assert_eq!(ColDef::new("qty").formatted_value(&row), "4");
}

#[test]
fn test_options_defaults_and_merge() {
    let defaults = GridOptions::default();
    assert_eq!(defaults.row_height, 52.0);
    assert_eq!(defaults.header_height, 56.0);
    assert!(defaults.enable_multiple_selection);
    assert_eq!(defaults.effective_page_size(9), 0);

    let merged = options::merge_options(&GridOptionsProp {
        pagination: Some(true),
        row_height: Some(-1.0),
        pagination_auto_page_size: Some(true),
        ..GridOptionsProp::default()
    });
    assert!(merged.pagination);
    assert_eq!(merged.row_height, 52.0);
    assert_eq!(merged.effective_page_size(9), 9);
}

#[test]
fn test_options_from_json() {
    let options = options::options_from_json(
        r#"{"pagination": true, "pageSize": 25, "paginationMode": "server", "logLevel": "debug"}"#,
    )
    .unwrap();
    assert_eq!(options.page_size, Some(25));
    assert_eq!(options.pagination_mode, PaginationMode::Server);
    assert_eq!(options.log_level, LogLevel::Debug);
    assert_eq!(options.effective_page_size(3), 25);
    assert_eq!(options.row_overscan, GridOptions::default().row_overscan);
}

#[test]
fn test_reduce_bumps_revision_only_on_change() {
    let mut state = GridState::new(GridOptions::default());
    let model = vec![SortItem::asc("n")];

    assert_eq!(
        store::reduce(&mut state, GridAction::SetSortModel(model.clone())),
        ActionOutcome::Changed
    );
    assert_eq!(state.revisions.sorting, 1);
    assert_eq!(
        store::reduce(&mut state, GridAction::SetSortModel(model)),
        ActionOutcome::Unchanged
    );
    assert_eq!(state.revisions.sorting, 1);
}

#[test]
fn test_reduce_pagination_noop_is_unchanged() {
    let mut state = GridState::new(GridOptions::default());
    let before = Rc::clone(&state.pagination);
    let outcome = store::reduce(
        &mut state,
        GridAction::Pagination(PaginationAction::SetPage { page: 1 }),
    );
    assert_eq!(outcome, ActionOutcome::Unchanged);
    assert!(Rc::ptr_eq(&before, &state.pagination));
}

#[test]
fn test_scrolling_blocks_pointer_events() {
    let mut state = GridState::new(GridOptions::default());
    store::reduce(&mut state, GridAction::SetScrolling(true));
    assert!(state.viewport.pointer_events_blocked);
    store::reduce(&mut state, GridAction::SetScrolling(false));
    assert!(!state.viewport.pointer_events_blocked);
}

#[test]
fn test_store_announces_changes() {
    let bus = EventBus::new();
    let changes = Rc::new(Cell::new(0));
    let seen = Rc::clone(&changes);
    bus.subscribe(GridEventKind::StateChanged, move |_| {
        seen.set(seen.get() + 1);
        Ok(())
    });
    let store = GridStore::new(GridOptions::default(), bus);

    store.dispatch(GridAction::SetClipboard("x".into())).unwrap();
    store.dispatch(GridAction::SetClipboard("x".into())).unwrap();
    assert_eq!(changes.get(), 1);
    assert_eq!(store.get_state().clipboard.as_deref(), Some("x"));
}

#[test]
fn test_memo_recomputes_on_key_change() {
    let memo: Memo<u64, usize> = Memo::default();
    let calls = Cell::new(0);
    let compute = || {
        calls.set(calls.get() + 1);
        calls.get()
    };
    assert_eq!(memo.get_or_compute(1, compute), 1);
    assert_eq!(memo.get_or_compute(1, compute), 1);
    assert_eq!(memo.get_or_compute(2, compute), 2);
    memo.clear();
    assert_eq!(memo.get_or_compute(2, compute), 3);
}

#[test]
fn test_selectors_sort_and_slice_pages() {
    let mut state = GridState::new(GridOptions {
        pagination: true,
        ..GridOptions::default()
    });
    store::reduce(
        &mut state,
        GridAction::SetRows(data_model::normalize_rows(numbered_rows(25)).unwrap()),
    );
    store::reduce(&mut state, GridAction::SetColumns(vec![ColDef::new("n")]));
    store::reduce(&mut state, GridAction::SetSortModel(vec![SortItem::asc("n")]));
    for action in [
        PaginationAction::SetRowCount {
            total_row_count: 25,
        },
        PaginationAction::SetPageSize { page_size: 10 },
        PaginationAction::SetPage { page: 3 },
    ] {
        store::reduce(&mut state, GridAction::Pagination(action));
    }

    let selectors = GridSelectors::default();
    let sorted = selectors.sorted_rows(&state);
    assert_eq!(sorted[0].get("n"), Some(&json!(1)));
    assert!(Rc::ptr_eq(&sorted, &selectors.sorted_rows(&state)));

    let page = selectors.page_rows(&state);
    let values: Vec<Value> = page.iter().map(|row| row.get("n").cloned().unwrap()).collect();
    assert_eq!(values, vec![json!(21), json!(22), json!(23), json!(24), json!(25)]);
    assert_eq!(selectors.page_row_index(&state, &RowId::from(0usize)), Some(4));

    let server = GridState {
        pagination: Rc::new(datagrid::state::pagination::PaginationState {
            pagination_mode: PaginationMode::Server,
            ..(*state.pagination).clone()
        }),
        ..state.clone()
    };
    assert_eq!(selectors::page_rows(&server, &sorted).len(), 25);
}

#[test]
fn test_row_views_join_selection() {
    let mut state = GridState::new(GridOptions::default());
    store::reduce(
        &mut state,
        GridAction::SetRows(data_model::normalize_rows(numbered_rows(3)).unwrap()),
    );
    store::reduce(
        &mut state,
        GridAction::SelectRow {
            id: RowId::from(1usize),
            allow_multiple: false,
            is_selected: None,
        },
    );

    let selectors = GridSelectors::default();
    let flags: Vec<bool> = selectors
        .row_views(&state)
        .iter()
        .map(|view| view.selected)
        .collect();
    assert_eq!(flags, vec![false, true, false]);
}
