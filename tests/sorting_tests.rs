use std::cmp::Ordering;
use std::rc::Rc;

use serde_json::{json, Value};

use datagrid::state::data_model::{ColDef, Record, Row};
use datagrid::state::sorting::{self, SortDirection, SortItem};

fn row(id: usize, name: Value, age: Value) -> Rc<Row> {
    let mut cells = Record::new();
    cells.insert("name".to_string(), name);
    cells.insert("age".to_string(), age);
    Rc::new(Row::new(id, cells))
}

fn people() -> Vec<Rc<Row>> {
    vec![
        row(0, json!("Carol"), json!(41)),
        row(1, json!("alice"), json!(30)),
        row(2, json!("Bob"), json!(30)),
        row(3, json!("dave"), Value::Null),
        row(4, json!("Eve"), json!(25)),
    ]
}

fn columns() -> Vec<ColDef> {
    vec![ColDef::new("name"), ColDef::new("age")]
}

#[test]
fn test_empty_model_keeps_dataset_order() {
    let order = sorting::sorted_row_indices(&people(), &columns(), &[]);
    assert_eq!(order, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_sort_numbers_ascending_with_null_first() {
    let order = sorting::sorted_row_indices(&people(), &columns(), &[SortItem::asc("age")]);
    assert_eq!(order, vec![3, 4, 1, 2, 0]);
}

#[test]
fn test_descending_keeps_ties_in_input_order() {
    let order = sorting::sorted_row_indices(&people(), &columns(), &[SortItem::desc("age")]);
    // rows 1 and 2 share age 30 and stay in their original relative order
    assert_eq!(order, vec![0, 1, 2, 4, 3]);
}

#[test]
fn test_sort_is_stable_for_fully_equal_rows() {
    let rows: Vec<Rc<Row>> = (0..20).map(|id| row(id, json!("same"), json!(1))).collect();
    let expected: Vec<usize> = (0..20).collect();

    for model in [vec![SortItem::asc("name")], vec![SortItem::desc("name")]] {
        assert_eq!(sorting::sorted_row_indices(&rows, &columns(), &model), expected);
    }
}

#[test]
fn test_strings_compare_case_insensitively() {
    let order = sorting::sorted_row_indices(&people(), &columns(), &[SortItem::asc("name")]);
    assert_eq!(order, vec![1, 2, 0, 3, 4]);
}

#[test]
fn test_second_field_breaks_ties() {
    let model = vec![SortItem::asc("age"), SortItem::desc("name")];
    let order = sorting::sorted_row_indices(&people(), &columns(), &model);
    assert_eq!(order, vec![3, 4, 2, 1, 0]);
}

#[test]
fn test_custom_comparator_and_value_getter() {
    let columns = vec![
        ColDef::new("name").with_sort_comparator(|a, b| {
            let len = |v: &Value| v.as_str().map(str::len).unwrap_or(0);
            len(a).cmp(&len(b))
        }),
        ColDef::new("age").with_value_getter(|row| {
            json!(row.get("age").and_then(Value::as_i64).map(|age| -age))
        }),
    ];

    let by_len = sorting::sorted_row_indices(&people(), &columns, &[SortItem::asc("name")]);
    assert_eq!(by_len, vec![2, 4, 3, 0, 1]);

    let by_negated_age = sorting::sorted_row_indices(&people(), &columns, &[SortItem::asc("age")]);
    assert_eq!(by_negated_age, vec![3, 0, 1, 2, 4]);
}

#[test]
fn test_sorting_never_touches_rows() {
    let rows = people();
    let before: Vec<Row> = rows.iter().map(|row| (**row).clone()).collect();
    let _ = sorting::sorted_row_indices(&rows, &columns(), &[SortItem::desc("name")]);
    let after: Vec<Row> = rows.iter().map(|row| (**row).clone()).collect();
    assert_eq!(before, after);
}

#[test]
fn test_compare_values_mixed_types() {
    assert_eq!(sorting::compare_values(&Value::Null, &json!(false)), Ordering::Less);
    assert_eq!(sorting::compare_values(&json!(true), &json!(0)), Ordering::Less);
    assert_eq!(sorting::compare_values(&json!(2), &json!(10)), Ordering::Less);
    assert_eq!(sorting::compare_values(&json!(-1), &json!(u64::MAX)), Ordering::Less);
    assert_eq!(sorting::compare_values(&json!(1.5), &json!(1)), Ordering::Greater);
    assert_eq!(sorting::compare_values(&json!(9), &json!("1")), Ordering::Less);
    assert_eq!(sorting::compare_values(&json!("A"), &json!("a")), Ordering::Less);
}

#[test]
fn test_header_click_cycle() {
    assert_eq!(sorting::next_sort_direction(None), Some(SortDirection::Asc));
    assert_eq!(
        sorting::next_sort_direction(Some(SortDirection::Asc)),
        Some(SortDirection::Desc)
    );
    assert_eq!(sorting::next_sort_direction(Some(SortDirection::Desc)), None);
}

#[test]
fn test_toggle_single_field_replaces_model() {
    let model = vec![SortItem::asc("name")];
    assert_eq!(
        sorting::toggle_sort_model(&model, "age", false),
        vec![SortItem::asc("age")]
    );
    assert_eq!(
        sorting::toggle_sort_model(&model, "name", false),
        vec![SortItem::desc("name")]
    );
    assert!(sorting::toggle_sort_model(&[SortItem::desc("name")], "name", false).is_empty());
}

#[test]
fn test_toggle_multiple_keeps_other_fields() {
    let model = vec![SortItem::asc("name")];
    let added = sorting::toggle_sort_model(&model, "age", true);
    assert_eq!(added, vec![SortItem::asc("name"), SortItem::asc("age")]);

    let cycled = sorting::toggle_sort_model(&added, "name", true);
    assert_eq!(cycled, vec![SortItem::desc("name"), SortItem::asc("age")]);

    let removed = sorting::toggle_sort_model(&[SortItem::desc("name"), SortItem::asc("age")], "name", true);
    assert_eq!(removed, vec![SortItem::asc("age")]);
}

#[test]
fn test_sort_model_serde_shape() {
    let model = vec![SortItem::desc("age")];
    let json = serde_json::to_value(&model).unwrap();
    assert_eq!(json, json!([{"field": "age", "direction": "desc"}]));
}
