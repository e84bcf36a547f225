use std::rc::Rc;

use serde_json::{json, Value};

use datagrid::io::json_io;
use datagrid::state::data_model::{ColDef, RowId};
use datagrid::GridError;

#[test]
fn test_load_rows_valid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.json");
    std::fs::write(
        &path,
        r#"[{"id": 7, "name": "Alice", "age": 30}, {"id": 9, "name": "Bob", "age": 25}]"#,
    )
    .unwrap();

    let rows = json_io::load_rows(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, RowId::from("7"));
    assert_eq!(rows[1].get("name"), Some(&json!("Bob")));
}

#[test]
fn test_load_dataset_derives_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(&path, r#"[{"b": 1, "id": "x"}, {"a": true, "id": "y"}]"#).unwrap();

    let (rows, columns) = json_io::load_dataset(&path).unwrap();
    assert_eq!(rows.len(), 2);
    let fields: Vec<&str> = columns.iter().map(|col| col.field.as_str()).collect();
    assert_eq!(fields, vec!["id", "a", "b"]);
}

#[test]
fn test_load_rows_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.json");
    std::fs::write(&path, "[]").unwrap();
    assert!(json_io::load_rows(&path).unwrap().is_empty());
}

#[test]
fn test_load_rows_not_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("obj.json");
    std::fs::write(&path, r#"{"key": "value"}"#).unwrap();

    let err = json_io::load_rows(&path).unwrap_err();
    assert!(matches!(err, GridError::NotAnArray));
}

#[test]
fn test_load_rows_not_objects() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("numbers.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let err = json_io::load_rows(&path).unwrap_err();
    assert!(matches!(err, GridError::NotArrayOfObjects));
}

#[test]
fn test_load_rows_invalid_json_and_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "[{").unwrap();
    assert!(matches!(json_io::load_rows(&path), Err(GridError::Json(_))));

    let missing = dir.path().join("nope.json");
    assert!(matches!(json_io::load_rows(&missing), Err(GridError::Io(_))));
}

#[test]
fn test_load_rows_duplicate_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dupes.json");
    std::fs::write(&path, r#"[{"id": 1}, {"id": 1}]"#).unwrap();
    assert!(matches!(
        json_io::load_rows(&path),
        Err(GridError::DuplicateRowId(_))
    ));
}

#[test]
fn test_export_rows_keeps_column_order_and_getters() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("in.json");
    std::fs::write(&source, r#"[{"id": 1, "qty": 2, "secret": "s"}]"#).unwrap();
    let rows: Vec<Rc<_>> = json_io::load_rows(&source)
        .unwrap()
        .into_iter()
        .map(Rc::new)
        .collect();

    let columns = vec![
        ColDef::new("qty"),
        ColDef::new("double").with_value_getter(|row| {
            json!(row.get("qty").and_then(Value::as_i64).unwrap_or(0) * 2)
        }),
    ];
    let target = dir.path().join("out.json");
    json_io::export_rows(&target, rows.as_slice(), &columns).unwrap();
    // overwriting an existing file goes through the same path
    json_io::export_rows(&target, rows.as_slice(), &columns).unwrap();

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(written, json!([{"qty": 2, "double": 4}]));
}

#[test]
fn test_parse_records() {
    let records = json_io::parse_records(r#"[{"a": 1}, {}]"#).unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[1].is_empty());
}
