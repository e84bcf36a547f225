use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{GridError, Result};
use crate::state::data_model::{self, Columns, Record, Row};

/// Parses a JSON array of objects into records.
pub fn parse_records(source: &str) -> Result<Vec<Record>> {
    let Value::Array(items) = serde_json::from_str::<Value>(source)? else {
        return Err(GridError::NotAnArray);
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Ok(map.into_iter().collect()),
            _ => Err(GridError::NotArrayOfObjects),
        })
        .collect()
}

/// Reads a dataset file and turns every record into a [`Row`].
pub fn load_rows(path: &Path) -> Result<Vec<Row>> {
    let content = fs::read_to_string(path)?;
    let rows = data_model::rows_from_records(parse_records(&content)?)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "dataset loaded");
    Ok(rows)
}

/// Loads a dataset and derives one column per field found in it.
pub fn load_dataset(path: &Path) -> Result<(Vec<Row>, Columns)> {
    let rows = load_rows(path)?;
    let columns = data_model::derive_columns(&rows);
    Ok((rows, columns))
}

/// Writes `rows` as a pretty-printed array, keeping only `columns`, in
/// their display order, with values as produced by each column's getter.
pub fn export_rows(path: &Path, rows: &[impl AsRef<Row>], columns: &Columns) -> Result<()> {
    let array: Vec<Value> = rows
        .iter()
        .map(|row| {
            let row = row.as_ref();
            let object: Map<String, Value> = columns
                .iter()
                .map(|col| (col.field.clone(), col.cell_value(row)))
                .collect();
            Value::Object(object)
        })
        .collect();

    let json = serde_json::to_string_pretty(&array)?;
    crate::io::write_atomically(path, &json)?;
    tracing::info!(path = %path.display(), rows = array.len(), "dataset exported");
    Ok(())
}
