use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GridError, Result};

pub type Record = BTreeMap<String, Value>;

pub const ID_FIELD: &str = "id";
pub const DEFAULT_COLUMN_WIDTH: f64 = 100.0;
pub const MIN_COLUMN_WIDTH: f64 = 50.0;

/// Stable row identifier. Numeric ids are kept in their decimal form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RowId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<usize> for RowId {
    fn from(value: usize) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for RowId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub id: RowId,
    pub cells: Record,
}

impl Row {
    pub fn new(id: impl Into<RowId>, cells: Record) -> Self {
        Self {
            id: id.into(),
            cells,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.cells.get(field)
    }
}

/// A row joined with the selection set at read time.
#[derive(Clone, Debug, PartialEq)]
pub struct RowView {
    pub row: Rc<Row>,
    pub selected: bool,
}

/// Shared callback compared by identity, so column definitions stay `PartialEq`.
pub struct Callback<F: ?Sized>(Rc<F>);

impl<F: ?Sized> Callback<F> {
    pub fn from_rc(f: Rc<F>) -> Self {
        Self(f)
    }
}

impl<F: ?Sized> Clone for Callback<F> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<F: ?Sized> PartialEq for Callback<F> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<F: ?Sized> fmt::Debug for Callback<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}

impl<F: ?Sized> std::ops::Deref for Callback<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.0
    }
}

pub type ValueGetter = Callback<dyn Fn(&Row) -> Value>;
pub type ValueFormatter = Callback<dyn Fn(&Value) -> String>;
pub type SortComparator = Callback<dyn Fn(&Value, &Value) -> Ordering>;

#[derive(Clone, Debug, PartialEq)]
pub struct ColDef {
    pub field: String,
    pub header_name: Option<String>,
    pub width: f64,
    pub hide: bool,
    pub sortable: bool,
    pub value_getter: Option<ValueGetter>,
    pub value_formatter: Option<ValueFormatter>,
    pub sort_comparator: Option<SortComparator>,
}

impl ColDef {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            header_name: None,
            width: DEFAULT_COLUMN_WIDTH,
            hide: false,
            sortable: true,
            value_getter: None,
            value_formatter: None,
            sort_comparator: None,
        }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width.max(MIN_COLUMN_WIDTH);
        self
    }

    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = Some(name.into());
        self
    }

    pub fn hidden(mut self, hide: bool) -> Self {
        self.hide = hide;
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn with_value_getter(mut self, getter: impl Fn(&Row) -> Value + 'static) -> Self {
        let getter: Rc<dyn Fn(&Row) -> Value> = Rc::new(getter);
        self.value_getter = Some(Callback::from_rc(getter));
        self
    }

    pub fn with_value_formatter(mut self, formatter: impl Fn(&Value) -> String + 'static) -> Self {
        let formatter: Rc<dyn Fn(&Value) -> String> = Rc::new(formatter);
        self.value_formatter = Some(Callback::from_rc(formatter));
        self
    }

    pub fn with_sort_comparator(
        mut self,
        comparator: impl Fn(&Value, &Value) -> Ordering + 'static,
    ) -> Self {
        let comparator: Rc<dyn Fn(&Value, &Value) -> Ordering> = Rc::new(comparator);
        self.sort_comparator = Some(Callback::from_rc(comparator));
        self
    }

    pub fn header_label(&self) -> &str {
        self.header_name.as_deref().unwrap_or(&self.field)
    }

    pub fn cell_value(&self, row: &Row) -> Value {
        match self.value_getter.as_ref() {
            Some(getter) => (**getter)(row),
            None => row.get(&self.field).cloned().unwrap_or(Value::Null),
        }
    }

    pub fn formatted_value(&self, row: &Row) -> String {
        let value = self.cell_value(row);
        match self.value_formatter.as_ref() {
            Some(formatter) => (**formatter)(&value),
            None => display_value(&value),
        }
    }
}

pub type Columns = Vec<ColDef>;

/// Normalized rows: insertion order plus an id lookup.
/// An in-progress drag on a header's resize handle.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnResize {
    pub field: String,
    pub start_x: f64,
    pub start_width: f64,
}

impl ColumnResize {
    pub fn new(field: impl Into<String>, start_x: f64, start_width: f64) -> Self {
        Self {
            field: field.into(),
            start_x,
            start_width,
        }
    }

    pub fn width_at(&self, x: f64) -> f64 {
        (self.start_width + x - self.start_x).max(MIN_COLUMN_WIDTH)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowsState {
    pub rows: Vec<Rc<Row>>,
    pub id_lookup: HashMap<RowId, usize>,
}

impl RowsState {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &RowId) -> Option<&Rc<Row>> {
        self.id_lookup.get(id).and_then(|idx| self.rows.get(*idx))
    }

    pub fn contains(&self, id: &RowId) -> bool {
        self.id_lookup.contains_key(id)
    }
}

pub fn normalize_rows(rows: Vec<Row>) -> Result<RowsState> {
    let id_lookup = build_id_lookup(&rows)?;
    Ok(RowsState {
        rows: rows.into_iter().map(Rc::new).collect(),
        id_lookup,
    })
}

fn build_id_lookup(rows: &[Row]) -> Result<HashMap<RowId, usize>> {
    let mut id_lookup = HashMap::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        if id_lookup.insert(row.id.clone(), idx).is_some() {
            return Err(GridError::DuplicateRowId(row.id.clone()));
        }
    }
    Ok(id_lookup)
}

pub fn normalize_columns(columns: Columns) -> Result<Columns> {
    let mut seen = HashSet::with_capacity(columns.len());
    for column in &columns {
        if !seen.insert(column.field.as_str()) {
            return Err(GridError::DuplicateField(column.field.clone()));
        }
    }
    Ok(columns
        .into_iter()
        .map(|column| {
            let width = column.width.max(MIN_COLUMN_WIDTH);
            ColDef { width, ..column }
        })
        .collect())
}

/// Builds rows from plain records, taking the id from the `id` field when
/// present and falling back to the record position otherwise.
pub fn rows_from_records(records: Vec<Record>) -> Result<Vec<Row>> {
    let rows: Vec<Row> = records
        .into_iter()
        .enumerate()
        .map(|(idx, cells)| {
            let id = cells
                .get(ID_FIELD)
                .and_then(RowId::from_value)
                .unwrap_or_else(|| RowId::from(idx));
            Row { id, cells }
        })
        .collect();
    build_id_lookup(&rows)?;
    Ok(rows)
}

/// Returns the union of all keys across all rows, `id` first and the rest sorted.
pub fn derive_columns(rows: &[Row]) -> Columns {
    let mut fields = BTreeSet::new();
    for row in rows {
        for key in row.cells.keys() {
            fields.insert(key.clone());
        }
    }
    let has_id = fields.remove(ID_FIELD);
    has_id
        .then(|| ID_FIELD.to_string())
        .into_iter()
        .chain(fields)
        .map(ColDef::new)
        .collect()
}

/// Formats a JSON value for display in a table cell.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
