use std::cmp::Ordering;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::state::data_model::{self, ColDef, Row, SortComparator};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortItem {
    pub field: String,
    pub direction: SortDirection,
}

impl SortItem {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

pub type SortModel = Vec<SortItem>;

struct SortKey<'a> {
    column: Option<&'a ColDef>,
    field: &'a str,
    direction: SortDirection,
    comparator: Option<&'a SortComparator>,
}

/// Returns the permutation of `rows` positions that orders them by `model`.
///
/// The comparison walks the model field by field; the first non-equal field
/// decides. `sort_by` is stable, and descending fields invert their own
/// comparison instead of reversing the output, so fully-equal rows keep
/// their input order in both directions.
pub fn sorted_row_indices(rows: &[Rc<Row>], columns: &[ColDef], model: &[SortItem]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..rows.len()).collect();
    if model.is_empty() || rows.len() < 2 {
        return indices;
    }

    let keys: Vec<SortKey<'_>> = model
        .iter()
        .map(|item| {
            let column = columns.iter().find(|col| col.field == item.field);
            SortKey {
                column,
                field: item.field.as_str(),
                direction: item.direction,
                comparator: column.and_then(|col| col.sort_comparator.as_ref()),
            }
        })
        .collect();

    // Resolve every sort value once instead of inside the comparator.
    let values: Vec<Vec<Value>> = rows
        .iter()
        .map(|row| {
            keys.iter()
                .map(|key| match key.column {
                    Some(column) => column.cell_value(row),
                    None => row.get(key.field).cloned().unwrap_or(Value::Null),
                })
                .collect()
        })
        .collect();

    indices.sort_by(|&a, &b| {
        keys.iter()
            .enumerate()
            .map(|(k, key)| {
                let left = &values[a][k];
                let right = &values[b][k];
                let ordering = match key.comparator {
                    Some(comparator) => (**comparator)(left, right),
                    None => compare_values(left, right),
                };
                match key.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    indices
}

/// Header-click cycle: none → asc → desc → none.
pub fn next_sort_direction(current: Option<SortDirection>) -> Option<SortDirection> {
    match current {
        None => Some(SortDirection::Asc),
        Some(SortDirection::Asc) => Some(SortDirection::Desc),
        Some(SortDirection::Desc) => None,
    }
}

/// Applies a header click on `field` to `model`.
///
/// With `multiple` the field is cycled in place (or appended), keeping the
/// other fields; otherwise the result only ever holds `field`.
pub fn toggle_sort_model(model: &[SortItem], field: &str, multiple: bool) -> SortModel {
    let current = model
        .iter()
        .find(|item| item.field == field)
        .map(|item| item.direction);
    let next = next_sort_direction(current);

    if !multiple {
        return next
            .map(|direction| SortItem {
                field: field.to_string(),
                direction,
            })
            .into_iter()
            .collect();
    }

    let mut out: SortModel = Vec::with_capacity(model.len() + 1);
    let mut placed = false;
    for item in model {
        if item.field == field {
            placed = true;
            if let Some(direction) = next {
                out.push(SortItem {
                    field: field.to_string(),
                    direction,
                });
            }
        } else {
            out.push(item.clone());
        }
    }
    if !placed {
        if let Some(direction) = next {
            out.push(SortItem {
                field: field.to_string(),
                direction,
            });
        }
    }
    out
}

pub fn sort_direction_for(model: &[SortItem], field: &str) -> Option<SortDirection> {
    model
        .iter()
        .find(|item| item.field == field)
        .map(|item| item.direction)
}

/// Default total order: null first, then booleans, numbers, strings,
/// arrays and objects.
pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::String(a), Value::String(b)) => compare_strings(a, b),
        _ => type_rank(left).cmp(&type_rank(right)).then_with(|| {
            data_model::display_value(left).cmp(&data_model::display_value(right))
        }),
    }
}

fn compare_strings(left: &str, right: &str) -> Ordering {
    let folded = left
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(right.chars().flat_map(char::to_lowercase));
    folded.then_with(|| left.cmp(right))
}

fn compare_numbers(left: &Number, right: &Number) -> Ordering {
    match (left.as_i64(), left.as_u64(), right.as_i64(), right.as_u64()) {
        (Some(a), _, Some(b), _) => a.cmp(&b),
        (Some(a), _, _, Some(b)) => {
            if a < 0 {
                Ordering::Less
            } else {
                (a as u64).cmp(&b)
            }
        }
        (_, Some(a), Some(b), _) => {
            if b < 0 {
                Ordering::Greater
            } else {
                a.cmp(&(b as u64))
            }
        }
        (_, Some(a), _, Some(b)) => a.cmp(&b),
        _ => {
            let left = left.as_f64().unwrap_or(f64::NAN);
            let right = right.as_f64().unwrap_or(f64::NAN);
            left.total_cmp(&right)
        }
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
