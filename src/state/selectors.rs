use std::cell::RefCell;
use std::rc::Rc;

use crate::state::data_model::{ColDef, Columns, Row, RowId, RowView};
use crate::state::options::PaginationMode;
use crate::state::sorting;
use crate::state::store::GridState;

/// Single-entry cache: recomputes only when the key changes.
#[derive(Debug)]
pub struct Memo<K, V> {
    cache: RefCell<Option<(K, V)>>,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            cache: RefCell::new(None),
        }
    }
}

impl<K: PartialEq, V: Clone> Memo<K, V> {
    pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some((cached_key, value)) = self.cache.borrow().as_ref() {
            if *cached_key == key {
                return value.clone();
            }
        }
        let value = compute();
        *self.cache.borrow_mut() = Some((key, value.clone()));
        value
    }

    pub fn clear(&self) {
        self.cache.borrow_mut().take();
    }
}

pub fn visible_columns(columns: &[ColDef]) -> Columns {
    columns.iter().filter(|col| !col.hide).cloned().collect()
}

pub fn sorted_rows(state: &GridState) -> Vec<Rc<Row>> {
    sorting::sorted_row_indices(&state.rows.rows, &state.columns, &state.sort_model)
        .into_iter()
        .map(|idx| Rc::clone(&state.rows.rows[idx]))
        .collect()
}

/// Rows of the current page. Server mode trusts the data source to have
/// supplied exactly one page already.
pub fn page_rows(state: &GridState, sorted: &[Rc<Row>]) -> Vec<Rc<Row>> {
    let paginate_locally =
        state.options.pagination && state.pagination.pagination_mode == PaginationMode::Client;
    if !paginate_locally {
        return sorted.to_vec();
    }
    let window = state.pagination.page_window();
    let start = window.start.min(sorted.len());
    let end = window.end.min(sorted.len());
    sorted[start..end].to_vec()
}

pub fn rows_with_selection(state: &GridState, rows: &[Rc<Row>]) -> Vec<RowView> {
    rows.iter()
        .map(|row| RowView {
            row: Rc::clone(row),
            selected: state.selection.contains(&row.id),
        })
        .collect()
}

type PageKey = (u64, u64, u64, u64, u64);

#[derive(Debug, Default)]
pub struct GridSelectors {
    visible_columns: Memo<u64, Rc<Columns>>,
    sorted_rows: Memo<(u64, u64, u64), Rc<Vec<Rc<Row>>>>,
    page_rows: Memo<PageKey, Rc<Vec<Rc<Row>>>>,
    row_views: Memo<(PageKey, u64), Rc<Vec<RowView>>>,
}

impl GridSelectors {
    pub fn visible_columns(&self, state: &GridState) -> Rc<Columns> {
        self.visible_columns
            .get_or_compute(state.revisions.columns, || {
                Rc::new(visible_columns(&state.columns))
            })
    }

    pub fn sorted_rows(&self, state: &GridState) -> Rc<Vec<Rc<Row>>> {
        let r = state.revisions;
        self.sorted_rows
            .get_or_compute((r.rows, r.columns, r.sorting), || Rc::new(sorted_rows(state)))
    }

    pub fn page_rows(&self, state: &GridState) -> Rc<Vec<Rc<Row>>> {
        let key = page_key(state);
        self.page_rows.get_or_compute(key, || {
            let sorted = self.sorted_rows(state);
            Rc::new(page_rows(state, &sorted))
        })
    }

    pub fn row_views(&self, state: &GridState) -> Rc<Vec<RowView>> {
        let key = (page_key(state), state.revisions.selection);
        self.row_views.get_or_compute(key, || {
            let rows = self.page_rows(state);
            Rc::new(rows_with_selection(state, &rows))
        })
    }

    pub fn page_row_index(&self, state: &GridState, id: &RowId) -> Option<usize> {
        self.page_rows(state).iter().position(|row| row.id == *id)
    }

    pub fn clear(&self) {
        self.visible_columns.clear();
        self.sorted_rows.clear();
        self.page_rows.clear();
        self.row_views.clear();
    }
}

fn page_key(state: &GridState) -> PageKey {
    let r = state.revisions;
    (r.rows, r.columns, r.sorting, r.pagination, r.options)
}
