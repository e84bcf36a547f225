use std::ops::Range;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GridError, Result};
use crate::state::options::PaginationMode;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub page: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub row_count: usize,
    pub pagination_mode: PaginationMode,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page: 1,
            page_count: 1,
            page_size: 0,
            row_count: 0,
            pagination_mode: PaginationMode::Client,
        }
    }
}

impl PaginationState {
    /// Positions of the current page within `row_count` rows. A zero page
    /// size means a single page holding everything.
    pub fn page_window(&self) -> Range<usize> {
        if self.page_size == 0 {
            return 0..self.row_count;
        }
        let start = (self.page - 1)
            .saturating_mul(self.page_size)
            .min(self.row_count);
        let end = start.saturating_add(self.page_size).min(self.row_count);
        start..end
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum PaginationAction {
    SetPage {
        page: usize,
    },
    SetPageSize {
        #[serde(rename = "pageSize")]
        page_size: usize,
    },
    SetPaginationMode {
        #[serde(rename = "paginationMode")]
        pagination_mode: PaginationMode,
    },
    #[serde(alias = "setRowCount")]
    SetRowCount {
        #[serde(rename = "totalRowCount")]
        total_row_count: usize,
    },
}

pub fn get_page_count(page_size: usize, row_count: usize) -> usize {
    if page_size > 0 && row_count > 0 {
        row_count.div_ceil(page_size)
    } else {
        1
    }
}

fn clamp_page(page: usize, page_count: usize) -> usize {
    page.clamp(1, page_count.max(1))
}

pub fn set_page(state: &Rc<PaginationState>, page: usize) -> Rc<PaginationState> {
    let page = clamp_page(page, state.page_count);
    if state.page == page {
        return Rc::clone(state);
    }
    Rc::new(PaginationState {
        page,
        ..(**state).clone()
    })
}

pub fn set_page_size(state: &Rc<PaginationState>, page_size: usize) -> Rc<PaginationState> {
    if state.page_size == page_size {
        return Rc::clone(state);
    }
    let page_count = get_page_count(page_size, state.row_count);
    Rc::new(PaginationState {
        page: clamp_page(state.page, page_count),
        page_count,
        page_size,
        ..(**state).clone()
    })
}

pub fn set_row_count(state: &Rc<PaginationState>, total_row_count: usize) -> Rc<PaginationState> {
    if state.row_count == total_row_count {
        return Rc::clone(state);
    }
    let page_count = get_page_count(state.page_size, total_row_count);
    Rc::new(PaginationState {
        page: clamp_page(state.page, page_count),
        page_count,
        row_count: total_row_count,
        ..(**state).clone()
    })
}

pub fn set_pagination_mode(
    state: &Rc<PaginationState>,
    pagination_mode: PaginationMode,
) -> Rc<PaginationState> {
    if state.pagination_mode == pagination_mode {
        return Rc::clone(state);
    }
    Rc::new(PaginationState {
        pagination_mode,
        ..(**state).clone()
    })
}

pub fn pagination_reducer(
    state: &Rc<PaginationState>,
    action: &PaginationAction,
) -> Rc<PaginationState> {
    match action {
        PaginationAction::SetPage { page } => set_page(state, *page),
        PaginationAction::SetPageSize { page_size } => set_page_size(state, *page_size),
        PaginationAction::SetPaginationMode { pagination_mode } => {
            set_pagination_mode(state, *pagination_mode)
        }
        PaginationAction::SetRowCount { total_row_count } => set_row_count(state, *total_row_count),
    }
}

/// Reduces an action received in its wire shape (`{"type": ..., "payload": ...}`).
/// Anything that is not one of the four transitions is rejected.
pub fn pagination_reducer_raw(
    state: &Rc<PaginationState>,
    action: &Value,
) -> Result<Rc<PaginationState>> {
    let parsed: PaginationAction =
        serde_json::from_value(action.clone()).map_err(|_| GridError::UnknownAction {
            action: action.to_string(),
        })?;
    Ok(pagination_reducer(state, &parsed))
}
