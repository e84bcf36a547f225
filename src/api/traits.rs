use std::cell::Ref;
use std::rc::Rc;

use crate::api::{column_widths, GridApi};
use crate::error::{GridError, Result};
use crate::state::data_model::{self, ColDef, ColumnResize, Columns, Row, RowId, MIN_COLUMN_WIDTH};
use crate::state::events::{GridEvent, GridEventKind, Subscription};
use crate::state::keyboard::CellIndexCoordinates;
use crate::state::options::PaginationMode;
use crate::state::pagination::{PaginationAction, PaginationState};
use crate::state::sorting::{self, SortModel};
use crate::state::store::{ActionOutcome, GridAction, GridState};
use crate::state::virtualization::{self, ContainerProps, RenderContext, ScrollParams};

pub trait StateApi {
    fn get_state(&self) -> Ref<'_, GridState>;
}

pub trait EventsApi {
    fn publish_event(&self, event: GridEvent) -> Result<()>;
    fn subscribe(
        &self,
        kind: GridEventKind,
        handler: impl Fn(&GridEvent) -> Result<()> + 'static,
    ) -> Subscription;
    fn once(
        &self,
        kind: GridEventKind,
        handler: impl Fn(&GridEvent) -> Result<()> + 'static,
    ) -> Subscription;
}

pub trait RowApi {
    /// Replaces the dataset. Ids must be unique.
    fn set_rows(&self, rows: Vec<Row>) -> Result<()>;
    fn get_row_from_id(&self, id: &RowId) -> Option<Rc<Row>>;
    fn get_row_id_from_row_index(&self, index: usize) -> Option<RowId>;
    fn get_row_index_from_id(&self, id: &RowId) -> Option<usize>;
    /// Ids of every row in the dataset, in sorted order.
    fn get_all_row_ids(&self) -> Vec<RowId>;
    fn get_rows_count(&self) -> usize;
}

pub trait ColumnApi {
    fn set_columns(&self, columns: Columns) -> Result<()>;
    fn set_column_width(&self, field: &str, width: f64) -> Result<()>;
    fn get_all_columns(&self) -> Columns;
    fn get_visible_columns(&self) -> Columns;
    fn get_column_from_field(&self, field: &str) -> Option<ColDef>;
    /// Starts dragging the resize handle of `field` at pointer position `x`.
    fn start_column_resize(&self, field: &str, x: f64) -> Result<()>;
    /// Resizes the dragged column to follow the pointer; no-op when idle.
    fn drag_column_resize(&self, x: f64) -> Result<()>;
    /// Ends the drag. Returns whether one was active.
    fn stop_column_resize(&self) -> bool;
}

pub trait SelectionApi {
    /// Selects `id` and clears every other row.
    fn select_row(&self, id: &RowId) -> Result<()>;
    fn select_row_with(
        &self,
        id: &RowId,
        allow_multiple: bool,
        is_selected: Option<bool>,
    ) -> Result<()>;
    fn select_rows(&self, ids: &[RowId], is_selected: bool, reset_selection: bool) -> Result<()>;
    /// Selected rows in dataset order.
    fn get_selected_rows(&self) -> Vec<Rc<Row>>;
    fn is_row_selected(&self, id: &RowId) -> bool;
}

pub trait SortApi {
    fn set_sort_model(&self, model: SortModel) -> Result<()>;
    /// Advances `field` to its next direction (`asc`, `desc`, none).
    fn sort_column(&self, field: &str, multiple: bool) -> Result<()>;
    fn get_sort_model(&self) -> SortModel;
}

pub trait PaginationApi {
    fn set_page(&self, page: usize) -> Result<()>;
    fn set_page_size(&self, page_size: usize) -> Result<()>;
    /// Total row count reported by the data source in server mode.
    fn set_row_count(&self, row_count: usize) -> Result<()>;
    fn set_pagination_mode(&self, mode: PaginationMode) -> Result<()>;
    fn get_pagination_state(&self) -> PaginationState;
}

pub trait VirtualizationApi {
    /// Scrolls the minimum distance that brings `cell` into the viewport.
    /// Returns whether the offsets moved.
    fn scroll_to_indexes(&self, cell: CellIndexCoordinates) -> Result<bool>;
    fn scroll(&self, params: ScrollParams) -> Result<()>;
    fn get_render_context(&self) -> Option<RenderContext>;
    fn get_container_props_state(&self) -> Option<ContainerProps>;
}

/// Everything a mounted grid can do.
pub trait GridCapabilities:
    StateApi + EventsApi + RowApi + ColumnApi + SelectionApi + SortApi + PaginationApi + VirtualizationApi
{
}

impl<T> GridCapabilities for T where
    T: StateApi
        + EventsApi
        + RowApi
        + ColumnApi
        + SelectionApi
        + SortApi
        + PaginationApi
        + VirtualizationApi
{
}

impl StateApi for GridApi {
    fn get_state(&self) -> Ref<'_, GridState> {
        self.state()
    }
}

impl EventsApi for GridApi {
    fn publish_event(&self, event: GridEvent) -> Result<()> {
        self.bus().publish(&event)
    }

    fn subscribe(
        &self,
        kind: GridEventKind,
        handler: impl Fn(&GridEvent) -> Result<()> + 'static,
    ) -> Subscription {
        self.bus().subscribe(kind, handler)
    }

    fn once(
        &self,
        kind: GridEventKind,
        handler: impl Fn(&GridEvent) -> Result<()> + 'static,
    ) -> Subscription {
        self.bus().once(kind, handler)
    }
}

impl RowApi for GridApi {
    fn set_rows(&self, rows: Vec<Row>) -> Result<()> {
        let rows = data_model::normalize_rows(rows)?;
        let count = rows.len();
        if !self.dispatch(GridAction::SetRows(rows))?.is_changed() {
            return Ok(());
        }
        tracing::debug!(count, "rows replaced");

        let pruned = self.dispatch(GridAction::PruneSelection)?;
        self.recompute()?;
        if let ActionOutcome::Selection(change) = pruned {
            self.publish_selection_change(change)?;
        }
        self.bus().publish(&GridEvent::RowsUpdated)
    }

    fn get_row_from_id(&self, id: &RowId) -> Option<Rc<Row>> {
        self.state().rows.get(id).cloned()
    }

    fn get_row_id_from_row_index(&self, index: usize) -> Option<RowId> {
        self.page_rows().get(index).map(|row| row.id.clone())
    }

    fn get_row_index_from_id(&self, id: &RowId) -> Option<usize> {
        self.page_row_index(id)
    }

    fn get_all_row_ids(&self) -> Vec<RowId> {
        self.sorted_rows().iter().map(|row| row.id.clone()).collect()
    }

    fn get_rows_count(&self) -> usize {
        self.state().rows.len()
    }
}

impl ColumnApi for GridApi {
    fn set_columns(&self, columns: Columns) -> Result<()> {
        let columns = data_model::normalize_columns(columns)?;
        let count = columns.len();
        if !self.dispatch(GridAction::SetColumns(columns))?.is_changed() {
            return Ok(());
        }
        tracing::debug!(count, "columns replaced");
        self.recompute()?;
        self.bus().publish(&GridEvent::ColumnsUpdated)
    }

    fn set_column_width(&self, field: &str, width: f64) -> Result<()> {
        let mut columns = self.get_all_columns();
        let column = columns
            .iter_mut()
            .find(|col| col.field == field)
            .ok_or_else(|| GridError::ColumnNotFound(field.to_string()))?;
        column.width = width.max(MIN_COLUMN_WIDTH);
        self.set_columns(columns)
    }

    fn get_all_columns(&self) -> Columns {
        self.state().columns.clone()
    }

    fn get_visible_columns(&self) -> Columns {
        self.visible_columns().as_ref().clone()
    }

    fn get_column_from_field(&self, field: &str) -> Option<ColDef> {
        self.state()
            .columns
            .iter()
            .find(|col| col.field == field)
            .cloned()
    }

    fn start_column_resize(&self, field: &str, x: f64) -> Result<()> {
        let column = self
            .get_column_from_field(field)
            .ok_or_else(|| GridError::ColumnNotFound(field.to_string()))?;
        tracing::debug!(field, width = column.width, "column resize started");
        *self.inner.column_resize.borrow_mut() = Some(ColumnResize::new(field, x, column.width));
        Ok(())
    }

    fn drag_column_resize(&self, x: f64) -> Result<()> {
        let target = self
            .inner
            .column_resize
            .borrow()
            .as_ref()
            .map(|drag| (drag.field.clone(), drag.width_at(x)));
        match target {
            Some((field, width)) => self.set_column_width(&field, width),
            None => Ok(()),
        }
    }

    fn stop_column_resize(&self) -> bool {
        let finished = self.inner.column_resize.borrow_mut().take();
        if let Some(drag) = &finished {
            tracing::debug!(field = %drag.field, "column resize finished");
        }
        finished.is_some()
    }
}

impl SelectionApi for GridApi {
    fn select_row(&self, id: &RowId) -> Result<()> {
        self.select_row_with(id, false, None)
    }

    fn select_row_with(
        &self,
        id: &RowId,
        allow_multiple: bool,
        is_selected: Option<bool>,
    ) -> Result<()> {
        if !self.state().rows.contains(id) {
            return Err(GridError::RowNotFound(id.clone()));
        }
        let outcome = self.dispatch(GridAction::SelectRow {
            id: id.clone(),
            allow_multiple,
            is_selected,
        })?;
        match outcome {
            ActionOutcome::Selection(change) => {
                self.publish_selection_change(change)
            }
            _ => Ok(()),
        }
    }

    fn select_rows(&self, ids: &[RowId], is_selected: bool, reset_selection: bool) -> Result<()> {
        {
            let state = self.state();
            if let Some(missing) = ids.iter().find(|id| !state.rows.contains(id)) {
                return Err(GridError::RowNotFound(missing.clone()));
            }
        }
        let outcome = self.dispatch(GridAction::SelectRows {
            ids: ids.to_vec(),
            is_selected,
            reset_selection,
        })?;
        match outcome {
            ActionOutcome::Selection(change) => {
                self.publish_selection_change(change)
            }
            _ => Ok(()),
        }
    }

    fn get_selected_rows(&self) -> Vec<Rc<Row>> {
        let state = self.state();
        state
            .rows
            .rows
            .iter()
            .filter(|row| state.selection.contains(&row.id))
            .cloned()
            .collect()
    }

    fn is_row_selected(&self, id: &RowId) -> bool {
        self.state().selection.contains(id)
    }
}

impl SortApi for GridApi {
    fn set_sort_model(&self, model: SortModel) -> Result<()> {
        if !self.dispatch(GridAction::SetSortModel(model.clone()))?.is_changed() {
            return Ok(());
        }
        tracing::debug!(?model, "sort model changed");
        self.recompute()?;
        self.bus().publish(&GridEvent::SortModelChanged(model))
    }

    fn sort_column(&self, field: &str, multiple: bool) -> Result<()> {
        let column = self
            .get_column_from_field(field)
            .ok_or_else(|| GridError::ColumnNotFound(field.to_string()))?;
        if !column.sortable {
            return Ok(());
        }
        let next = {
            let state = self.state();
            let multiple = multiple && state.options.enable_multiple_columns_sorting;
            sorting::toggle_sort_model(&state.sort_model, field, multiple)
        };
        self.set_sort_model(next)
    }

    fn get_sort_model(&self) -> SortModel {
        self.state().sort_model.clone()
    }
}

impl PaginationApi for GridApi {
    fn set_page(&self, page: usize) -> Result<()> {
        let changed = self
            .dispatch(GridAction::Pagination(PaginationAction::SetPage { page }))?
            .is_changed();
        if !changed {
            return Ok(());
        }
        let (page, scroll) = {
            let state = self.state();
            (state.pagination.page, state.viewport.scroll)
        };
        tracing::debug!(page, "page changed");
        self.dispatch(GridAction::SetScroll(ScrollParams::new(scroll.left, 0.0)))?;
        self.recompute()?;
        self.bus().publish(&GridEvent::PageChanged(page))
    }

    fn set_page_size(&self, page_size: usize) -> Result<()> {
        let mut options = self.options();
        options.page_size = Some(page_size);
        self.set_options(options)
    }

    fn set_row_count(&self, row_count: usize) -> Result<()> {
        let changed = self
            .dispatch(GridAction::Pagination(PaginationAction::SetRowCount {
                total_row_count: row_count,
            }))?
            .is_changed();
        if changed {
            self.recompute()?;
        }
        Ok(())
    }

    fn set_pagination_mode(&self, mode: PaginationMode) -> Result<()> {
        let mut options = self.options();
        options.pagination_mode = mode;
        self.set_options(options)
    }

    fn get_pagination_state(&self) -> PaginationState {
        self.state().pagination.as_ref().clone()
    }
}

impl VirtualizationApi for GridApi {
    fn scroll_to_indexes(&self, cell: CellIndexCoordinates) -> Result<bool> {
        let target = {
            let state = self.state();
            let Some(container) = state.container_props.as_ref() else {
                return Ok(false);
            };
            let widths = column_widths(&self.visible_columns());
            virtualization::scroll_into_view(
                state.viewport.scroll,
                container,
                state.options.row_height,
                &widths,
                cell,
            )
        };
        match target {
            Some(params) => {
                tracing::debug!(row = cell.row_index, col = cell.col_index, "scrolling to cell");
                self.apply_scroll(params)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn scroll(&self, params: ScrollParams) -> Result<()> {
        self.apply_scroll(params)
    }

    fn get_render_context(&self) -> Option<RenderContext> {
        self.state().render_context.clone()
    }

    fn get_container_props_state(&self) -> Option<ContainerProps> {
        self.state().container_props.clone()
    }
}
