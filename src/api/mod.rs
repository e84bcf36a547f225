mod handlers;
mod keyboard;
pub mod traits;

use std::cell::{Cell, Ref, RefCell};
use std::rc::{Rc, Weak};
use std::time::Instant;

use crate::error::Result;
use crate::state::data_model::{ColDef, ColumnResize, Columns, Row, RowId, RowView};
use crate::state::events::{EventBus, GridEvent, Subscription};
use crate::state::keyboard::CellIndexCoordinates;
use crate::state::options::{GridOptions, PaginationMode};
use crate::state::pagination::PaginationAction;
use crate::state::scheduler::{
    Clock, Scheduler, SystemClock, TimerKind, RESIZE_DEBOUNCE_DELAY, SCROLL_SETTLE_DELAY,
};
use crate::state::selection::SelectionChange;
use crate::state::selectors::GridSelectors;
use crate::state::store::{ActionOutcome, GridAction, GridState, GridStore};
use crate::state::virtualization::{
    self, ElementSize, RenderUpdate, ScrollParams, VirtualizationEngine, VirtualizationInputs,
};

pub use traits::{
    ColumnApi, EventsApi, GridCapabilities, PaginationApi, RowApi, SelectionApi, SortApi,
    StateApi, VirtualizationApi,
};

struct GridInner {
    store: GridStore,
    selectors: GridSelectors,
    scheduler: Scheduler,
    virtualization: RefCell<VirtualizationEngine>,
    subscriptions: RefCell<Vec<Subscription>>,
    /// Single-shot scroll listener of the last keyboard navigation.
    pending_focus: RefCell<Option<Subscription>>,
    column_resize: RefCell<Option<ColumnResize>>,
    disposed: Cell<bool>,
}

/// Handle over a mounted grid. Feature handlers are registered before
/// [`GridApi::new`] returns.
#[derive(Clone)]
pub struct GridApi {
    inner: Rc<GridInner>,
}

impl PartialEq for GridApi {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for GridApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridApi")
            .field("bus", self.inner.store.bus())
            .field("scheduler", &self.inner.scheduler)
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}

/// Non-owning handle captured by event handlers and timers.
#[derive(Clone)]
pub(crate) struct WeakGridApi(Weak<GridInner>);

impl WeakGridApi {
    pub(crate) fn upgrade(&self) -> Option<GridApi> {
        self.0
            .upgrade()
            .map(|inner| GridApi { inner })
            .filter(|api| !api.is_disposed())
    }
}

impl GridApi {
    pub fn new(options: GridOptions) -> Self {
        Self::with_clock(options, Rc::new(SystemClock))
    }

    pub fn with_clock(options: GridOptions, clock: Rc<dyn Clock>) -> Self {
        let bus = EventBus::new();
        let api = Self {
            inner: Rc::new(GridInner {
                store: GridStore::new(options, bus),
                selectors: GridSelectors::default(),
                scheduler: Scheduler::new(clock),
                virtualization: RefCell::new(VirtualizationEngine::new()),
                subscriptions: RefCell::new(Vec::new()),
                pending_focus: RefCell::new(None),
                column_resize: RefCell::new(None),
                disposed: Cell::new(false),
            }),
        };

        let mut subscriptions = keyboard::register(&api);
        subscriptions.extend(handlers::register(&api));
        *api.inner.subscriptions.borrow_mut() = subscriptions;
        tracing::debug!("grid api initialised");
        api
    }

    /// Builds a handle and loads the initial dataset into it.
    pub fn mount(options: GridOptions, rows: Vec<Row>, columns: Columns) -> Result<Self> {
        let api = Self::new(options);
        api.set_columns(columns)?;
        api.set_rows(rows)?;
        Ok(api)
    }

    pub(crate) fn downgrade(&self) -> WeakGridApi {
        WeakGridApi(Rc::downgrade(&self.inner))
    }

    pub fn bus(&self) -> &EventBus {
        self.inner.store.bus()
    }

    pub fn store(&self) -> &GridStore {
        &self.inner.store
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    pub(crate) fn state(&self) -> Ref<'_, GridState> {
        self.inner.store.get_state()
    }

    pub(crate) fn dispatch(&self, action: GridAction) -> Result<ActionOutcome> {
        self.inner.store.dispatch(action)
    }

    pub fn options(&self) -> GridOptions {
        self.state().options.clone()
    }

    pub fn set_options(&self, options: GridOptions) -> Result<()> {
        if self.dispatch(GridAction::SetOptions(options))?.is_changed() {
            tracing::debug!("options changed");
            self.recompute()?;
        }
        Ok(())
    }

    /// Rows of the current page joined with their selection flag.
    pub fn row_views(&self) -> Rc<Vec<RowView>> {
        let state = self.state();
        self.inner.selectors.row_views(&state)
    }

    pub fn page_rows(&self) -> Rc<Vec<Rc<Row>>> {
        let state = self.state();
        self.inner.selectors.page_rows(&state)
    }

    /// Ids of the current page, in display order.
    pub fn page_row_ids(&self) -> Vec<RowId> {
        self.page_rows().iter().map(|row| row.id.clone()).collect()
    }

    pub(crate) fn sorted_rows(&self) -> Rc<Vec<Rc<Row>>> {
        let state = self.state();
        self.inner.selectors.sorted_rows(&state)
    }

    pub(crate) fn visible_columns(&self) -> Rc<Vec<ColDef>> {
        let state = self.state();
        self.inner.selectors.visible_columns(&state)
    }

    pub(crate) fn page_row_index(&self, id: &RowId) -> Option<usize> {
        let state = self.state();
        self.inner.selectors.page_row_index(&state, id)
    }

    /// Debounced: bursts of resizes collapse into one recompute.
    pub fn resize(&self, root_size: ElementSize) {
        let weak = self.downgrade();
        self.inner
            .scheduler
            .schedule(TimerKind::ResizeRecompute, RESIZE_DEBOUNCE_DELAY, move || {
                match weak.upgrade() {
                    Some(api) => api.resize_now(root_size),
                    None => Ok(()),
                }
            });
    }

    /// Applies a new grid root size immediately.
    pub fn resize_now(&self, root_size: ElementSize) -> Result<()> {
        let header_height = self.state().options.header_height;
        let window = ElementSize::new(
            root_size.width.max(0.0),
            (root_size.height - header_height).max(0.0),
        );
        tracing::info!(width = window.width, height = window.height, "resized");
        if self.dispatch(GridAction::SetWindowSize(window))?.is_changed() {
            self.recompute()?;
            self.bus().publish(&GridEvent::Resize(window))?;
        }
        Ok(())
    }

    pub fn run_due_timers(&self) -> Result<usize> {
        self.inner.scheduler.run_due()
    }

    pub fn next_timer_deadline(&self) -> Option<Instant> {
        self.inner.scheduler.next_deadline()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Detaches every listener and cancels pending timers.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        self.inner.scheduler.cancel_all();
        for subscription in self.inner.subscriptions.borrow_mut().drain(..) {
            subscription.unsubscribe();
        }
        if let Some(pending) = self.inner.pending_focus.borrow_mut().take() {
            pending.unsubscribe();
        }
        self.inner.column_resize.borrow_mut().take();
        self.bus().clear();
        self.inner.virtualization.borrow_mut().reset();
        self.inner.selectors.clear();
        tracing::debug!("grid api disposed");
    }

    pub(crate) fn replace_pending_focus(&self, next: Option<Subscription>) {
        let previous = std::mem::replace(&mut *self.inner.pending_focus.borrow_mut(), next);
        if let Some(previous) = previous {
            previous.unsubscribe();
        }
    }

    /// Publishes every event even when an earlier one fails; returns the
    /// first failure.
    pub(crate) fn emit(&self, events: impl IntoIterator<Item = GridEvent>) -> Result<()> {
        let mut first_error = None;
        for event in events {
            if let Err(err) = self.bus().publish(&event) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub(crate) fn publish_selection_change(&self, change: SelectionChange) -> Result<()> {
        if change.is_empty() {
            return Ok(());
        }
        let selected_ids = {
            let state = self.state();
            state.selection.ordered_ids(&state.rows)
        };
        let added = change.added.into_iter().map(|id| GridEvent::RowSelected {
            id,
            selected: true,
        });
        let removed = change.removed.into_iter().map(|id| GridEvent::RowSelected {
            id,
            selected: false,
        });
        self.emit(
            added
                .chain(removed)
                .chain(std::iter::once(GridEvent::SelectionChanged(selected_ids))),
        )
    }

    /// Re-derives pagination, container sizes and the render context from
    /// the current state. Runs to completion before returning.
    pub(crate) fn recompute(&self) -> Result<()> {
        if self.is_disposed() {
            return Ok(());
        }
        self.sync_pagination()?;
        self.sync_container()?;
        self.clamp_focus()?;
        self.update_render_context()
    }

    fn sync_pagination(&self) -> Result<()> {
        let (options, row_count, auto_page_size) = {
            let state = self.state();
            let widths = column_widths(&self.inner.selectors.visible_columns(&state));
            let auto_page_size = virtualization::compute_container_props(
                state.viewport.window_size,
                state.rows.len(),
                state.options.row_height,
                &widths,
                state.options.scrollbar_size,
            )
            .map(|props| props.viewport_page_size)
            .unwrap_or(0);
            (state.options.clone(), state.rows.len(), auto_page_size)
        };

        self.dispatch(GridAction::Pagination(PaginationAction::SetPaginationMode {
            pagination_mode: options.pagination_mode,
        }))?;
        if options.pagination_mode == PaginationMode::Client {
            self.dispatch(GridAction::Pagination(PaginationAction::SetRowCount {
                total_row_count: row_count,
            }))?;
        }

        let page_size = if options.pagination {
            options.effective_page_size(auto_page_size)
        } else {
            0
        };
        let resized = self.dispatch(GridAction::Pagination(PaginationAction::SetPageSize {
            page_size,
        }))?;
        if resized.is_changed() {
            tracing::debug!(page_size, "page size changed");
            self.bus().publish(&GridEvent::PageSizeChanged(page_size))?;
        }
        Ok(())
    }

    fn sync_container(&self) -> Result<()> {
        let (props, scroll) = {
            let state = self.state();
            let row_count = self.inner.selectors.page_rows(&state).len();
            let widths = column_widths(&self.inner.selectors.visible_columns(&state));
            let props = virtualization::compute_container_props(
                state.viewport.window_size,
                row_count,
                state.options.row_height,
                &widths,
                state.options.scrollbar_size,
            );
            (props, state.viewport.scroll)
        };

        if let Some(clamped) = props.as_ref().map(|props| props.clamp_scroll(scroll)) {
            if clamped != scroll {
                self.dispatch(GridAction::SetScroll(clamped))?;
            }
        }
        self.dispatch(GridAction::SetContainerProps(props))?;
        Ok(())
    }

    fn clamp_focus(&self) -> Result<()> {
        let (focus_gone, highlight_gone) = {
            let state = self.state();
            let row_count = self.inner.selectors.page_rows(&state).len();
            let col_count = self.inner.selectors.visible_columns(&state).len();
            let outside = |cell: Option<CellIndexCoordinates>| {
                cell.is_some_and(|cell| cell.row_index >= row_count || cell.col_index >= col_count)
            };
            (
                outside(state.keyboard.focused_cell),
                outside(state.keyboard.highlighted_cell),
            )
        };
        if focus_gone {
            self.dispatch(GridAction::SetFocusedCell(None))?;
        }
        if highlight_gone {
            self.dispatch(GridAction::SetHighlightedCell(None))?;
        }
        Ok(())
    }

    fn virtualization_inputs(&self) -> VirtualizationInputs {
        let state = self.state();
        VirtualizationInputs {
            scroll: state.viewport.scroll,
            window_size: state.viewport.window_size,
            row_height: state.options.row_height,
            row_count: self.inner.selectors.page_rows(&state).len(),
            column_widths: column_widths(&self.inner.selectors.visible_columns(&state)),
            row_overscan: state.options.row_overscan,
            column_overscan: state.options.column_overscan,
            scrollbar_size: state.options.scrollbar_size,
            page: state.pagination.page,
        }
    }

    pub(crate) fn update_render_context(&self) -> Result<()> {
        let inputs = self.virtualization_inputs();
        let update = self.inner.virtualization.borrow_mut().update(inputs);
        match update {
            RenderUpdate::Unchanged => Ok(()),
            RenderUpdate::Withheld => {
                tracing::debug!("container not measured, render context withheld");
                self.dispatch(GridAction::SetRenderContext(None))?;
                self.bus().publish(&GridEvent::RenderContextChanged)
            }
            RenderUpdate::Changed(context) => {
                tracing::debug!(
                    page = context.page,
                    first_col = context.first_col_idx,
                    last_col = context.last_col_idx,
                    first_row = context.first_row_idx,
                    last_row = context.last_row_idx,
                    "render context updated"
                );
                self.dispatch(GridAction::SetRenderContext(Some(context)))?;
                self.bus().publish(&GridEvent::RenderContextChanged)
            }
        }
    }

    pub(crate) fn apply_scroll(&self, params: ScrollParams) -> Result<()> {
        let (current, target, scrolling) = {
            let state = self.state();
            let target = match state.container_props.as_ref() {
                Some(props) => props.clamp_scroll(params),
                None => ScrollParams::new(params.left.max(0.0), params.top.max(0.0)),
            };
            (state.viewport.scroll, target, state.viewport.scrolling)
        };
        if target == current {
            return Ok(());
        }

        tracing::debug!(left = target.left, top = target.top, "moving rendering zone");
        self.dispatch(GridAction::SetScroll(target))?;
        if !scrolling {
            self.dispatch(GridAction::SetScrolling(true))?;
        }
        self.update_render_context()?;
        self.arm_scroll_settle();
        self.bus().publish(&GridEvent::Scrolling { active: true })
    }

    fn arm_scroll_settle(&self) {
        let weak = self.downgrade();
        self.inner
            .scheduler
            .schedule(TimerKind::ScrollSettle, SCROLL_SETTLE_DELAY, move || {
                match weak.upgrade() {
                    Some(api) => api.settle_scroll(),
                    None => Ok(()),
                }
            });
    }

    fn settle_scroll(&self) -> Result<()> {
        if self.dispatch(GridAction::SetScrolling(false))?.is_changed() {
            tracing::debug!("scroll settled, pointer events restored");
            self.bus().publish(&GridEvent::Scrolling { active: false })?;
        }
        Ok(())
    }
}

pub(crate) fn column_widths(columns: &[ColDef]) -> Vec<f64> {
    columns.iter().map(|col| col.width).collect()
}
