use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::error::Result;
use crate::state::data_model::{Columns, RowId, RowsState};
use crate::state::events::{EventBus, GridEvent};
use crate::state::keyboard::CellIndexCoordinates;
use crate::state::options::GridOptions;
use crate::state::pagination::{self, PaginationAction, PaginationState};
use crate::state::selection::{self, SelectionChange, SelectionState};
use crate::state::sorting::SortModel;
use crate::state::virtualization::{ContainerProps, ElementSize, RenderContext, ScrollParams};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewportState {
    /// Size of the scrollable window (grid root minus the header).
    pub window_size: ElementSize,
    pub scroll: ScrollParams,
    pub scrolling: bool,
    /// Pointer events on the rendering zone are ignored while scrolling.
    pub pointer_events_blocked: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyboardState {
    pub multiple_key_pressed: bool,
    pub focused_cell: Option<CellIndexCoordinates>,
    /// Cell painted as focused. Trails `focused_cell` until the focus
    /// handoff publishes `CellFocused`.
    pub highlighted_cell: Option<CellIndexCoordinates>,
}

/// Per-slice change counters; selectors memoize on them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Revisions {
    pub options: u64,
    pub rows: u64,
    pub columns: u64,
    pub sorting: u64,
    pub pagination: u64,
    pub selection: u64,
    pub viewport: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GridState {
    pub options: GridOptions,
    pub rows: RowsState,
    pub columns: Columns,
    pub sort_model: SortModel,
    pub pagination: Rc<PaginationState>,
    pub selection: SelectionState,
    pub viewport: ViewportState,
    pub keyboard: KeyboardState,
    pub container_props: Option<ContainerProps>,
    pub render_context: Option<RenderContext>,
    pub clipboard: Option<String>,
    pub revisions: Revisions,
}

impl GridState {
    pub fn new(options: GridOptions) -> Self {
        let pagination = Rc::new(PaginationState {
            pagination_mode: options.pagination_mode,
            ..PaginationState::default()
        });
        Self {
            options,
            rows: RowsState::default(),
            columns: Columns::new(),
            sort_model: SortModel::new(),
            pagination,
            selection: SelectionState::default(),
            viewport: ViewportState::default(),
            keyboard: KeyboardState::default(),
            container_props: None,
            render_context: None,
            clipboard: None,
            revisions: Revisions::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GridAction {
    SetOptions(GridOptions),
    SetRows(RowsState),
    SetColumns(Columns),
    SetSortModel(SortModel),
    Pagination(PaginationAction),
    SelectRow {
        id: RowId,
        allow_multiple: bool,
        is_selected: Option<bool>,
    },
    SelectRows {
        ids: Vec<RowId>,
        is_selected: bool,
        reset_selection: bool,
    },
    PruneSelection,
    SetWindowSize(ElementSize),
    SetScroll(ScrollParams),
    SetScrolling(bool),
    SetMultipleKeyPressed(bool),
    SetFocusedCell(Option<CellIndexCoordinates>),
    SetHighlightedCell(Option<CellIndexCoordinates>),
    SetContainerProps(Option<ContainerProps>),
    SetRenderContext(Option<RenderContext>),
    SetClipboard(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Unchanged,
    Changed,
    Selection(SelectionChange),
}

impl ActionOutcome {
    pub fn is_changed(&self) -> bool {
        match self {
            Self::Unchanged => false,
            Self::Changed => true,
            Self::Selection(change) => !change.is_empty(),
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, next: T, revision: &mut u64) -> ActionOutcome {
    if *slot == next {
        return ActionOutcome::Unchanged;
    }
    *slot = next;
    *revision += 1;
    ActionOutcome::Changed
}

fn selection_outcome(change: SelectionChange, revision: &mut u64) -> ActionOutcome {
    if !change.is_empty() {
        *revision += 1;
    }
    ActionOutcome::Selection(change)
}

/// Applies one transition to the state tree.
pub fn reduce(state: &mut GridState, action: GridAction) -> ActionOutcome {
    let revisions = &mut state.revisions;
    match action {
        GridAction::SetOptions(options) => replace(&mut state.options, options, &mut revisions.options),
        GridAction::SetRows(rows) => replace(&mut state.rows, rows, &mut revisions.rows),
        GridAction::SetColumns(columns) => {
            replace(&mut state.columns, columns, &mut revisions.columns)
        }
        GridAction::SetSortModel(model) => {
            replace(&mut state.sort_model, model, &mut revisions.sorting)
        }
        GridAction::Pagination(action) => {
            let next = pagination::pagination_reducer(&state.pagination, &action);
            if Rc::ptr_eq(&next, &state.pagination) {
                return ActionOutcome::Unchanged;
            }
            state.pagination = next;
            revisions.pagination += 1;
            ActionOutcome::Changed
        }
        GridAction::SelectRow {
            id,
            allow_multiple,
            is_selected,
        } => {
            let change =
                selection::select_row(&mut state.selection, &id, allow_multiple, is_selected);
            selection_outcome(change, &mut revisions.selection)
        }
        GridAction::SelectRows {
            ids,
            is_selected,
            reset_selection,
        } => {
            let change = selection::select_rows(
                &mut state.selection,
                &ids,
                is_selected,
                reset_selection,
                state.options.enable_multiple_selection,
            );
            selection_outcome(change, &mut revisions.selection)
        }
        GridAction::PruneSelection => {
            let change = selection::retain_existing(&mut state.selection, &state.rows);
            selection_outcome(change, &mut revisions.selection)
        }
        GridAction::SetWindowSize(size) => replace(
            &mut state.viewport.window_size,
            size,
            &mut revisions.viewport,
        ),
        GridAction::SetScroll(scroll) => {
            replace(&mut state.viewport.scroll, scroll, &mut revisions.viewport)
        }
        GridAction::SetScrolling(scrolling) => {
            let next = ViewportState {
                scrolling,
                pointer_events_blocked: scrolling,
                ..state.viewport.clone()
            };
            replace(&mut state.viewport, next, &mut revisions.viewport)
        }
        GridAction::SetMultipleKeyPressed(pressed) => {
            let mut unused = 0;
            replace(&mut state.keyboard.multiple_key_pressed, pressed, &mut unused)
        }
        GridAction::SetFocusedCell(cell) => {
            let mut unused = 0;
            replace(&mut state.keyboard.focused_cell, cell, &mut unused)
        }
        GridAction::SetHighlightedCell(cell) => {
            let mut unused = 0;
            replace(&mut state.keyboard.highlighted_cell, cell, &mut unused)
        }
        GridAction::SetContainerProps(props) => {
            let mut unused = 0;
            replace(&mut state.container_props, props, &mut unused)
        }
        GridAction::SetRenderContext(context) => {
            let mut unused = 0;
            replace(&mut state.render_context, context, &mut unused)
        }
        GridAction::SetClipboard(text) => {
            let mut unused = 0;
            replace(&mut state.clipboard, Some(text), &mut unused)
        }
    }
}

/// Changes go through [`GridStore::dispatch`], which bumps the touched
/// slice's revision.
#[derive(Debug)]
pub struct GridStore {
    state: RefCell<GridState>,
    bus: EventBus,
}

impl GridStore {
    pub fn new(options: GridOptions, bus: EventBus) -> Self {
        Self {
            state: RefCell::new(GridState::new(options)),
            bus,
        }
    }

    pub fn get_state(&self) -> Ref<'_, GridState> {
        self.state.borrow()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Applies `action` and, when something changed, publishes
    /// [`GridEvent::StateChanged`] after the borrow is released.
    pub fn dispatch(&self, action: GridAction) -> Result<ActionOutcome> {
        let outcome = {
            let mut state = self.state.borrow_mut();
            reduce(&mut state, action)
        };
        if outcome.is_changed() {
            self.bus.publish(&GridEvent::StateChanged)?;
        }
        Ok(outcome)
    }
}
