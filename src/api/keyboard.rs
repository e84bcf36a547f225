use std::time::Duration;

use crate::api::traits::{ColumnApi, RowApi, SelectionApi, VirtualizationApi};
use crate::api::GridApi;
use crate::error::Result;
use crate::state::data_model::RowId;
use crate::state::events::{GridEvent, GridEventKind, Subscription};
use crate::state::keyboard::{self, CellIndexCoordinates, KeyCode, KeyInput, NavigationBounds};
use crate::state::scheduler::TimerKind;
use crate::state::selection;
use crate::state::store::GridAction;

pub(crate) fn register(api: &GridApi) -> Vec<Subscription> {
    let bus = api.bus();

    let weak = api.downgrade();
    let key_down = bus.subscribe(GridEventKind::KeyDown, move |event| match (event, weak.upgrade()) {
        (GridEvent::KeyDown(input), Some(api)) => on_key_down(&api, input),
        _ => Ok(()),
    });

    let weak = api.downgrade();
    let key_up = bus.subscribe(GridEventKind::KeyUp, move |event| match (event, weak.upgrade()) {
        (GridEvent::KeyUp(input), Some(api)) if input.code.is_multiple_key() => {
            tracing::debug!("multiple select key released");
            api.bus().publish(&GridEvent::MultipleKeyPressChanged(false))
        }
        _ => Ok(()),
    });

    let weak = api.downgrade();
    let focus_out = bus.subscribe(GridEventKind::FocusOut, move |_| match weak.upgrade() {
        Some(api) => {
            tracing::debug!("grid lost focus, releasing key press");
            api.bus().publish(&GridEvent::MultipleKeyPressChanged(false))
        }
        None => Ok(()),
    });

    let weak = api.downgrade();
    let multiple_key = bus.subscribe(GridEventKind::MultipleKeyPressChanged, move |event| {
        match (event, weak.upgrade()) {
            (GridEvent::MultipleKeyPressChanged(pressed), Some(api)) => api
                .dispatch(GridAction::SetMultipleKeyPressed(*pressed))
                .map(|_| ()),
            _ => Ok(()),
        }
    });

    let weak = api.downgrade();
    let cell_click = bus.subscribe(GridEventKind::CellClick, move |event| match (event, weak.upgrade()) {
        (GridEvent::CellClick(cell), Some(api)) => {
            api.dispatch(GridAction::SetFocusedCell(Some(*cell)))?;
            api.bus().publish(&GridEvent::CellFocused(*cell))
        }
        _ => Ok(()),
    });

    let weak = api.downgrade();
    let cell_focused = bus.subscribe(GridEventKind::CellFocused, move |event| {
        match (event, weak.upgrade()) {
            (GridEvent::CellFocused(cell), Some(api)) => api
                .dispatch(GridAction::SetHighlightedCell(Some(*cell)))
                .map(|_| ()),
            _ => Ok(()),
        }
    });

    vec![key_down, key_up, focus_out, multiple_key, cell_click, cell_focused]
}

fn on_key_down(api: &GridApi, input: &KeyInput) -> Result<()> {
    if input.code.is_multiple_key() {
        tracing::debug!("multiple select key pressed");
        return api.bus().publish(&GridEvent::MultipleKeyPressChanged(true));
    }

    let Some(current) = api.state().keyboard.focused_cell else {
        return Ok(());
    };

    if input.code.is_space() && input.shift {
        return select_active_row(api, current);
    }
    if input.code.is_navigation() {
        if input.shift {
            return expand_selection(api, &input.code, current);
        }
        return navigate_cells(api, &input.code, current, input.is_command()).map(|_| ());
    }
    if input.is_command() && input.code.is_char('c') {
        return copy_focused(api, current);
    }
    if input.is_command() && input.code.is_char('a') {
        let ids = api.get_all_row_ids();
        return api.select_rows(&ids, true, false);
    }
    Ok(())
}

fn navigation_bounds(api: &GridApi) -> NavigationBounds {
    let page_size = api
        .get_container_props_state()
        .map(|props| props.viewport_page_size)
        .unwrap_or(0);
    NavigationBounds {
        row_count: api.page_rows().len(),
        col_count: api.visible_columns().len(),
        page_size,
    }
}

/// Moves focus for `code` and scrolls the target into view. The focus
/// handoff happens once the scroll has been announced.
pub(crate) fn navigate_cells(
    api: &GridApi,
    code: &KeyCode,
    current: CellIndexCoordinates,
    is_ctrl_pressed: bool,
) -> Result<CellIndexCoordinates> {
    let bounds = navigation_bounds(api);
    if bounds.row_count == 0 || bounds.col_count == 0 {
        return Ok(current);
    }
    let next = keyboard::next_cell_indexes(code, current, is_ctrl_pressed, bounds)?;

    api.scheduler().cancel(TimerKind::FocusHandoff);
    api.dispatch(GridAction::SetFocusedCell(Some(next)))?;

    let weak = api.downgrade();
    let listener = api.bus().once(GridEventKind::Scrolling, move |_| {
        if let Some(api) = weak.upgrade() {
            arm_focus_handoff(&api, next);
        }
        Ok(())
    });
    api.replace_pending_focus(Some(listener));

    if !api.scroll_to_indexes(next)? {
        api.replace_pending_focus(None);
        arm_focus_handoff(api, next);
    }
    Ok(next)
}

fn arm_focus_handoff(api: &GridApi, cell: CellIndexCoordinates) {
    let weak = api.downgrade();
    api.scheduler()
        .schedule(TimerKind::FocusHandoff, Duration::ZERO, move || {
            let Some(api) = weak.upgrade() else {
                return Ok(());
            };
            let mounted = api
                .get_render_context()
                .is_some_and(|context| context.contains(cell));
            if !mounted {
                return Ok(());
            }
            tracing::debug!(
                row = cell.row_index,
                col = cell.col_index,
                "focusing on cell"
            );
            api.bus().publish(&GridEvent::CellFocused(cell))
        });
}

fn select_active_row(api: &GridApi, current: CellIndexCoordinates) -> Result<()> {
    match api.get_row_id_from_row_index(current.row_index) {
        Some(id) => api.select_row(&id),
        None => Ok(()),
    }
}

fn expand_selection(api: &GridApi, code: &KeyCode, current: CellIndexCoordinates) -> Result<()> {
    let selected_indexes: Vec<usize> = api
        .get_selected_rows()
        .iter()
        .filter_map(|row| api.get_row_index_from_id(&row.id))
        .collect();
    let anchor = selection::selection_anchor(current.row_index, &selected_indexes);

    let next = navigate_cells(api, code, current, false)?;
    let ids: Vec<RowId> = selection::range_between(anchor, next.row_index)
        .filter_map(|idx| api.get_row_id_from_row_index(idx))
        .collect();

    tracing::debug!(from = anchor, to = next.row_index, "selecting row range");
    api.select_rows(&ids, true, true)
}

/// Copies the focused row when it is selected, the focused cell otherwise.
fn copy_focused(api: &GridApi, current: CellIndexCoordinates) -> Result<()> {
    let Some(row) = api.page_rows().get(current.row_index).cloned() else {
        return Ok(());
    };
    let columns = api.get_visible_columns();

    let text = if api.is_row_selected(&row.id) {
        columns
            .iter()
            .map(|col| col.formatted_value(&row))
            .collect::<Vec<_>>()
            .join("\t")
    } else {
        match columns.get(current.col_index) {
            Some(col) => col.formatted_value(&row),
            None => return Ok(()),
        }
    };

    api.dispatch(GridAction::SetClipboard(text.clone()))?;
    api.bus().publish(&GridEvent::CopyRequested(text))
}
