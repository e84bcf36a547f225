use crate::api::traits::{SelectionApi, SortApi};
use crate::api::GridApi;
use crate::state::events::{GridEvent, GridEventKind, Subscription};

pub(crate) fn register(api: &GridApi) -> Vec<Subscription> {
    let bus = api.bus();

    let weak = api.downgrade();
    let row_click = bus.subscribe(GridEventKind::RowClick, move |event| match (event, weak.upgrade()) {
        (GridEvent::RowClick { id }, Some(api)) => {
            let allow_multiple = {
                let state = api.state();
                if state.viewport.pointer_events_blocked {
                    return Ok(());
                }
                state.keyboard.multiple_key_pressed && state.options.enable_multiple_selection
            };
            api.select_row_with(id, allow_multiple, None)
        }
        _ => Ok(()),
    });

    let weak = api.downgrade();
    let header_click =
        bus.subscribe(GridEventKind::ColumnHeaderClick, move |event| match (event, weak.upgrade()) {
            (GridEvent::ColumnHeaderClick { field }, Some(api)) => {
                let multiple = api.state().keyboard.multiple_key_pressed;
                api.sort_column(field, multiple)
            }
            _ => Ok(()),
        });

    vec![row_click, header_click]
}
