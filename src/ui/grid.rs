use dioxus::prelude::*;
use std::rc::Rc;

use crate::api::{ColumnApi, EventsApi, GridApi, SortApi, StateApi, VirtualizationApi};
use crate::state::data_model::{ColDef, Row, RowId};
use crate::state::events::GridEvent;
use crate::state::keyboard::{CellIndexCoordinates, KeyCode, KeyInput};
use crate::state::sorting::{self, SortDirection};
use crate::state::virtualization::{ElementSize, ScrollParams};
use crate::ui::report;

#[component]
pub fn Grid(api: GridApi, revision: Signal<u64>, error_message: Signal<Option<String>>) -> Element {
    let _ = revision.read();

    let options = api.options();
    let columns = api.get_visible_columns();
    let sort_model = api.get_sort_model();
    let rows = api.row_views();
    let context = api.get_render_context();
    let container = api.get_container_props_state();
    let (scroll, pointer_blocked, focused) = {
        let state = api.get_state();
        (
            state.viewport.scroll,
            state.viewport.pointer_events_blocked,
            state.keyboard.highlighted_cell,
        )
    };
    let pointer_events = if pointer_blocked { "none" } else { "auto" };
    let extend_width = match (&container, options.disable_extend_row_full_width) {
        (Some(props), false) => props.extend_row_width(),
        _ => 0.0,
    };

    rsx! {
        div {
            class: "grid-root",
            id: "grid-root",
            tabindex: 0,
            onresize: {
                let api = api.clone();
                move |evt: Event<ResizeData>| {
                    if let Ok(size) = evt.get_border_box_size() {
                        api.resize(ElementSize::new(size.width, size.height));
                    }
                }
            },
            onmounted: {
                let api = api.clone();
                move |evt: Event<MountedData>| {
                    let api = api.clone();
                    async move {
                        if let Ok(rect) = evt.get_client_rect().await {
                            let size = ElementSize::new(rect.size.width, rect.size.height);
                            report(error_message, api.resize_now(size));
                        }
                    }
                }
            },
            onkeydown: {
                let api = api.clone();
                move |evt: Event<KeyboardData>| {
                    let input = key_input(&evt);
                    if input.code.is_navigation() || input.is_command() && input.code.is_char('a') {
                        evt.prevent_default();
                    }
                    report(error_message, api.publish_event(GridEvent::KeyDown(input)));
                }
            },
            onkeyup: {
                let api = api.clone();
                move |evt: Event<KeyboardData>| {
                    report(error_message, api.publish_event(GridEvent::KeyUp(key_input(&evt))));
                }
            },
            onfocusout: {
                let api = api.clone();
                move |_| report(error_message, api.publish_event(GridEvent::FocusOut))
            },
            onmousemove: {
                let api = api.clone();
                move |evt: Event<MouseData>| {
                    report(error_message, api.drag_column_resize(evt.client_coordinates().x));
                }
            },
            onmouseup: {
                let api = api.clone();
                move |_| {
                    api.stop_column_resize();
                }
            },

            div {
                class: "grid-header",
                style: "height: {options.header_height}px;",
                div {
                    class: "grid-header-inner",
                    style: "transform: translateX({-scroll.left}px);",
                    if let Some(ctx) = context.as_ref() {
                        div { class: "grid-empty-cell", style: "width: {ctx.left_empty_width}px;" }
                        for (col_index, col) in window(&columns, ctx.first_col_idx, ctx.last_col_idx) {
                            HeaderCell {
                                key: "{col.field}",
                                api: api.clone(),
                                column: col.clone(),
                                direction: sorting::sort_direction_for(&sort_model, &col.field),
                                col_index,
                                error_message,
                            }
                        }
                        div { class: "grid-empty-cell", style: "width: {ctx.right_empty_width}px;" }
                    } else {
                        for (col_index, col) in columns.iter().enumerate() {
                            HeaderCell {
                                key: "{col.field}",
                                api: api.clone(),
                                column: col.clone(),
                                direction: sorting::sort_direction_for(&sort_model, &col.field),
                                col_index,
                                error_message,
                            }
                        }
                    }
                }
            }

            div {
                class: "grid-window",
                style: "height: calc(100% - {options.header_height}px);",
                onwheel: {
                    let api = api.clone();
                    move |evt: Event<WheelData>| {
                        let delta = evt.delta().strip_units();
                        let next = ScrollParams::new(scroll.left + delta.x, scroll.top + delta.y);
                        report(error_message, api.scroll(next));
                    }
                },
                if let Some(ctx) = context {
                    if rows.is_empty() {
                        div { class: "grid-overlay", "No rows" }
                    } else {
                        div {
                            class: "data-container",
                            style: "width: {ctx.data_container_sizes.width + extend_width}px; height: {ctx.data_container_sizes.height}px; transform: translate({-scroll.left}px, {-scroll.top}px);",
                            div {
                                class: "rendering-zone",
                                style: "top: {ctx.rendering_zone.top}px; left: {ctx.left_empty_width}px; pointer-events: {pointer_events};",
                                for (row_index, view) in window(&rows, ctx.first_row_idx, ctx.last_row_idx) {
                                    GridRow {
                                        key: "{view.row.id}",
                                        api: api.clone(),
                                        row: Rc::clone(&view.row),
                                        selected: view.selected,
                                        row_index,
                                        first_col_idx: ctx.first_col_idx,
                                        columns: window(&columns, ctx.first_col_idx, ctx.last_col_idx)
                                            .map(|(_, col)| col.clone())
                                            .collect::<Vec<_>>(),
                                        row_height: options.row_height,
                                        extend_width: extend_width + ctx.right_empty_width,
                                        show_right_border: options.show_cell_right_border,
                                        focused_col: focused
                                            .filter(|cell| cell.row_index == row_index)
                                            .map(|cell| cell.col_index),
                                        error_message,
                                    }
                                }
                            }
                        }
                    }
                } else {
                    div { class: "grid-overlay", "Loading..." }
                }
            }
        }
    }
}

#[component]
fn HeaderCell(
    api: GridApi,
    column: ColDef,
    direction: Option<SortDirection>,
    col_index: usize,
    error_message: Signal<Option<String>>,
) -> Element {
    let arrow = match direction {
        Some(SortDirection::Asc) => "\u{2191}",
        Some(SortDirection::Desc) => "\u{2193}",
        None => "",
    };
    let class = if column.sortable {
        "grid-header-cell sortable"
    } else {
        "grid-header-cell"
    };
    let field = column.field.clone();
    let resize_field = column.field.clone();

    rsx! {
        div {
            class,
            id: "header-{field}",
            "aria-colindex": "{col_index}",
            style: "width: {column.width}px;",
            onclick: {
                let api = api.clone();
                move |_| {
                    let event = GridEvent::ColumnHeaderClick { field: field.clone() };
                    report(error_message, api.publish_event(event));
                }
            },
            span { class: "grid-header-title", "{column.header_label()}" }
            span { class: "grid-sort-icon", "{arrow}" }
            div {
                class: "grid-column-separator",
                onmousedown: move |evt: Event<MouseData>| {
                    evt.stop_propagation();
                    evt.prevent_default();
                    let x = evt.client_coordinates().x;
                    report(error_message, api.start_column_resize(&resize_field, x));
                },
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),
            }
        }
    }
}

#[component]
fn GridRow(
    api: GridApi,
    row: Rc<Row>,
    selected: bool,
    row_index: usize,
    first_col_idx: usize,
    columns: Vec<ColDef>,
    row_height: f64,
    extend_width: f64,
    show_right_border: bool,
    focused_col: Option<usize>,
    error_message: Signal<Option<String>>,
) -> Element {
    let mut class = if row_index % 2 == 0 { "grid-row even" } else { "grid-row odd" }.to_string();
    if selected {
        class.push_str(" selected");
    }
    let id: RowId = row.id.clone();

    rsx! {
        div {
            class: "{class}",
            "data-id": "{id}",
            "data-rowindex": "{row_index}",
            style: "height: {row_height}px;",
            onclick: {
                let api = api.clone();
                move |_| report(error_message, api.publish_event(GridEvent::RowClick { id: id.clone() }))
            },
            for (offset, col) in columns.iter().enumerate() {
                div {
                    key: "{col.field}",
                    class: cell_class(focused_col == Some(first_col_idx + offset), show_right_border),
                    "aria-colindex": "{first_col_idx + offset}",
                    style: "width: {col.width}px; line-height: {row_height}px;",
                    onclick: {
                        let api = api.clone();
                        let cell = CellIndexCoordinates::new(row_index, first_col_idx + offset);
                        move |_| report(error_message, api.publish_event(GridEvent::CellClick(cell)))
                    },
                    "{col.formatted_value(&row)}"
                }
            }
            div { class: "grid-cell filler", style: "width: {extend_width}px;" }
        }
    }
}

/// Items in `[first, last)` with their absolute index; tolerates a stale window.
fn window<T>(items: &[T], first: usize, last: usize) -> impl Iterator<Item = (usize, &T)> {
    let last = last.min(items.len());
    let first = first.min(last);
    items[first..last]
        .iter()
        .enumerate()
        .map(move |(offset, item)| (first + offset, item))
}

fn cell_class(focused: bool, show_right_border: bool) -> String {
    let mut class = String::from("grid-cell");
    if focused {
        class.push_str(" focused");
    }
    if show_right_border {
        class.push_str(" with-border");
    }
    class
}

fn key_input(evt: &Event<KeyboardData>) -> KeyInput {
    let modifiers = evt.modifiers();
    KeyInput {
        code: KeyCode::from_key(&evt.key().to_string()),
        ctrl: modifiers.contains(Modifiers::CONTROL),
        meta: modifiers.contains(Modifiers::META),
        shift: modifiers.contains(Modifiers::SHIFT),
    }
}
