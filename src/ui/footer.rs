use dioxus::prelude::*;

use crate::api::{GridApi, PaginationApi, RowApi, StateApi};
use crate::ui::report;

const PAGE_SIZE_CHOICES: [usize; 4] = [25, 50, 100, 500];

#[component]
pub fn Footer(api: GridApi, revision: Signal<u64>, error_message: Signal<Option<String>>) -> Element {
    let _ = revision.read();

    let options = api.options();
    let pagination = api.get_pagination_state();
    let total_rows = api.get_rows_count();
    let selected = api.get_state().selection.len();
    let page = pagination.page;
    let page_count = pagination.page_count;

    rsx! {
        div { class: "grid-footer", id: "grid-footer",
            span { class: "footer-count", id: "selected-count",
                if selected > 0 {
                    "{selected} row(s) selected"
                }
            }
            span { class: "footer-count", id: "total-count", "Total rows: {total_rows}" }
            if let Some(message) = error_message.read().as_ref() {
                span { class: "error-message", id: "error-message", "{message}" }
            }
            if options.pagination {
                div { class: "pagination", id: "pagination",
                    select {
                        class: "toolbar-select toolbar-select-sm",
                        id: "select-page-size",
                        value: "{pagination.page_size}",
                        onchange: {
                            let api = api.clone();
                            move |evt: Event<FormData>| {
                                if let Ok(size) = evt.value().parse::<usize>() {
                                    report(error_message, api.set_page_size(size));
                                }
                            }
                        },
                        if !PAGE_SIZE_CHOICES.contains(&pagination.page_size) {
                            option { value: "{pagination.page_size}", "{pagination.page_size}" }
                        }
                        for size in PAGE_SIZE_CHOICES {
                            option { value: "{size}", "{size}" }
                        }
                    }
                    button {
                        class: "toolbar-btn",
                        id: "btn-prev-page",
                        disabled: page <= 1,
                        onclick: {
                            let api = api.clone();
                            move |_| report(error_message, api.set_page(page.saturating_sub(1)))
                        },
                        "\u{2039}"
                    }
                    span { class: "page-indicator", "{page} / {page_count}" }
                    button {
                        class: "toolbar-btn",
                        id: "btn-next-page",
                        disabled: page >= page_count,
                        onclick: move |_| report(error_message, api.set_page(page + 1)),
                        "\u{203A}"
                    }
                }
            }
        }
    }
}
