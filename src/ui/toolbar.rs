use dioxus::prelude::*;
use std::path::PathBuf;

use crate::api::{GridApi, SortApi};
use crate::ui::{actions, report};

#[component]
pub fn Toolbar(
    api: GridApi,
    revision: Signal<u64>,
    file_path: Signal<Option<PathBuf>>,
    error_message: Signal<Option<String>>,
) -> Element {
    let _ = revision.read();

    let options = api.options();
    let has_sort = !api.get_sort_model().is_empty();
    let file_label = file_path
        .read()
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "demo dataset".to_string());

    rsx! {
        div { class: "toolbar",
            div { class: "toolbar-group",
                button {
                    class: "toolbar-btn",
                    id: "btn-open",
                    onclick: {
                        let api = api.clone();
                        move |_| {
                            let api = api.clone();
                            spawn(async move {
                                actions::open_dataset(api, file_path, error_message).await;
                            });
                        }
                    },
                    "\u{1F4C2} Open"
                }
                button {
                    class: "toolbar-btn",
                    id: "btn-export",
                    onclick: {
                        let api = api.clone();
                        move |_| {
                            let api = api.clone();
                            spawn(async move {
                                actions::export_page(api, error_message).await;
                            });
                        }
                    },
                    "\u{1F4BE} Export page"
                }
                span { class: "toolbar-file", id: "file-label", "{file_label}" }
            }
            div { class: "toolbar-separator" }
            div { class: "toolbar-group",
                label { class: "toolbar-toggle",
                    input {
                        r#type: "checkbox",
                        id: "toggle-pagination",
                        checked: options.pagination,
                        onchange: {
                            let api = api.clone();
                            let options = options.clone();
                            move |evt: Event<FormData>| {
                                let mut next = options.clone();
                                next.pagination = evt.checked();
                                next.pagination_auto_page_size = next.page_size.is_none();
                                report(error_message, api.set_options(next));
                            }
                        }
                    }
                    "Paginate"
                }
                button {
                    class: "toolbar-btn",
                    id: "btn-clear-sort",
                    disabled: !has_sort,
                    onclick: move |_| report(error_message, api.set_sort_model(Vec::new())),
                    "Clear sort"
                }
            }
        }
    }
}
