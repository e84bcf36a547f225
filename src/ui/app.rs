use dioxus::prelude::*;
use serde_json::json;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use crate::api::{ColumnApi, EventsApi, GridApi, RowApi};
use crate::io::json_io;
use crate::state::data_model::{ColDef, Columns, Record, Row};
use crate::state::events::GridEventKind;
use crate::state::options::{self, GridOptions};
use crate::ui::footer::Footer;
use crate::ui::grid::Grid;
use crate::ui::toolbar::Toolbar;

const STYLES: Asset = asset!("/assets/styles.css");
const TIMER_TICK: Duration = Duration::from_millis(16);
const DEMO_ROW_COUNT: usize = 10_000;

/// Grid options from the file named by `DATAGRID_OPTIONS`, defaults otherwise.
pub fn options_from_env() -> Result<GridOptions, String> {
    let Ok(path) = std::env::var("DATAGRID_OPTIONS") else {
        return Ok(GridOptions::default());
    };
    let content = std::fs::read_to_string(&path).map_err(|e| format!("{path}: {e}"))?;
    options::options_from_json(&content).map_err(|e| format!("{path}: {e}"))
}

#[component]
pub fn App() -> Element {
    let (api, boot_error) = use_hook(|| {
        let mut problems = Vec::new();
        let options = options_from_env().unwrap_or_else(|err| {
            problems.push(err);
            GridOptions::default()
        });
        let (rows, columns) = initial_dataset();
        let api = GridApi::new(options);
        if let Err(err) = api.set_columns(columns).and_then(|_| api.set_rows(rows)) {
            problems.push(err.to_string());
        }
        (api, problems.first().cloned())
    });
    let mut error_message = use_signal(move || boot_error.clone());
    let file_path = use_signal::<Option<PathBuf>>(|| None);
    let revision = use_signal(|| 0u64);

    use_hook({
        let api = api.clone();
        move || {
            Rc::new(api.subscribe(GridEventKind::StateChanged, move |_| {
                let mut revision = revision;
                revision.with_mut(|r| *r += 1);
                Ok(())
            }))
        }
    });

    use_future({
        let api = api.clone();
        move || {
            let api = api.clone();
            async move {
                loop {
                    tokio::time::sleep(TIMER_TICK).await;
                    if api.is_disposed() {
                        break;
                    }
                    if api.next_timer_deadline().is_some() {
                        if let Err(err) = api.run_due_timers() {
                            error_message.set(Some(err.to_string()));
                        }
                    }
                }
            }
        }
    });

    use_drop({
        let api = api.clone();
        move || api.dispose()
    });

    rsx! {
        document::Stylesheet { href: STYLES }
        div { class: "app",
            Toolbar { api: api.clone(), revision, file_path, error_message }
            Grid { api: api.clone(), revision, error_message }
            Footer { api, revision, error_message }
        }
    }
}

/// Dataset named by `DATAGRID_OPEN`, or generated demo rows.
fn initial_dataset() -> (Vec<Row>, Columns) {
    if let Ok(path) = std::env::var("DATAGRID_OPEN") {
        match json_io::load_dataset(&PathBuf::from(&path)) {
            Ok(dataset) => return dataset,
            Err(err) => tracing::warn!(%path, error = %err, "could not open dataset"),
        }
    }
    demo_dataset(DEMO_ROW_COUNT)
}

pub fn demo_dataset(count: usize) -> (Vec<Row>, Columns) {
    const CITIES: [&str; 6] = ["Lisbon", "Osaka", "Quito", "Tallinn", "Accra", "Perth"];
    let rows = (0..count)
        .map(|idx| {
            let mut cells = Record::new();
            cells.insert("id".into(), json!(idx));
            cells.insert("name".into(), json!(format!("Customer {idx:05}")));
            cells.insert("city".into(), json!(CITIES[idx % CITIES.len()]));
            cells.insert("orders".into(), json!((idx * 37) % 101));
            cells.insert("balance".into(), json!(((idx * 7919) % 100_000) as f64 / 100.0));
            cells.insert("active".into(), json!(idx % 3 != 0));
            Row::new(idx, cells)
        })
        .collect();

    let columns = vec![
        ColDef::new("id").with_header_name("ID").with_width(80.0),
        ColDef::new("name").with_header_name("Name").with_width(180.0),
        ColDef::new("city").with_header_name("City").with_width(140.0),
        ColDef::new("orders").with_header_name("Orders"),
        ColDef::new("balance")
            .with_header_name("Balance")
            .with_width(130.0)
            .with_value_formatter(|value| match value.as_f64() {
                Some(amount) => format!("{amount:.2}"),
                None => String::new(),
            }),
        ColDef::new("active").with_header_name("Active"),
    ];
    (rows, columns)
}
