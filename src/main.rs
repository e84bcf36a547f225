use dioxus::prelude::*;
use datagrid::ui::app::{self, App};

fn main() {
    let level = app::options_from_env()
        .map(|options| options.log_level)
        .unwrap_or_default();
    if let Err(err) = dioxus::logger::init(level.as_tracing()) {
        eprintln!("logger already initialised: {err}");
    }

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new().with_window(
                dioxus::desktop::WindowBuilder::new()
                    .with_title("DataGrid")
                    .with_inner_size(dioxus::desktop::LogicalSize::new(1200.0, 800.0)),
            ),
        )
        .launch(App);
}
