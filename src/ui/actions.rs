use dioxus::prelude::*;
use std::path::PathBuf;

use crate::api::{ColumnApi, GridApi, RowApi, SortApi};
use crate::io::json_io;

pub async fn open_dataset(
    api: GridApi,
    mut file_path: Signal<Option<PathBuf>>,
    mut error_message: Signal<Option<String>>,
) {
    let picked = rfd::AsyncFileDialog::new()
        .add_filter("JSON", &["json"])
        .pick_file()
        .await;
    let Some(handle) = picked else {
        return;
    };

    let path = handle.path().to_path_buf();
    let loaded = json_io::load_dataset(&path).and_then(|(rows, columns)| {
        api.set_sort_model(Vec::new())?;
        api.set_columns(columns)?;
        api.set_rows(rows)
    });
    match loaded {
        Ok(()) => {
            file_path.set(Some(path));
            error_message.set(None);
        }
        Err(err) => error_message.set(Some(err.to_string())),
    }
}

/// Saves the rows of the current page, in display order, to a chosen file.
pub async fn export_page(api: GridApi, mut error_message: Signal<Option<String>>) {
    let picked = rfd::AsyncFileDialog::new()
        .add_filter("JSON", &["json"])
        .set_file_name("export.json")
        .save_file()
        .await;
    let Some(handle) = picked else {
        return;
    };

    let rows = api.page_rows();
    let columns = api.get_visible_columns();
    match json_io::export_rows(handle.path(), rows.as_slice(), &columns) {
        Ok(()) => error_message.set(None),
        Err(err) => error_message.set(Some(err.to_string())),
    }
}
