pub mod actions;
pub mod app;
pub mod footer;
pub mod grid;
pub mod toolbar;

use dioxus::prelude::*;

use crate::error::Result;

/// Surfaces a failed grid call in the status line instead of dropping it.
pub(crate) fn report(mut error_message: Signal<Option<String>>, result: Result<()>) {
    if let Err(err) = result {
        tracing::warn!(error = %err, "grid operation failed");
        error_message.set(Some(err.to_string()));
    }
}
