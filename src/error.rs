use std::io;

use thiserror::Error;

use crate::state::data_model::RowId;
use crate::state::events::GridEventKind;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("action not found: {action}")]
    UnknownAction { action: String },

    #[error("key '{key}' is not mapped to a navigation behavior")]
    KeyNotNavigable { key: String },

    #[error("no row with id '{0}'")]
    RowNotFound(RowId),

    #[error("duplicate row id '{0}'")]
    DuplicateRowId(RowId),

    #[error("no column with field '{0}'")]
    ColumnNotFound(String),

    #[error("duplicate column field '{0}'")]
    DuplicateField(String),

    #[error("{count} handler(s) failed while dispatching {event:?}", count = .faults.len())]
    HandlerFaults {
        event: GridEventKind,
        faults: Vec<GridError>,
    },

    #[error("handler panicked: {0}")]
    HandlerPanicked(String),

    #[error("handler error: {0}")]
    Handler(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON root is not an array")]
    NotAnArray,

    #[error("JSON array contains non-object elements")]
    NotArrayOfObjects,
}

pub type Result<T, E = GridError> = std::result::Result<T, E>;
