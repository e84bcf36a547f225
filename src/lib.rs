pub mod api;
pub mod error;
pub mod io;
pub mod state;
pub mod ui;

pub use api::GridApi;
pub use error::{GridError, Result};
