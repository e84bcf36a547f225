use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationMode {
    #[default]
    Client,
    Server,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

/// Resolved grid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridOptions {
    pub pagination: bool,
    /// Explicit page size; `None` falls back to the viewport page size when
    /// `pagination_auto_page_size` is set.
    pub page_size: Option<usize>,
    pub pagination_mode: PaginationMode,
    pub pagination_auto_page_size: bool,
    pub enable_multiple_selection: bool,
    pub enable_multiple_columns_sorting: bool,
    pub header_height: f64,
    pub row_height: f64,
    pub row_overscan: usize,
    pub column_overscan: usize,
    pub scrollbar_size: f64,
    pub show_cell_right_border: bool,
    pub disable_extend_row_full_width: bool,
    pub log_level: LogLevel,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            pagination: false,
            page_size: None,
            pagination_mode: PaginationMode::Client,
            pagination_auto_page_size: false,
            enable_multiple_selection: true,
            enable_multiple_columns_sorting: true,
            header_height: 56.0,
            row_height: 52.0,
            row_overscan: 2,
            column_overscan: 1,
            scrollbar_size: 15.0,
            show_cell_right_border: false,
            disable_extend_row_full_width: false,
            log_level: LogLevel::Info,
        }
    }
}

/// Partial options supplied by the host; unset fields keep their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridOptionsProp {
    pub pagination: Option<bool>,
    pub page_size: Option<usize>,
    pub pagination_mode: Option<PaginationMode>,
    pub pagination_auto_page_size: Option<bool>,
    pub enable_multiple_selection: Option<bool>,
    pub enable_multiple_columns_sorting: Option<bool>,
    pub header_height: Option<f64>,
    pub row_height: Option<f64>,
    pub row_overscan: Option<usize>,
    pub column_overscan: Option<usize>,
    pub scrollbar_size: Option<f64>,
    pub show_cell_right_border: Option<bool>,
    pub disable_extend_row_full_width: Option<bool>,
    pub log_level: Option<LogLevel>,
}

impl GridOptions {
    pub fn merged(&self, prop: &GridOptionsProp) -> GridOptions {
        let base = self.clone();
        GridOptions {
            pagination: prop.pagination.unwrap_or(base.pagination),
            page_size: prop.page_size.or(base.page_size),
            pagination_mode: prop.pagination_mode.unwrap_or(base.pagination_mode),
            pagination_auto_page_size: prop
                .pagination_auto_page_size
                .unwrap_or(base.pagination_auto_page_size),
            enable_multiple_selection: prop
                .enable_multiple_selection
                .unwrap_or(base.enable_multiple_selection),
            enable_multiple_columns_sorting: prop
                .enable_multiple_columns_sorting
                .unwrap_or(base.enable_multiple_columns_sorting),
            header_height: prop.header_height.unwrap_or(base.header_height).max(0.0),
            row_height: positive_or(prop.row_height, base.row_height),
            row_overscan: prop.row_overscan.unwrap_or(base.row_overscan),
            column_overscan: prop.column_overscan.unwrap_or(base.column_overscan),
            scrollbar_size: prop.scrollbar_size.unwrap_or(base.scrollbar_size).max(0.0),
            show_cell_right_border: prop
                .show_cell_right_border
                .unwrap_or(base.show_cell_right_border),
            disable_extend_row_full_width: prop
                .disable_extend_row_full_width
                .unwrap_or(base.disable_extend_row_full_width),
            log_level: prop.log_level.unwrap_or(base.log_level),
        }
    }

    /// Page size used for slicing, given the rows that fit in the viewport.
    pub fn effective_page_size(&self, viewport_page_size: usize) -> usize {
        match self.page_size {
            Some(size) => size,
            None if self.pagination_auto_page_size => viewport_page_size,
            None => 0,
        }
    }
}

pub fn merge_options(prop: &GridOptionsProp) -> GridOptions {
    GridOptions::default().merged(prop)
}

pub fn options_from_json(source: &str) -> serde_json::Result<GridOptions> {
    let prop: GridOptionsProp = serde_json::from_str(source)?;
    Ok(merge_options(&prop))
}

fn positive_or(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|v| *v > 0.0).unwrap_or(fallback)
}
