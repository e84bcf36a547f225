use serde::Serialize;

use crate::error::{GridError, Result};

/// Position of a cell in the virtualization coordinate space: row index on
/// the current page, column index among visible columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellIndexCoordinates {
    pub row_index: usize,
    pub col_index: usize,
}

impl CellIndexCoordinates {
    pub fn new(row_index: usize, col_index: usize) -> Self {
        Self {
            row_index,
            col_index,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyCode {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Space,
    Tab,
    Enter,
    Escape,
    Control,
    Meta,
    Shift,
    Character(char),
    Other(String),
}

impl KeyCode {
    /// Parses a DOM `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Self {
        match key {
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            " " | "Spacebar" => Self::Space,
            "Tab" => Self::Tab,
            "Enter" => Self::Enter,
            "Escape" => Self::Escape,
            "Control" => Self::Control,
            "Meta" => Self::Meta,
            "Shift" => Self::Shift,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Self::Character(ch),
                    _ => Self::Other(other.to_string()),
                }
            }
        }
    }

    pub fn is_arrow(&self) -> bool {
        matches!(
            self,
            Self::ArrowUp | Self::ArrowDown | Self::ArrowLeft | Self::ArrowRight
        )
    }

    pub fn is_home_or_end(&self) -> bool {
        matches!(self, Self::Home | Self::End)
    }

    pub fn is_page(&self) -> bool {
        matches!(self, Self::PageUp | Self::PageDown)
    }

    pub fn is_space(&self) -> bool {
        matches!(self, Self::Space)
    }

    pub fn is_navigation(&self) -> bool {
        self.is_arrow() || self.is_home_or_end() || self.is_page() || self.is_space()
    }

    /// Keys that, while held, turn clicks into multi-selection.
    pub fn is_multiple_key(&self) -> bool {
        matches!(self, Self::Control | Self::Meta)
    }

    pub fn is_char(&self, wanted: char) -> bool {
        matches!(self, Self::Character(ch) if ch.eq_ignore_ascii_case(&wanted))
    }

    fn name(&self) -> String {
        match self {
            Self::Character(ch) => ch.to_string(),
            Self::Other(name) => name.clone(),
            named => format!("{named:?}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyInput {
    pub code: KeyCode,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl KeyInput {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            ctrl: false,
            meta: false,
            shift: false,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn is_command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavigationBounds {
    pub row_count: usize,
    pub col_count: usize,
    /// Rows that fit in one viewport; the step for page keys and space.
    pub page_size: usize,
}

/// Maps a navigation key to the cell it moves focus to.
///
/// Arrows move by one, Home/End jump to the first/last column of the row
/// (or to the first/last cell of the grid with ctrl), page keys and space
/// move by `page_size` rows. The result is clamped to the grid. Passing a
/// key that is not a navigation key is a caller bug.
pub fn next_cell_indexes(
    code: &KeyCode,
    current: CellIndexCoordinates,
    is_ctrl_pressed: bool,
    bounds: NavigationBounds,
) -> Result<CellIndexCoordinates> {
    let row = current.row_index as i64;
    let col = current.col_index as i64;
    let last_row = bounds.row_count as i64 - 1;
    let last_col = bounds.col_count as i64 - 1;
    let step = bounds.page_size as i64;

    let (next_row, next_col) = match code {
        KeyCode::ArrowLeft => (row, col - 1),
        KeyCode::ArrowRight => (row, col + 1),
        KeyCode::ArrowUp => (row - 1, col),
        KeyCode::ArrowDown => (row + 1, col),
        KeyCode::Home if is_ctrl_pressed => (0, 0),
        KeyCode::Home => (row, 0),
        KeyCode::End if is_ctrl_pressed => (last_row, last_col),
        KeyCode::End => (row, last_col),
        KeyCode::PageUp => (row - step, col),
        KeyCode::PageDown | KeyCode::Space => (row + step, col),
        other => {
            return Err(GridError::KeyNotNavigable { key: other.name() });
        }
    };

    Ok(CellIndexCoordinates {
        row_index: clamp_index(next_row, last_row),
        col_index: clamp_index(next_col, last_col),
    })
}

fn clamp_index(value: i64, last: i64) -> usize {
    value.min(last).max(0) as usize
}
