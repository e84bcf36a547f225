use serde::Serialize;

use crate::state::keyboard::CellIndexCoordinates;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ElementSize {
    pub width: f64,
    pub height: f64,
}

impl ElementSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ScrollParams {
    pub left: f64,
    pub top: f64,
}

impl ScrollParams {
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

/// Everything the render context depends on.
#[derive(Clone, Debug, PartialEq)]
pub struct VirtualizationInputs {
    pub scroll: ScrollParams,
    pub window_size: ElementSize,
    pub row_height: f64,
    pub row_count: usize,
    pub column_widths: Vec<f64>,
    pub row_overscan: usize,
    pub column_overscan: usize,
    pub scrollbar_size: f64,
    pub page: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerProps {
    pub window_size: ElementSize,
    pub viewport_size: ElementSize,
    pub data_container_size: ElementSize,
    pub has_scroll_x: bool,
    pub has_scroll_y: bool,
    pub scrollbar_size: f64,
    /// Whole rows that fit in the viewport.
    pub viewport_page_size: usize,
    pub max_scroll_left: f64,
    pub max_scroll_top: f64,
}

impl ContainerProps {
    /// Width a row has to grow by to reach the viewport's right edge.
    pub fn extend_row_width(&self) -> f64 {
        (self.viewport_size.width - self.data_container_size.width).max(0.0)
    }

    pub fn clamp_scroll(&self, scroll: ScrollParams) -> ScrollParams {
        ScrollParams {
            left: scroll.left.clamp(0.0, self.max_scroll_left),
            top: scroll.top.clamp(0.0, self.max_scroll_top),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RenderingZone {
    pub width: f64,
    pub height: f64,
    /// Offset of the first mounted row from the top of the data container.
    pub top: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderContext {
    pub first_row_idx: usize,
    pub last_row_idx: usize,
    pub first_col_idx: usize,
    pub last_col_idx: usize,
    pub page: usize,
    pub has_scroll_x: bool,
    pub has_scroll_y: bool,
    pub data_container_sizes: ElementSize,
    pub viewport_size: ElementSize,
    pub rendering_zone: RenderingZone,
    pub left_empty_width: f64,
    pub right_empty_width: f64,
}

impl RenderContext {
    pub fn contains(&self, cell: CellIndexCoordinates) -> bool {
        (self.first_row_idx..self.last_row_idx).contains(&cell.row_index)
            && (self.first_col_idx..self.last_col_idx).contains(&cell.col_index)
    }
}

/// `prefix[i]` is the left edge of column `i`; the last entry is the total width.
pub fn column_offsets(widths: &[f64]) -> Vec<f64> {
    let mut offsets = Vec::with_capacity(widths.len() + 1);
    let mut x = 0.0;
    offsets.push(x);
    for width in widths {
        x += width.max(0.0);
        offsets.push(x);
    }
    offsets
}

/// Returns `None` until the window has a real size.
pub fn compute_container_props(
    window_size: ElementSize,
    row_count: usize,
    row_height: f64,
    column_widths: &[f64],
    scrollbar_size: f64,
) -> Option<ContainerProps> {
    if !window_size.is_measured() || row_height <= 0.0 {
        return None;
    }

    let data_width: f64 = column_widths.iter().map(|w| w.max(0.0)).sum();
    let data_height = row_count as f64 * row_height;

    // A horizontal scrollbar eats vertical space and vice versa.
    let mut has_scroll_x = data_width > window_size.width;
    let has_scroll_y = data_height > window_size.height - scrollbar_if(has_scroll_x, scrollbar_size);
    has_scroll_x = data_width > window_size.width - scrollbar_if(has_scroll_y, scrollbar_size);

    let viewport_size = ElementSize {
        width: (window_size.width - scrollbar_if(has_scroll_y, scrollbar_size)).max(0.0),
        height: (window_size.height - scrollbar_if(has_scroll_x, scrollbar_size)).max(0.0),
    };

    Some(ContainerProps {
        window_size,
        viewport_size,
        data_container_size: ElementSize::new(data_width, data_height),
        has_scroll_x,
        has_scroll_y,
        scrollbar_size,
        viewport_page_size: (viewport_size.height / row_height).floor() as usize,
        max_scroll_left: (data_width - viewport_size.width).max(0.0),
        max_scroll_top: (data_height - viewport_size.height).max(0.0),
    })
}

fn scrollbar_if(present: bool, size: f64) -> f64 {
    if present {
        size
    } else {
        0.0
    }
}

/// Row window `[first, last)` for the given scroll position.
pub fn compute_row_window(
    scroll_top: f64,
    viewport_height: f64,
    row_height: f64,
    row_count: usize,
    overscan: usize,
) -> (usize, usize) {
    if row_count == 0 || row_height <= 0.0 {
        return (0, 0);
    }
    let first_visible = (scroll_top.max(0.0) / row_height).floor() as usize;
    let start = first_visible.saturating_sub(overscan).min(row_count - 1);
    let visible = (viewport_height.max(0.0) / row_height).ceil() as usize;
    let end = start
        .saturating_add(visible)
        .saturating_add(overscan.saturating_mul(2))
        .min(row_count);
    (start, end.max(start))
}

/// Column window `[first, last)` found by binary search over `offsets`.
pub fn compute_column_window(
    scroll_left: f64,
    viewport_width: f64,
    offsets: &[f64],
    overscan: usize,
) -> (usize, usize) {
    let column_count = offsets.len().saturating_sub(1);
    if column_count == 0 {
        return (0, 0);
    }
    let left = scroll_left.max(0.0);
    let right = left + viewport_width.max(0.0);

    let first = offsets[..column_count]
        .partition_point(|edge| *edge <= left)
        .saturating_sub(1);
    let last = offsets[1..]
        .partition_point(|edge| *edge < right)
        .saturating_add(1)
        .min(column_count);

    let first = first.saturating_sub(overscan);
    let last = last.saturating_add(overscan).min(column_count);
    (first, last.max(first))
}

pub fn compute_render_context(inputs: &VirtualizationInputs) -> Option<RenderContext> {
    let container = compute_container_props(
        inputs.window_size,
        inputs.row_count,
        inputs.row_height,
        &inputs.column_widths,
        inputs.scrollbar_size,
    )?;
    Some(render_context_for(inputs, &container))
}

fn render_context_for(inputs: &VirtualizationInputs, container: &ContainerProps) -> RenderContext {
    let scroll = container.clamp_scroll(inputs.scroll);
    let (first_row_idx, last_row_idx) = compute_row_window(
        scroll.top,
        container.viewport_size.height,
        inputs.row_height,
        inputs.row_count,
        inputs.row_overscan,
    );

    let offsets = column_offsets(&inputs.column_widths);
    let (first_col_idx, last_col_idx) = compute_column_window(
        scroll.left,
        container.viewport_size.width,
        &offsets,
        inputs.column_overscan,
    );
    let total_width = offsets.last().copied().unwrap_or(0.0);

    RenderContext {
        first_row_idx,
        last_row_idx,
        first_col_idx,
        last_col_idx,
        page: inputs.page,
        has_scroll_x: container.has_scroll_x,
        has_scroll_y: container.has_scroll_y,
        data_container_sizes: container.data_container_size,
        viewport_size: container.viewport_size,
        rendering_zone: RenderingZone {
            width: offsets[last_col_idx] - offsets[first_col_idx],
            height: (last_row_idx - first_row_idx) as f64 * inputs.row_height,
            top: first_row_idx as f64 * inputs.row_height,
        },
        left_empty_width: offsets[first_col_idx],
        right_empty_width: total_width - offsets[last_col_idx],
    }
}

/// Minimal scroll position that puts `cell` fully inside the viewport, or
/// `None` when it already is.
pub fn scroll_into_view(
    current: ScrollParams,
    container: &ContainerProps,
    row_height: f64,
    column_widths: &[f64],
    cell: CellIndexCoordinates,
) -> Option<ScrollParams> {
    let viewport = container.viewport_size;
    let mut target = current;

    let row_top = cell.row_index as f64 * row_height;
    let row_bottom = row_top + row_height;
    if row_top < current.top {
        target.top = row_top;
    } else if row_bottom > current.top + viewport.height {
        target.top = row_bottom - viewport.height;
    }

    let offsets = column_offsets(column_widths);
    if cell.col_index + 1 < offsets.len() {
        let col_left = offsets[cell.col_index];
        let col_right = offsets[cell.col_index + 1];
        if col_left < current.left {
            target.left = col_left;
        } else if col_right > current.left + viewport.width {
            target.left = (col_right - viewport.width).min(col_left);
        }
    }

    let target = container.clamp_scroll(target);
    (target != current).then_some(target)
}

#[derive(Clone, Debug, PartialEq)]
pub enum RenderUpdate {
    /// Same window as before; nothing to repaint.
    Unchanged,
    /// The window is not measured yet.
    Withheld,
    Changed(RenderContext),
}

/// Memoizing wrapper around [`compute_render_context`].
#[derive(Debug, Default)]
pub struct VirtualizationEngine {
    last_inputs: Option<VirtualizationInputs>,
    last_context: Option<RenderContext>,
}

impl VirtualizationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render_context(&self) -> Option<&RenderContext> {
        self.last_context.as_ref()
    }

    pub fn update(&mut self, inputs: VirtualizationInputs) -> RenderUpdate {
        if self.last_inputs.as_ref() == Some(&inputs) {
            return RenderUpdate::Unchanged;
        }
        let first_run = self.last_inputs.is_none();
        let next = compute_render_context(&inputs);
        self.last_inputs = Some(inputs);

        if !first_run && next == self.last_context {
            return RenderUpdate::Unchanged;
        }
        self.last_context = next.clone();
        match next {
            Some(context) => RenderUpdate::Changed(context),
            None => RenderUpdate::Withheld,
        }
    }

    pub fn reset(&mut self) {
        self.last_inputs = None;
        self.last_context = None;
    }
}
