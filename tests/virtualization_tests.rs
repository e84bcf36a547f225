use datagrid::state::keyboard::CellIndexCoordinates;
use datagrid::state::virtualization::{
    self, ElementSize, RenderUpdate, ScrollParams, VirtualizationEngine, VirtualizationInputs,
};

fn inputs(top: f64, left: f64) -> VirtualizationInputs {
    VirtualizationInputs {
        scroll: ScrollParams::new(left, top),
        window_size: ElementSize::new(1000.0, 500.0),
        row_height: 50.0,
        row_count: 100,
        column_widths: vec![100.0; 5],
        row_overscan: 2,
        column_overscan: 1,
        scrollbar_size: 15.0,
        page: 1,
    }
}

#[test]
fn test_row_window_at_top() {
    assert_eq!(virtualization::compute_row_window(0.0, 500.0, 50.0, 1000, 2), (0, 14));
}

#[test]
fn test_row_window_mid_scroll() {
    assert_eq!(
        virtualization::compute_row_window(1000.0, 500.0, 50.0, 1000, 2),
        (18, 32)
    );
}

#[test]
fn test_row_window_clamped_at_end() {
    assert_eq!(
        virtualization::compute_row_window(49_500.0, 500.0, 50.0, 1000, 2),
        (988, 1000)
    );
}

#[test]
fn test_row_window_without_rows() {
    assert_eq!(virtualization::compute_row_window(300.0, 500.0, 50.0, 0, 2), (0, 0));
}

#[test]
fn test_row_window_always_within_bounds() {
    for row_count in [1usize, 3, 10, 57, 1000] {
        for step in 0..200 {
            let top = step as f64 * 173.0;
            let (first, last) = virtualization::compute_row_window(top, 480.0, 52.0, row_count, 3);
            assert!(first <= last, "first {first} > last {last}");
            assert!(last <= row_count, "last {last} > count {row_count}");
            assert!(first < row_count);
        }
    }
}

#[test]
fn test_column_window_uses_prefix_sums() {
    let offsets = virtualization::column_offsets(&[100.0; 10]);
    assert_eq!(offsets.len(), 11);
    assert_eq!(offsets[10], 1000.0);

    assert_eq!(virtualization::compute_column_window(0.0, 250.0, &offsets, 0), (0, 3));
    assert_eq!(virtualization::compute_column_window(150.0, 250.0, &offsets, 0), (1, 4));
    assert_eq!(virtualization::compute_column_window(100.0, 250.0, &offsets, 0), (1, 4));
    assert_eq!(virtualization::compute_column_window(150.0, 250.0, &offsets, 1), (0, 5));
    assert_eq!(virtualization::compute_column_window(900.0, 250.0, &offsets, 2), (7, 10));
}

#[test]
fn test_column_window_with_uneven_widths() {
    let offsets = virtualization::column_offsets(&[50.0, 300.0, 80.0, 80.0, 200.0]);
    // viewport 120..320 only touches the wide second column
    assert_eq!(virtualization::compute_column_window(120.0, 200.0, &offsets, 0), (1, 2));
    assert_eq!(virtualization::compute_column_window(0.0, 0.0, &[0.0], 0), (0, 0));
}

#[test]
fn test_container_props() {
    let props = virtualization::compute_container_props(
        ElementSize::new(1000.0, 500.0),
        100,
        50.0,
        &[100.0; 5],
        15.0,
    )
    .unwrap();

    assert!(props.has_scroll_y);
    assert!(!props.has_scroll_x);
    assert_eq!(props.viewport_size, ElementSize::new(985.0, 500.0));
    assert_eq!(props.data_container_size, ElementSize::new(500.0, 5000.0));
    assert_eq!(props.viewport_page_size, 10);
    assert_eq!(props.max_scroll_top, 4500.0);
    assert_eq!(props.max_scroll_left, 0.0);
    assert_eq!(props.extend_row_width(), 485.0);
    assert_eq!(
        props.clamp_scroll(ScrollParams::new(-5.0, 9000.0)),
        ScrollParams::new(0.0, 4500.0)
    );
}

#[test]
fn test_horizontal_scrollbar_shrinks_viewport_height() {
    let props = virtualization::compute_container_props(
        ElementSize::new(300.0, 500.0),
        5,
        50.0,
        &[200.0, 200.0],
        15.0,
    )
    .unwrap();
    assert!(props.has_scroll_x);
    assert!(!props.has_scroll_y);
    assert_eq!(props.viewport_size, ElementSize::new(300.0, 485.0));
    assert_eq!(props.max_scroll_left, 100.0);
}

#[test]
fn test_unmeasured_window_yields_nothing() {
    let props =
        virtualization::compute_container_props(ElementSize::default(), 100, 50.0, &[100.0], 15.0);
    assert!(props.is_none());

    let mut unmeasured = inputs(0.0, 0.0);
    unmeasured.window_size = ElementSize::new(0.0, 0.0);
    assert!(virtualization::compute_render_context(&unmeasured).is_none());
}

#[test]
fn test_render_context_geometry() {
    let ctx = virtualization::compute_render_context(&inputs(1000.0, 0.0)).unwrap();
    assert_eq!((ctx.first_row_idx, ctx.last_row_idx), (18, 32));
    assert_eq!((ctx.first_col_idx, ctx.last_col_idx), (0, 5));
    assert_eq!(ctx.rendering_zone.top, 900.0);
    assert_eq!(ctx.rendering_zone.height, 700.0);
    assert_eq!(ctx.rendering_zone.width, 500.0);
    assert_eq!(ctx.left_empty_width, 0.0);
    assert_eq!(ctx.right_empty_width, 0.0);
    assert_eq!(ctx.page, 1);
    assert!(ctx.has_scroll_y);
}

#[test]
fn test_render_context_clamps_overscrolled_input() {
    let ctx = virtualization::compute_render_context(&inputs(1_000_000.0, 0.0)).unwrap();
    assert_eq!(ctx.last_row_idx, 100);
    assert!(ctx.first_row_idx <= ctx.last_row_idx);
}

#[test]
fn test_render_context_contains() {
    let ctx = virtualization::compute_render_context(&inputs(0.0, 0.0)).unwrap();
    assert!(ctx.contains(CellIndexCoordinates::new(0, 0)));
    assert!(ctx.contains(CellIndexCoordinates::new(13, 4)));
    assert!(!ctx.contains(CellIndexCoordinates::new(14, 0)));
    assert!(!ctx.contains(CellIndexCoordinates::new(0, 5)));
}

#[test]
fn test_scroll_into_view_moves_minimally() {
    let props = virtualization::compute_container_props(
        ElementSize::new(1000.0, 500.0),
        100,
        50.0,
        &[100.0; 5],
        15.0,
    )
    .unwrap();
    let widths = [100.0; 5];
    let origin = ScrollParams::default();

    let below = virtualization::scroll_into_view(
        origin,
        &props,
        50.0,
        &widths,
        CellIndexCoordinates::new(20, 0),
    );
    assert_eq!(below, Some(ScrollParams::new(0.0, 550.0)));

    let above = virtualization::scroll_into_view(
        ScrollParams::new(0.0, 550.0),
        &props,
        50.0,
        &widths,
        CellIndexCoordinates::new(3, 0),
    );
    assert_eq!(above, Some(ScrollParams::new(0.0, 150.0)));

    let visible = virtualization::scroll_into_view(
        origin,
        &props,
        50.0,
        &widths,
        CellIndexCoordinates::new(5, 2),
    );
    assert_eq!(visible, None);
}

#[test]
fn test_engine_memoizes_identical_inputs() {
    let mut engine = VirtualizationEngine::new();
    assert!(matches!(engine.update(inputs(0.0, 0.0)), RenderUpdate::Changed(_)));
    assert_eq!(engine.update(inputs(0.0, 0.0)), RenderUpdate::Unchanged);
    assert!(engine.render_context().is_some());
}

#[test]
fn test_engine_skips_scroll_within_same_window() {
    let mut engine = VirtualizationEngine::new();
    engine.update(inputs(0.0, 0.0));
    // still inside the first row, so the mounted window is identical
    assert_eq!(engine.update(inputs(10.0, 0.0)), RenderUpdate::Unchanged);
    assert!(matches!(engine.update(inputs(1000.0, 0.0)), RenderUpdate::Changed(_)));
}

#[test]
fn test_engine_withholds_until_measured() {
    let mut engine = VirtualizationEngine::new();
    let mut unmeasured = inputs(0.0, 0.0);
    unmeasured.window_size = ElementSize::default();

    assert_eq!(engine.update(unmeasured.clone()), RenderUpdate::Withheld);
    assert_eq!(engine.update(unmeasured), RenderUpdate::Unchanged);
    assert!(engine.render_context().is_none());

    assert!(matches!(engine.update(inputs(0.0, 0.0)), RenderUpdate::Changed(_)));
    engine.reset();
    assert!(engine.render_context().is_none());
}
