use chrono::{Duration, NaiveDate};
use gantt_timeline::engine::{
    drive_window, group_rows, LayoutInputs, LayoutPipeline, RowVirtualizer, ScrollMetrics,
    ViewportSensor, ViewportSize, WindowController,
};
use gantt_timeline::model::{GanttOptions, GanttRecord, NodeType, RowId};
use pretty_assertions::assert_eq;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct Ticket {
    id: String,
    story: &'static str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    after: Vec<String>,
}

impl GanttRecord for Ticket {
    fn record_id(&self) -> RowId {
        RowId::from(self.id.as_str())
    }
    fn bar_start(&self) -> Option<NaiveDate> {
        self.start
    }
    fn bar_end(&self) -> Option<NaiveDate> {
        self.end
    }
    fn from_link_ids(&self) -> Vec<RowId> {
        self.after.iter().map(|id| RowId::from(id.as_str())).collect()
    }
}

/// 40 tickets in two stories; ticket 39 depends on ticket 0.
fn tickets() -> Vec<Ticket> {
    (0..40)
        .map(|i| {
            let start = date(2024, 6, 1) + Duration::days(i);
            Ticket {
                id: format!("t{i}"),
                story: if i < 20 { "alpha" } else { "beta" },
                start: Some(start),
                end: Some(start + Duration::days(2)),
                after: if i == 39 { vec!["t0".to_string()] } else { Vec::new() },
            }
        })
        .collect()
}

struct Viewport {
    size: ViewportSize,
    metrics: ScrollMetrics,
    scrolls: Vec<f32>,
}

impl ViewportSensor for Viewport {
    fn observe_resize(&mut self) -> Option<ViewportSize> {
        Some(self.size)
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    fn scroll_to(&mut self, x: f32) {
        self.scrolls.push(x);
        self.metrics.scroll_left = x;
    }
}

fn options() -> GanttOptions {
    GanttOptions::from_json(
        r#"{
            "cell_width": 20,
            "row_height": 30,
            "bar_margin": 3,
            "group_gap": 4,
            "buffer_day": 20,
            "buffer_months": [1, 1],
            "lead_in_days": 3,
            "is_group_view": true,
            "group_options": [{ "column_id": "story", "component": "storybar" }]
        }"#,
    )
    .unwrap()
}

#[test]
fn anchored_window_jumps_then_grows_leftward() {
    let options = options();
    let records = tickets();
    let rows = group_rows(&records, "story", |t| t.story.to_string());
    let virtualizer = RowVirtualizer::new(rows.len(), |_| options.row_height, 0);

    let mut controller = WindowController::anchored(date(2024, 6, 15), &options);
    let mut pipeline = LayoutPipeline::new();
    let mut viewport = Viewport {
        size: ViewportSize { width: 600.0, height: 300.0 },
        metrics: ScrollMetrics { scroll_left: 0.0, client_width: 600.0, scroll_width: 0.0 },
        scrolls: Vec::new(),
    };

    // Two frames: the jump waits for the viewport size to settle.
    for _ in 0..2 {
        let window = controller.window();
        let items = virtualizer.visible_items(0.0, viewport.size.height);
        let inputs =
            LayoutInputs::from_options(&options, window, controller.cell_width(), 1, items);
        let output = pipeline.recompute(inputs, &rows);
        viewport.metrics.scroll_width = output.content_width;
        let built = pipeline.is_built_for(controller.window());
        drive_window(&mut controller, &mut viewport, built);
    }

    // May 15 ..= Jul 15, jump lands three days before June 15th.
    assert_eq!(pipeline.output().content_width, 62.0 * 20.0);
    assert_eq!(viewport.scrolls, vec![28.0 * 20.0]);
    assert_eq!(controller.window().range.start, date(2024, 5, 15));

    // The user drags back to the very start.
    viewport.metrics.scroll_left = 0.0;
    assert!(drive_window(&mut controller, &mut viewport, true));
    assert_eq!(controller.window().range.start, date(2024, 4, 25));

    let items = virtualizer.visible_items(0.0, viewport.size.height);
    let inputs = LayoutInputs::from_options(&options, controller.window(), 20.0, 1, items);
    let output = pipeline.recompute(inputs, &rows);
    assert_eq!(output.content_width, 82.0 * 20.0);
    // The first ticket moved right by exactly the buffer.
    let first = output.nodes.iter().find(|n| n.id.as_str() == "t0").unwrap();
    assert_eq!(first.x, 37.0 * 20.0);

    let built = pipeline.is_built_for(controller.window());
    drive_window(&mut controller, &mut viewport, built);
    assert_eq!(viewport.scrolls, vec![560.0, 400.0]);
}

#[test]
fn dependency_edges_follow_the_visible_window() {
    let options = options();
    let records = tickets();
    let rows = group_rows(&records, "story", |t| t.story.to_string());
    let virtualizer = RowVirtualizer::new(rows.len(), |_| options.row_height, 0);
    let controller = WindowController::anchored(date(2024, 6, 15), &options);
    let mut pipeline = LayoutPipeline::new();

    // Top of the list: group header alpha and t0..t8 are visible, t39 is not.
    let items = virtualizer.visible_items(0.0, 300.0);
    let inputs = LayoutInputs::from_options(&options, controller.window(), 20.0, 1, items);
    let output = pipeline.recompute(inputs, &rows);
    assert_eq!(output.nodes[0].node_type, NodeType::Group("storybar".into()));
    assert_eq!(output.nodes[0].y, 3.0 + 4.0);
    assert!(output.edges.is_empty());

    // A tall viewport realizes both ends of the link.
    let items = virtualizer.visible_items(0.0, virtualizer.total_size());
    let inputs = LayoutInputs::from_options(&options, controller.window(), 20.0, 1, items);
    let output = pipeline.recompute(inputs, &rows);
    assert_eq!(output.nodes.len(), 42);
    assert_eq!(output.edges.len(), 1);
    assert_eq!(output.edges[0].id(), "t0->t39");

    let beta = output.nodes.iter().find(|n| n.id.as_str() == "story:beta").unwrap();
    assert_eq!((beta.start, beta.end), (Some(date(2024, 6, 21)), Some(date(2024, 7, 12))));
}

#[test]
fn undated_rows_follow_the_viewport() {
    let options = options();
    let mut records = tickets();
    records.push(Ticket {
        id: "unscheduled".to_string(),
        story: "alpha",
        start: None,
        end: None,
        after: Vec::new(),
    });
    let rows = group_rows(&records, "story", |t| t.story.to_string());
    let virtualizer = RowVirtualizer::new(rows.len(), |_| options.row_height, 0);
    let all_rows = virtualizer.visible_items(0.0, virtualizer.total_size());

    let mut controller = WindowController::anchored(date(2024, 6, 15), &options);
    let mut pipeline = LayoutPipeline::new();
    let mut viewport = Viewport {
        size: ViewportSize { width: 600.0, height: 300.0 },
        metrics: ScrollMetrics { scroll_left: 0.0, client_width: 600.0, scroll_width: 0.0 },
        scrolls: Vec::new(),
    };

    let placeholder = |controller: &WindowController, pipeline: &mut LayoutPipeline| {
        let inputs = LayoutInputs::from_options(
            &options,
            controller.window(),
            controller.cell_width(),
            1,
            all_rows.clone(),
        )
        .with_empty_anchor(controller.leading_date());
        let output = pipeline.recompute(inputs, &rows);
        let node = output.nodes.iter().find(|n| n.id.as_str() == "unscheduled").unwrap();
        assert!(node.empty_range);
        (output.content_width, node.x, node.width)
    };

    for _ in 0..2 {
        let (content_width, _, _) = placeholder(&controller, &mut pipeline);
        viewport.metrics.scroll_width = content_width;
        let built = pipeline.is_built_for(controller.window());
        drive_window(&mut controller, &mut viewport, built);
    }
    assert_eq!(viewport.scrolls, vec![560.0]);

    // After the jump it sits on June 15th, inside the viewport.
    let (_, x, width) = placeholder(&controller, &mut pipeline);
    assert_eq!(x, 31.0 * 20.0);
    assert!(x >= 560.0 && x + width <= 560.0 + 600.0);

    // A left rebase shifts the offset; the placeholder moves with it.
    viewport.metrics.scroll_left = 0.0;
    assert!(drive_window(&mut controller, &mut viewport, true));
    placeholder(&controller, &mut pipeline);
    let built = pipeline.is_built_for(controller.window());
    drive_window(&mut controller, &mut viewport, built);
    assert_eq!(viewport.scrolls, vec![560.0, 400.0]);

    let (_, x, width) = placeholder(&controller, &mut pipeline);
    assert_eq!(x, 23.0 * 20.0);
    assert!(x >= 400.0 && x + width <= 400.0 + 600.0);
}
