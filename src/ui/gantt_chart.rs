use chrono::{Datelike, NaiveDate};
use egui::{Align2, Color32, Painter, Pos2, Rect, Rounding, Sense, Shape, Stroke, Ui, Vec2};

use gantt_timeline::engine::axis::HeaderColumn;
use gantt_timeline::engine::gesture::DragSnapshot;
use gantt_timeline::engine::{
    day_diff, day_offset, offset_to_date, DragKind, LayoutOutput, ScrollMetrics, ViewportSensor,
    ViewportSize,
};
use gantt_timeline::model::{Edge, MilestonePosition, Node, RowId};

use crate::tasks::Task;
use crate::ui::palette;

const HEADER_HEIGHT: f32 = palette::HEADER_HEIGHT;
const HANDLE_WIDTH: f32 = palette::GRIP_WIDTH;

/// Everything the chart needs to paint one frame.
pub struct ChartView<'a> {
    pub output: &'a LayoutOutput,
    pub tasks: &'a [Task],
    pub cell_width: f32,
    /// Height of all rows, realized or not.
    pub rows_height: f32,
    pub selected: Option<&'a RowId>,
    pub drag: Option<&'a DragSnapshot>,
    pub link_source: Option<&'a RowId>,
    pub transient_edges: Vec<&'a Edge>,
    /// Row whose click-to-schedule placeholder is revealed.
    pub reveal_row: Option<usize>,
    pub today: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    Select(Option<RowId>),
    DragStarted {
        id: RowId,
        kind: DragKind,
        pointer_x: f32,
    },
    Dragged {
        pointer_x: f32,
    },
    DragReleased,
    LinkStarted(RowId),
    /// A link drag ended, possibly over another bar.
    LinkReleased(Option<RowId>),
    Disconnect(Edge),
    /// An unscheduled row was clicked at `date`.
    Schedule {
        id: RowId,
        date: NaiveDate,
    },
    HoverRow(Option<usize>),
    Zoom(f32),
}

/// The chart's scroll container, observed once per frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartViewport {
    pub size: Option<ViewportSize>,
    pub metrics: ScrollMetrics,
    /// Vertical offset into the rows, shared with the task table.
    pub scroll_y: f32,
    pending_scroll: Option<f32>,
}

impl ChartViewport {
    /// Height available to rows below the sticky header.
    pub fn rows_height(&self) -> f32 {
        self.size.map_or(0.0, |s| (s.height - HEADER_HEIGHT).max(0.0))
    }

    fn take_scroll(&mut self) -> Option<f32> {
        self.pending_scroll.take()
    }
}

impl ViewportSensor for ChartViewport {
    fn observe_resize(&mut self) -> Option<ViewportSize> {
        self.size
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    /// Applied on the next frame; the metrics report the target right away so
    /// the controller does not see the old edge position again.
    fn scroll_to(&mut self, x: f32) {
        self.pending_scroll = Some(x);
        self.metrics.scroll_left = x;
    }
}

/// Render the Gantt chart area (right panel).
pub fn show_gantt_chart(
    view: &ChartView<'_>,
    scroll: &mut ChartViewport,
    ui: &mut Ui,
) -> Vec<ChartEvent> {
    let mut events = Vec::new();

    // Ctrl+scroll and pinch arrive as a zoom factor.
    if ui.rect_contains_pointer(ui.max_rect()) {
        let zoom = ui.input(|i| i.zoom_delta());
        if zoom != 1.0 {
            events.push(ChartEvent::Zoom(zoom));
        }
    }

    let mut area = egui::ScrollArea::both()
        .id_salt("gantt-chart")
        .auto_shrink([false, false])
        .drag_to_scroll(false)
        .vertical_scroll_offset(scroll.scroll_y);
    if let Some(x) = scroll.take_scroll() {
        area = area.horizontal_scroll_offset(x);
    }

    let output = area.show_viewport(ui, |ui, viewport| {
        let content = Vec2::new(
            view.output.content_width.max(viewport.width()),
            HEADER_HEIGHT + view.rows_height,
        );
        let (rect, response) = ui.allocate_exact_size(content, Sense::click_and_drag());
        let origin = rect.min;
        let visible = viewport.translate(origin.to_vec2());
        let painter = ui.painter_at(visible);

        painter.rect_filled(visible, 0.0, palette::CANVAS);
        draw_rows(&painter, view, origin, visible);
        draw_holidays(&painter, view, origin, visible);
        draw_grid(&painter, view, origin, visible);
        draw_today_line(&painter, view, origin, visible);
        draw_edges(&painter, view, origin);
        for node in &view.output.nodes {
            draw_node(&painter, view, node, origin);
        }
        draw_header(&painter, view, origin, visible);
        draw_milestones(&painter, view, origin, visible);

        let nodes: &[Node] = &view.output.nodes;
        let hit = |pos: Pos2| hit_node(nodes, origin, visible, pos);

        // Link in progress: rubber band from the source bar to the pointer.
        if let (Some(source), Some(pointer)) = (view.link_source, ui.input(|i| i.pointer.latest_pos())) {
            if let Some(node) = view.output.nodes.iter().find(|n| &n.id == source) {
                let from = origin + Vec2::new(node.right(), HEADER_HEIGHT + node.center_y());
                painter.extend(Shape::dashed_line(&[from, pointer], Stroke::new(1.5, palette::ACCENT), 6.0, 4.0));
            }
        }

        if let Some(pos) = response.hover_pos() {
            let row = view
                .output
                .layouts
                .iter()
                .find(|l| {
                    let y = pos.y - origin.y - HEADER_HEIGHT;
                    y >= l.y_offset && y < l.y_offset + l.height
                })
                .map(|l| l.index);
            events.push(ChartEvent::HoverRow(row));

            match hit(pos) {
                Some(node) if node.draggable => {
                    let x = pos.x - origin.x;
                    if x - node.x <= HANDLE_WIDTH || node.right() - x <= HANDLE_WIDTH {
                        ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
                    } else {
                        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                    }
                }
                Some(node) if node.empty_range => {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::Cell);
                }
                _ => {}
            }
        } else {
            events.push(ChartEvent::HoverRow(None));
        }

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some(node) = hit(pos) {
                    events.push(ChartEvent::Select(Some(node.id.clone())));
                    if ui.input(|i| i.modifiers.shift) {
                        events.push(ChartEvent::LinkStarted(node.id.clone()));
                    } else {
                        let x = pos.x - origin.x;
                        let kind = if node.is_group() {
                            DragKind::Move
                        } else if x - node.x <= HANDLE_WIDTH {
                            DragKind::ResizeStart
                        } else if node.right() - x <= HANDLE_WIDTH {
                            DragKind::ResizeEnd
                        } else {
                            DragKind::Move
                        };
                        events.push(ChartEvent::DragStarted {
                            id: node.id.clone(),
                            kind,
                            pointer_x: pos.x,
                        });
                    }
                }
            }
        }

        if response.dragged() {
            if view.drag.is_some() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
            }
            if let Some(pos) = response.interact_pointer_pos() {
                events.push(ChartEvent::Dragged { pointer_x: pos.x });
            }
        }

        if response.drag_stopped() {
            if view.link_source.is_some() {
                let target = ui
                    .input(|i| i.pointer.latest_pos())
                    .and_then(|pos| hit(pos))
                    .map(|n| n.id.clone());
                events.push(ChartEvent::LinkReleased(target));
            }
            events.push(ChartEvent::DragReleased);
        }

        if response.clicked() {
            let clicked = response.interact_pointer_pos().and_then(|pos| hit(pos).map(|n| (n, pos)));
            match clicked {
                Some((node, pos)) if node.empty_range => {
                    if let Some(window) = view.output.window {
                        let date = offset_to_date(pos.x - origin.x, view.cell_width, window.origin);
                        events.push(ChartEvent::Schedule { id: node.id.clone(), date });
                    }
                }
                Some((node, _)) => events.push(ChartEvent::Select(Some(node.id.clone()))),
                None => events.push(ChartEvent::Select(None)),
            }
        }

        if response.secondary_clicked() {
            let incoming = response
                .interact_pointer_pos()
                .and_then(|pos| hit(pos))
                .and_then(|node| view.output.edges.iter().find(|e| e.target == node.id));
            if let Some(edge) = incoming {
                events.push(ChartEvent::Disconnect(edge.clone()));
            }
        }

        if let Some(pos) = response.hover_pos() {
            if let Some(node) = hit(pos).filter(|n| !n.empty_range) {
                show_tooltip(ui, view, node);
            }
        }
    });

    let inner = output.inner_rect;
    scroll.size = Some(ViewportSize {
        width: inner.width(),
        height: inner.height(),
    });
    scroll.scroll_y = output.state.offset.y;
    scroll.metrics = ScrollMetrics {
        scroll_left: output.state.offset.x,
        client_width: inner.width(),
        scroll_width: output.content_size.x,
    };

    events
}

/// The topmost bar under `pos`, ignoring the sticky header.
fn hit_node(nodes: &[Node], origin: Pos2, visible: Rect, pos: Pos2) -> Option<&Node> {
    if pos.y < visible.top() + HEADER_HEIGHT {
        return None;
    }
    let (x, y) = (pos.x - origin.x, pos.y - origin.y - HEADER_HEIGHT);
    nodes.iter().rev().find(|n| n.contains(x, y))
}

fn show_tooltip(ui: &Ui, view: &ChartView<'_>, node: &Node) {
    let task = view.tasks.iter().find(|t| t.row_id() == node.id);
    egui::show_tooltip_at_pointer(ui.ctx(), ui.layer_id(), egui::Id::new(("bar-tip", node.id.as_str())), |ui| {
        match (&node.group, task) {
            (Some(group), _) => {
                ui.strong(&group.value);
                ui.label(format!("{} tasks", group.leaf_count));
            }
            (None, Some(task)) => {
                ui.strong(&task.name);
                ui.label(format!("Progress: {}%", (task.progress * 100.0) as i32));
            }
            (None, None) => {}
        }
        if let (Some(start), Some(end)) = (node.start, node.end) {
            ui.label(format!("{} → {}", start.format("%d/%m/%Y"), end.format("%d/%m/%Y")));
        }
    });
}

fn draw_rows(painter: &Painter, view: &ChartView<'_>, origin: Pos2, visible: Rect) {
    for layout in &view.output.layouts {
        let top = origin.y + HEADER_HEIGHT + layout.y_offset;
        let row = Rect::from_x_y_ranges(visible.x_range(), top..=top + layout.height);
        let fill = if layout.is_group {
            palette::STORY_ROW
        } else if layout.index % 2 == 0 {
            palette::PANEL
        } else {
            palette::CANVAS
        };
        painter.rect_filled(row, 0.0, fill);
        painter.line_segment(
            [row.left_bottom(), row.right_bottom()],
            Stroke::new(0.5, palette::RULE),
        );
    }
}

fn draw_holidays(painter: &Painter, view: &ChartView<'_>, origin: Pos2, visible: Rect) {
    for span in &view.output.holidays {
        let x = origin.x + span.x;
        if x > visible.right() || x + span.width < visible.left() {
            continue;
        }
        let rect = Rect::from_x_y_ranges(x..=x + span.width, visible.top() + HEADER_HEIGHT..=visible.bottom());
        painter.rect_filled(rect, 0.0, palette::DAY_OFF);
    }
}

fn draw_grid(painter: &Painter, view: &ChartView<'_>, origin: Pos2, visible: Rect) {
    if view.cell_width < 6.0 {
        return;
    }
    let first = ((visible.left() - origin.x) / view.cell_width).floor().max(0.0) as usize;
    let last = ((visible.right() - origin.x) / view.cell_width).ceil() as usize;
    for i in first..=last {
        let x = origin.x + i as f32 * view.cell_width;
        painter.line_segment(
            [Pos2::new(x, visible.top() + HEADER_HEIGHT), Pos2::new(x, visible.bottom())],
            Stroke::new(0.5, palette::DAY_RULE),
        );
    }
}

/// Two header bands: month or week labels above, day numbers below.
fn draw_header(painter: &Painter, view: &ChartView<'_>, origin: Pos2, visible: Rect) {
    let band = Rect::from_min_size(visible.min, Vec2::new(visible.width(), HEADER_HEIGHT));
    painter.rect_filled(band, 0.0, palette::HEADER_BAND);
    painter.line_segment([band.left_bottom(), band.right_bottom()], Stroke::new(1.0, palette::RULE));

    let mid = band.top() + HEADER_HEIGHT / 2.0;
    let mut x = origin.x;
    for year in &view.output.header {
        for sub in &year.children {
            let width = sub.width();
            if x + width >= band.left() && x <= band.right() {
                draw_sub_unit(painter, year, sub, x, width, band);
                for (i, day) in sub.children.iter().enumerate() {
                    let dx = x + i as f32 * view.cell_width;
                    if view.cell_width < 16.0 || dx + view.cell_width < band.left() || dx > band.right() {
                        continue;
                    }
                    let color = if day.date.weekday().num_days_from_monday() >= 5 {
                        palette::INK_FAINT
                    } else {
                        palette::INK_MUTED
                    };
                    painter.text(
                        Pos2::new(dx + view.cell_width / 2.0, mid + HEADER_HEIGHT / 4.0),
                        Align2::CENTER_CENTER,
                        &day.label,
                        palette::label_font(),
                        color,
                    );
                }
            }
            x += width;
        }
    }
}

fn draw_sub_unit(painter: &Painter, year: &HeaderColumn, sub: &HeaderColumn, x: f32, width: f32, band: Rect) {
    painter.line_segment(
        [Pos2::new(x, band.top()), Pos2::new(x, band.bottom())],
        Stroke::new(1.0, palette::RULE),
    );
    // Keep the label of a partially scrolled column on screen.
    let label_x = x.max(band.left()) + 4.0;
    let column = Rect::from_x_y_ranges(x..=x + width, band.top()..=band.bottom());
    painter.with_clip_rect(column.intersect(band)).text(
        Pos2::new(label_x, band.top() + HEADER_HEIGHT / 4.0),
        Align2::LEFT_CENTER,
        format!("{} {}", sub.label, year.label),
        palette::heading_font(),
        palette::INK,
    );
}

fn draw_today_line(painter: &Painter, view: &ChartView<'_>, origin: Pos2, visible: Rect) {
    let Some(window) = view.output.window else {
        return;
    };
    if !window.range.contains(view.today) {
        return;
    }
    let x = origin.x + (day_offset(view.today, window.origin) as f32 + 0.5) * view.cell_width;
    painter.line_segment(
        [Pos2::new(x, visible.top() + HEADER_HEIGHT), Pos2::new(x, visible.bottom())],
        Stroke::new(1.5, palette::TODAY),
    );

    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(
        Pos2::new(x - badge_w / 2.0, visible.top() + HEADER_HEIGHT - 1.0),
        Vec2::new(badge_w, 14.0),
    );
    painter.rect_filled(badge_rect, Rounding::same(3.0), palette::TODAY);
    painter.text(badge_rect.center(), Align2::CENTER_CENTER, "Today", palette::caption_font(), Color32::WHITE);
}

fn draw_milestones(painter: &Painter, view: &ChartView<'_>, origin: Pos2, visible: Rect) {
    for marker in &view.output.milestones {
        let x = origin.x + marker.x;
        if x < visible.left() || x > visible.right() {
            continue;
        }
        painter.line_segment(
            [Pos2::new(x, visible.top() + HEADER_HEIGHT), Pos2::new(x, visible.bottom())],
            Stroke::new(1.0, marker.color.gamma_multiply(0.7)),
        );
        let (y, align) = match marker.position {
            MilestonePosition::Top => (visible.top() + HEADER_HEIGHT + 22.0, Align2::LEFT_CENTER),
            MilestonePosition::Bottom => (visible.bottom() - 12.0, Align2::LEFT_CENTER),
        };
        let size = 6.0;
        painter.add(Shape::convex_polygon(
            vec![
                Pos2::new(x, y - size),
                Pos2::new(x + size, y),
                Pos2::new(x, y + size),
                Pos2::new(x - size, y),
            ],
            marker.color,
            Stroke::NONE,
        ));
        painter.text(Pos2::new(x + size + 4.0, y), align, &marker.title, palette::caption_font(), marker.color);
    }
}

/// Bar rectangle for `node`, following the drag preview when it is the one
/// being dragged.
fn bar_rect(view: &ChartView<'_>, node: &Node, origin: Pos2) -> Rect {
    let (mut x, mut width) = (node.x, node.width);
    if let (Some(drag), Some(window)) = (view.drag, view.output.window) {
        if drag.id == node.id {
            let (start, end) = drag.preview;
            x = day_offset(start, window.origin) as f32 * view.cell_width;
            width = (day_diff(Some(end), Some(start), 0) + 1) as f32 * view.cell_width;
        }
    }
    Rect::from_min_size(origin + Vec2::new(x, HEADER_HEIGHT + node.y), Vec2::new(width, node.height))
}

fn draw_node(painter: &Painter, view: &ChartView<'_>, node: &Node, origin: Pos2) {
    let rect = bar_rect(view, node, origin);
    let rounding = Rounding::same(palette::BAR_ROUNDING);
    let is_selected = view.selected == Some(&node.id);

    if node.empty_range {
        if view.reveal_row == Some(node.row_index) {
            painter.rect_stroke(rect, rounding, Stroke::new(1.0, palette::INK_FAINT));
            painter.text(rect.center(), Align2::CENTER_CENTER, "+", palette::bar_font(), palette::INK_FAINT);
        }
        return;
    }

    if let Some(group) = &node.group {
        // Bracket-style summary bar.
        let bar = Rect::from_min_size(rect.min, Vec2::new(rect.width(), rect.height() * 0.45));
        painter.rect_filled(bar, Rounding::same(2.0), palette::STORY_BAR);
        for cap_x in [bar.left(), bar.right()] {
            let dir = if cap_x == bar.left() { 1.0 } else { -1.0 };
            painter.add(Shape::convex_polygon(
                vec![
                    Pos2::new(cap_x, bar.bottom()),
                    Pos2::new(cap_x + dir * 6.0, bar.bottom()),
                    Pos2::new(cap_x, bar.bottom() + 6.0),
                ],
                palette::STORY_BAR,
                Stroke::NONE,
            ));
        }
        painter.text(
            Pos2::new(bar.left() + 6.0, bar.center().y),
            Align2::LEFT_CENTER,
            &group.value,
            palette::caption_font(),
            palette::INK_ON_BAR,
        );
        if is_selected {
            painter.rect_stroke(bar.expand(1.5), Rounding::same(3.5), Stroke::new(2.0, palette::FOCUS_RING));
        }
        return;
    }

    let task = view.tasks.iter().find(|t| t.row_id() == node.id);
    let color = task.map_or(palette::ACCENT, |t| t.color);

    // Soft shadow
    painter.rect_filled(rect.translate(Vec2::new(1.0, 2.0)), rounding, Color32::from_black_alpha(35));
    painter.rect_filled(rect, rounding, color);
    let highlight = Rect::from_min_size(rect.min, Vec2::new(rect.width(), (rect.height() * 0.45).max(4.0)));
    painter.rect_filled(
        highlight,
        Rounding {
            nw: palette::BAR_ROUNDING,
            ne: palette::BAR_ROUNDING,
            sw: 0.0,
            se: 0.0,
        },
        Color32::from_white_alpha(25),
    );

    if let Some(task) = task.filter(|t| t.progress > 0.0) {
        let progress = Rect::from_min_size(rect.min, Vec2::new(rect.width() * task.progress.clamp(0.0, 1.0), rect.height()));
        painter.rect_filled(progress, rounding, palette::DONE_SHADE);
    }

    if is_selected {
        painter.rect_stroke(
            rect.expand(1.5),
            Rounding::same(palette::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, palette::FOCUS_RING),
        );
        let handle_h = rect.height() * 0.55;
        let handle_y = rect.center().y - handle_h / 2.0;
        for hx in [rect.left() - 1.5, rect.right() - 2.5] {
            painter.rect_filled(
                Rect::from_min_size(Pos2::new(hx, handle_y), Vec2::new(4.0, handle_h)),
                Rounding::same(2.0),
                palette::GRIP,
            );
        }
    }

    if let Some(task) = task.filter(|_| rect.width() > 30.0) {
        let galley = painter.layout_no_wrap(task.name.clone(), palette::bar_font(), palette::INK_ON_BAR);
        let text_y = rect.top() + (rect.height() - galley.size().y) / 2.0;
        painter
            .with_clip_rect(rect.intersect(painter.clip_rect()))
            .galley(Pos2::new(rect.left() + 6.0, text_y), galley, Color32::TRANSPARENT);
    }
}

/// Elbow connectors from the end of each source bar to the start of its
/// target. Links still being validated are dashed.
fn draw_edges(painter: &Painter, view: &ChartView<'_>, origin: Pos2) {
    let nodes = &view.output.nodes;
    let find = |id: &RowId| nodes.iter().find(|n| &n.id == id);

    let settled = view.output.edges.iter().map(|e| (e, false));
    let transient = view.transient_edges.iter().map(|e| (*e, true));
    for (edge, dashed) in settled.chain(transient) {
        let (Some(source), Some(target)) = (find(&edge.source), find(&edge.target)) else {
            continue;
        };
        let from_rect = bar_rect(view, source, origin);
        let to_rect = bar_rect(view, target, origin);
        let from = Pos2::new(from_rect.right(), from_rect.center().y);
        let to = Pos2::new(to_rect.left(), to_rect.center().y);
        let elbow_x = (from.x + 8.0).max(to.x - 8.0);
        let points = vec![
            from,
            Pos2::new(elbow_x, from.y),
            Pos2::new(elbow_x, to.y),
            to,
        ];

        let stroke = Stroke::new(1.2, if dashed { palette::ACCENT } else { palette::LINK });
        if dashed {
            painter.extend(Shape::dashed_line(&points, stroke, 5.0, 3.0));
        } else {
            painter.add(Shape::line(points, stroke));
        }
        painter.add(Shape::convex_polygon(
            vec![to, to + Vec2::new(-6.0, -4.0), to + Vec2::new(-6.0, 4.0)],
            stroke.color,
            Stroke::NONE,
        ));
    }
}
