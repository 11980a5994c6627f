use std::time::{Duration, Instant};

use chrono::NaiveDate;
use uuid::Uuid;

use gantt_timeline::engine::{
    drive_window, group_rows, leaf_rows, BarGesture, Connection, Debounce, LayoutInputs,
    LayoutPipeline, LinkGesture, LinkOutcome, RowVirtualizer, Throttle, WindowController,
    WindowState,
};
use gantt_timeline::model::{GanttOptions, GroupOption, Milestone, MilestonePosition, Row, RowId};

use crate::tasks::{self, Task, TaskBoard};
use crate::ui;
use crate::ui::gantt_chart::{ChartEvent, ChartView, ChartViewport};
use crate::ui::task_table::TaskTableAction;

const OVERSCAN: usize = 8;
const HOVER_REVEAL: Duration = Duration::from_millis(400);
const LINK_VALIDATION: Duration = Duration::from_millis(800);

/// A connection waiting on the background validator.
struct DeferredLink {
    ticket: u64,
    source: Uuid,
    target: Uuid,
    due: Instant,
}

/// Main application state.
pub struct GanttApp {
    pub tasks: Vec<Task>,
    pub options: GanttOptions,
    pub controller: WindowController,
    pub today: NaiveDate,
    pub jump_date: NaiveDate,
    pub defer_links: bool,
    pub selected: Option<RowId>,

    // Status message
    pub status_message: String,

    pipeline: LayoutPipeline,
    throttle: Throttle,
    last_inputs: Option<LayoutInputs>,
    rows_revision: u64,
    chart_viewport: ChartViewport,

    bar_gesture: BarGesture,
    link_gesture: LinkGesture,
    deferred: Vec<DeferredLink>,

    hover: Debounce,
    hover_row: Option<usize>,
    reveal_row: Option<usize>,
}

impl GanttApp {
    pub fn new(cc: &eframe::CreationContext<'_>, options: Option<GanttOptions>) -> Self {
        ui::palette::install(&cc.egui_ctx);

        let today = chrono::Local::now().date_naive();
        let options = options.unwrap_or_else(|| Self::sample_options(today));
        let controller = WindowController::anchored(today, &options);
        log::info!(
            "starting with {:?} axis, {} px cells, window {} ..= {}",
            options.mode,
            options.cell_width,
            controller.window().range.start,
            controller.window().range.end
        );

        Self {
            tasks: tasks::sample_tasks(today),
            throttle: Throttle::from_millis(options.throttle_ms),
            options,
            controller,
            today,
            jump_date: today,
            defer_links: false,
            selected: None,
            status_message: "Ready".to_string(),
            pipeline: LayoutPipeline::new(),
            last_inputs: None,
            rows_revision: 0,
            chart_viewport: ChartViewport::default(),
            bar_gesture: BarGesture::default(),
            link_gesture: LinkGesture::default(),
            deferred: Vec::new(),
            hover: Debounce::new(HOVER_REVEAL),
            hover_row: None,
            reveal_row: None,
        }
    }

    /// Options used when none are given on the command line.
    fn sample_options(today: NaiveDate) -> GanttOptions {
        GanttOptions {
            is_group_view: true,
            group_options: vec![GroupOption {
                column_id: "story".to_string(),
                component: "groupbar".to_string(),
                is_fixed_x: false,
            }],
            milestones: vec![Milestone {
                date: today + chrono::Duration::days(31),
                title: "Launch".to_string(),
                color: egui::Color32::from_rgb(255, 165, 0),
                position: MilestonePosition::Top,
            }],
            ..GanttOptions::default()
        }
    }

    /// The task set or its grouping changed; re-project on the next frame.
    pub fn rows_changed(&mut self) {
        self.rows_revision += 1;
    }

    pub fn zoom_by(&mut self, factor: f32) {
        self.zoom_to(self.controller.cell_width() * factor);
    }

    pub fn zoom_to(&mut self, cell_width: f32) {
        let cell_width = ui::toolbar::clamp_cell_width(cell_width);
        self.options.cell_width = cell_width;
        self.controller.set_cell_width(cell_width);
    }

    pub fn jump_to(&mut self, date: NaiveDate) {
        self.controller.jump_to(date);
        self.status_message = format!("Jumped to {}", date.format("%Y-%m-%d"));
    }

    /// Settle deferred connections whose validation has finished.
    fn settle_links(&mut self, now: Instant) {
        let (due, waiting): (Vec<_>, Vec<_>) = self.deferred.drain(..).partition(|d| d.due <= now);
        self.deferred = waiting;

        for link in due {
            let accepted = !tasks::would_cycle(&self.tasks, link.source, link.target);
            match self.link_gesture.resolve(link.ticket, accepted) {
                Ok(Some(_)) if tasks::link(&mut self.tasks, link.source, link.target) => {
                    self.status_message = "Link validated".to_string();
                    self.rows_changed();
                }
                Ok(_) => self.status_message = "Link rejected".to_string(),
                Err(err) => log::warn!("{err}"),
            }
        }
    }

    fn handle_chart_event(&mut self, event: ChartEvent, now: Instant) {
        match event {
            ChartEvent::Select(id) => self.selected = id,
            ChartEvent::DragStarted { id, kind, pointer_x } => {
                let node = self.pipeline.output().nodes.iter().find(|n| n.id == id);
                if let Some(node) = node {
                    let min_range = self.options.min_bar_range;
                    if let Err(err) = self.bar_gesture.begin(kind, node, pointer_x, min_range) {
                        log::debug!("{err}");
                    }
                }
            }
            ChartEvent::Dragged { pointer_x } => {
                self.bar_gesture.update(pointer_x, self.controller.cell_width());
            }
            ChartEvent::DragReleased => {
                if !self.bar_gesture.is_active() {
                    return;
                }
                let mut board = TaskBoard {
                    tasks: &mut self.tasks,
                    status: &mut self.status_message,
                    defer_links: self.defer_links,
                };
                match self.bar_gesture.commit(&self.pipeline.output().nodes, &mut board) {
                    Ok(Some(_)) => self.rows_changed(),
                    Ok(None) => {}
                    Err(err) => self.status_message = err.to_string(),
                }
            }
            ChartEvent::LinkStarted(id) => {
                self.bar_gesture.cancel();
                self.link_gesture.begin(id);
            }
            ChartEvent::LinkReleased(None) => self.link_gesture.cancel(),
            ChartEvent::LinkReleased(Some(target)) => {
                let connection = self.link_gesture.source().cloned().map(|source| Connection {
                    source,
                    target: target.clone(),
                });
                let mut board = TaskBoard {
                    tasks: &mut self.tasks,
                    status: &mut self.status_message,
                    defer_links: self.defer_links,
                };
                match self.link_gesture.complete(&target, &self.pipeline.output().nodes, &mut board) {
                    Ok(LinkOutcome::Committed(edge)) => {
                        log::info!("linked {}", edge.id());
                        self.rows_changed();
                    }
                    Ok(LinkOutcome::Rejected) => {}
                    Ok(LinkOutcome::Pending(ticket)) => {
                        if let Some((source, target)) = connection.as_ref().and_then(tasks::connection_ids) {
                            self.deferred.push(DeferredLink {
                                ticket,
                                source,
                                target,
                                due: now + LINK_VALIDATION,
                            });
                        }
                    }
                    Err(err) => self.status_message = err.to_string(),
                }
            }
            ChartEvent::Disconnect(edge) => {
                let mut board = TaskBoard {
                    tasks: &mut self.tasks,
                    status: &mut self.status_message,
                    defer_links: self.defer_links,
                };
                self.link_gesture.disconnect(&edge, &mut board);
                self.rows_changed();
            }
            ChartEvent::Schedule { id, date } => {
                let min_range = chrono::Duration::days(self.options.min_bar_range);
                if let Some(task) = tasks::find_by_row(&mut self.tasks, &id) {
                    task.start = Some(date);
                    task.end = Some(date + min_range);
                    self.status_message = format!("Scheduled '{}' on {}", task.name, date.format("%Y-%m-%d"));
                    self.rows_changed();
                }
            }
            ChartEvent::HoverRow(row) => {
                if row != self.hover_row {
                    self.hover_row = row;
                    self.reveal_row = None;
                    if row.is_some() {
                        self.hover.schedule(now);
                    } else {
                        self.hover.cancel();
                    }
                }
            }
            ChartEvent::Zoom(factor) => self.zoom_by(factor),
        }
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::palette::STATUS_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::palette::HEADER_BAND)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::palette::label_font())
                            .color(ui::palette::INK_MUTED),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let stats = self.pipeline.stats();
                        ui.label(
                            egui::RichText::new(format!(
                                "Tasks: {} · Rendered: {} · Header builds: {} · Projections: {}",
                                self.tasks.len(),
                                self.pipeline.output().nodes.len(),
                                stats.header_builds,
                                stats.projections
                            ))
                            .size(10.5)
                            .color(ui::palette::INK_FAINT),
                        );
                    });
                });
            });
    }
}

fn build_rows<'a>(tasks: &'a [Task], options: &GanttOptions) -> Vec<Row<'a, Task>> {
    if options.is_group_view {
        group_rows(tasks, "story", |t| t.story.clone())
    } else {
        leaf_rows(tasks)
    }
}

/// Whether only scroll-driven inputs moved since `last`: the realized rows
/// or the day undated rows are drawn on.
fn scrolled_only(last: &LayoutInputs, next: &LayoutInputs) -> bool {
    let (a, b) = (&last.projection, &next.projection);
    last.axis == next.axis
        && a.rows_revision == b.rows_revision
        && a.grouping == b.grouping
        && a.min_bar_range_days == b.min_bar_range_days
        && (a.items != b.items || a.empty_anchor != b.empty_anchor)
}

impl eframe::App for GanttApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.settle_links(now);
        if self.hover.poll(now) {
            self.reveal_row = self.hover_row;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.bar_gesture.cancel();
            self.link_gesture.cancel();
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(2.0);
            ui::toolbar::show_toolbar(self, ui);
            ui.add_space(2.0);
        });
        self.show_status_bar(ctx);

        let mut events = Vec::new();
        let mut table_action = TaskTableAction::None;
        {
            let rows = build_rows(&self.tasks, &self.options);
            let row_height = self.options.row_height;
            let virtualizer = RowVirtualizer::new(rows.len(), |_| row_height, OVERSCAN);
            let items = virtualizer.visible_items(
                self.chart_viewport.scroll_y,
                self.chart_viewport.rows_height(),
            );

            let inputs = LayoutInputs::from_options(
                &self.options,
                self.controller.window(),
                self.controller.cell_width(),
                self.rows_revision,
                items.clone(),
            )
            .with_empty_anchor(self.controller.leading_date());
            let run = match &self.last_inputs {
                Some(last) if *last == inputs => self.throttle.poll(now),
                Some(last) if scrolled_only(last, &inputs) => self.throttle.trigger(now),
                _ => true,
            };
            self.last_inputs = Some(inputs);
            if run {
                if let Some(inputs) = self.last_inputs.clone() {
                    self.pipeline.recompute(inputs, &rows);
                }
            }
            if let Some(wait) = self.throttle.remaining(now) {
                ctx.request_repaint_after(wait);
            }

            // Left panel: task table
            egui::SidePanel::left("task_panel")
                .default_width(ui::palette::TABLE_WIDTH)
                .min_width(200.0)
                .resizable(true)
                .frame(
                    egui::Frame::default()
                        .fill(ui::palette::PANEL)
                        .stroke(egui::Stroke::new(1.0, ui::palette::RULE)),
                )
                .show(ctx, |ui| {
                    table_action = ui::task_table::show_task_table(
                        &rows,
                        &items,
                        self.chart_viewport.scroll_y,
                        self.selected.as_ref(),
                        ui,
                    );
                });

            // Central panel: Gantt chart
            let view = ChartView {
                output: self.pipeline.output(),
                tasks: &self.tasks,
                cell_width: self.controller.cell_width(),
                rows_height: virtualizer.total_size(),
                selected: self.selected.as_ref(),
                drag: self.bar_gesture.snapshot(),
                link_source: self.link_gesture.source(),
                transient_edges: self.link_gesture.transient_edges().collect(),
                reveal_row: self.reveal_row,
                today: self.today,
            };
            let chart_frame = egui::Frame::default()
                .fill(ui::palette::CANVAS)
                .inner_margin(egui::Margin::ZERO);
            egui::CentralPanel::default().frame(chart_frame).show(ctx, |ui| {
                events = ui::gantt_chart::show_gantt_chart(&view, &mut self.chart_viewport, ui);
            });
        }

        if let TaskTableAction::Select(id) = table_action {
            self.selected = Some(id);
        }
        for event in events {
            self.handle_chart_event(event, now);
        }

        let header_ready = self.pipeline.is_built_for(self.controller.window());
        let grew = drive_window(&mut self.controller, &mut self.chart_viewport, header_ready);
        if grew || self.controller.state() != WindowState::Idle || self.controller.has_pending_jump() {
            ctx.request_repaint();
        }
        if !self.deferred.is_empty() || self.hover.is_pending() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}
