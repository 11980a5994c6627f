//! Memoized layout pass.
//!
//! Inputs are compared structurally against the previous pass. The header
//! and markers are rebuilt only when the axis inputs change; rows are
//! projected again when either the axis or the projection inputs change.
//! Projection always runs after the header rebuild, since it consumes the
//! same window and cell width.

use chrono::NaiveDate;

use super::axis::{build_header, leaf_count, HeaderColumn};
use super::markers::{holiday_spans, milestone_markers, HolidaySpan, MilestoneMarker};
use super::projector::{project, project_edges};
use super::virtual_rows::{layout_visible_rows, RowLayout, VirtualItem};
use crate::model::{
    AxisMode, Edge, GanttOptions, GanttRecord, GroupingOptions, HeaderLabels, HolidayCalendar,
    Milestone, Node, Row, TimelineWindow,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AxisInputs {
    pub mode: AxisMode,
    pub window: TimelineWindow,
    pub cell_width: f32,
    pub week_starts_monday: bool,
    pub labels: HeaderLabels,
    pub calendar: HolidayCalendar,
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionInputs {
    /// Bumped by the host whenever its row set or records change.
    pub rows_revision: u64,
    pub items: Vec<VirtualItem>,
    pub bar_margin: f32,
    pub group_gap: f32,
    pub min_bar_range_days: i64,
    pub grouping: Option<GroupingOptions>,
    /// Where undated rows are drawn. Follows the viewport, not the records.
    pub empty_anchor: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutInputs {
    pub axis: AxisInputs,
    pub projection: ProjectionInputs,
}

impl LayoutInputs {
    pub fn from_options(
        options: &GanttOptions,
        window: TimelineWindow,
        cell_width: f32,
        rows_revision: u64,
        items: Vec<VirtualItem>,
    ) -> Self {
        Self {
            axis: AxisInputs {
                mode: options.mode,
                window,
                cell_width,
                week_starts_monday: options.is_week_start_monday,
                labels: options.labels.clone(),
                calendar: options.holiday_calendar(),
                milestones: options.milestones.clone(),
            },
            projection: ProjectionInputs {
                rows_revision,
                items,
                bar_margin: options.bar_margin,
                group_gap: options.group_gap,
                min_bar_range_days: options.min_bar_range,
                grouping: options.grouping(),
                empty_anchor: None,
            },
        }
    }

    /// Place undated rows on `date` instead of the window origin.
    pub fn with_empty_anchor(mut self, date: NaiveDate) -> Self {
        self.projection.empty_anchor = Some(date);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutOutput {
    pub window: Option<TimelineWindow>,
    pub header: Vec<HeaderColumn>,
    /// Total scrollable width: one cell per header leaf.
    pub content_width: f32,
    pub holidays: Vec<HolidaySpan>,
    pub milestones: Vec<MilestoneMarker>,
    pub layouts: Vec<RowLayout>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub header_builds: usize,
    pub projections: usize,
}

#[derive(Debug, Default)]
pub struct LayoutPipeline {
    axis: Option<AxisInputs>,
    projection: Option<ProjectionInputs>,
    output: LayoutOutput,
    stats: PipelineStats,
}

impl LayoutPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> &LayoutOutput {
        &self.output
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Whether the last pass was built for `window`.
    pub fn is_built_for(&self, window: TimelineWindow) -> bool {
        self.output.window == Some(window)
    }

    /// Forget memoized inputs so the next pass rebuilds everything.
    pub fn invalidate(&mut self) {
        self.axis = None;
        self.projection = None;
    }

    pub fn recompute<T: GanttRecord>(
        &mut self,
        inputs: LayoutInputs,
        rows: &[Row<'_, T>],
    ) -> &LayoutOutput {
        let LayoutInputs { axis, projection } = inputs;

        let axis_changed = self.axis.as_ref() != Some(&axis);
        if axis_changed {
            let window = axis.window;
            let header = build_header(
                axis.mode,
                window.range.start,
                window.range.end,
                &axis.labels,
                axis.cell_width,
                axis.week_starts_monday,
            );
            self.output.content_width = leaf_count(&header) as f32 * axis.cell_width;
            self.output.header = header;
            self.output.holidays = holiday_spans(window.range, window.origin, axis.cell_width, |d| {
                axis.calendar.is_holiday(d)
            });
            self.output.milestones = milestone_markers(&axis.milestones, window, axis.cell_width);
            self.output.window = Some(window);
            self.stats.header_builds += 1;
            log::debug!(
                "rebuilt header for {} ..= {} ({} px)",
                window.range.start,
                window.range.end,
                self.output.content_width
            );
        }

        if axis_changed || self.projection.as_ref() != Some(&projection) {
            let layouts = layout_visible_rows(
                rows,
                &projection.items,
                projection.bar_margin,
                projection.group_gap,
            );
            let nodes = project(
                rows,
                &layouts,
                axis.window.origin,
                axis.cell_width,
                projection.min_bar_range_days,
                projection.grouping.as_ref(),
                projection.empty_anchor,
            );
            self.output.edges = project_edges(rows, &layouts, &nodes);
            self.output.nodes = nodes;
            self.output.layouts = layouts;
            self.stats.projections += 1;
            self.projection = Some(projection);
        }

        if axis_changed {
            self.axis = Some(axis);
        }
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::group::leaf_rows;
    use crate::model::{RowId, TimeRange};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Span(&'static str, NaiveDate, NaiveDate);

    impl GanttRecord for Span {
        fn record_id(&self) -> RowId {
            RowId::from(self.0)
        }
        fn bar_start(&self) -> Option<NaiveDate> {
            Some(self.1)
        }
        fn bar_end(&self) -> Option<NaiveDate> {
            Some(self.2)
        }
    }

    fn inputs(window: TimelineWindow, revision: u64) -> LayoutInputs {
        let options = GanttOptions::default();
        let items = vec![VirtualItem {
            index: 0,
            start: 0.0,
            size: 36.0,
        }];
        LayoutInputs::from_options(&options, window, 40.0, revision, items)
    }

    #[test]
    fn identical_inputs_are_memoized() {
        let records = [Span("a", date(2024, 1, 3), date(2024, 1, 4))];
        let rows = leaf_rows(&records);
        let window = TimelineWindow::new(TimeRange::new(date(2024, 1, 1), date(2024, 1, 31)));
        let mut pipeline = LayoutPipeline::new();

        let output = pipeline.recompute(inputs(window, 1), &rows).clone();
        assert_eq!(output.content_width, 31.0 * 40.0);
        assert_eq!(output.nodes[0].x, 80.0);
        assert!(pipeline.is_built_for(window));

        pipeline.recompute(inputs(window, 1), &rows);
        assert_eq!(
            pipeline.stats(),
            PipelineStats {
                header_builds: 1,
                projections: 1
            }
        );

        // New rows only re-project.
        pipeline.recompute(inputs(window, 2), &rows);
        assert_eq!(pipeline.stats().header_builds, 1);
        assert_eq!(pipeline.stats().projections, 2);
    }

    #[test]
    fn range_change_rebuilds_header_before_projection() {
        let records = [Span("a", date(2024, 1, 3), date(2024, 1, 4))];
        let rows = leaf_rows(&records);
        let mut pipeline = LayoutPipeline::new();
        let window = TimelineWindow::new(TimeRange::new(date(2024, 1, 1), date(2024, 1, 31)));
        pipeline.recompute(inputs(window, 1), &rows);

        let mut wider = window;
        wider.range.extend_start(20);
        wider.origin = wider.range.start;
        let output = pipeline.recompute(inputs(wider, 1), &rows);
        assert_eq!(output.content_width, 51.0 * 40.0);
        assert_eq!(output.nodes[0].x, 22.0 * 40.0);
        assert_eq!(pipeline.stats().header_builds, 2);
        assert_eq!(pipeline.stats().projections, 2);
    }
}
