//! Infinite horizontal scrolling.
//!
//! The controller owns the materialized [`TimelineWindow`]. When the
//! viewport touches either edge it grows the range by `buffer_day` days and
//! queues a scroll correction that keeps the same dates under the viewport.
//! The correction is released by [`WindowController::on_layout`] once the
//! host has rebuilt the header for the new range.

use chrono::{Duration, Months, NaiveDate};

use super::day_offset::{day_offset, days_to_pixels, offset_to_date};
use crate::model::{GanttOptions, TimeRange, TimelineWindow};

/// Slack when deciding the viewport sits at the right edge.
const EDGE_EPSILON: f32 = 1.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_left: f32,
    pub client_width: f32,
    pub scroll_width: f32,
}

impl ScrollMetrics {
    pub fn at_left_edge(&self) -> bool {
        self.scroll_left <= 0.0
    }

    pub fn at_right_edge(&self) -> bool {
        self.scroll_left + self.client_width >= self.scroll_width - EDGE_EPSILON
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

/// A scroll instruction for the host. `target` is absolute; `delta` is the
/// change relative to the offset the controller last saw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCorrection {
    pub target: f32,
    pub delta: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowState {
    Idle,
    PendingRebaseLeft { correction: ScrollCorrection },
    PendingRebaseRight { correction: ScrollCorrection },
}

#[derive(Debug, Clone)]
pub struct WindowController {
    window: TimelineWindow,
    state: WindowState,
    cell_width: f32,
    buffer_day: i64,
    buffer_months: [u32; 2],
    lead_in_days: i64,
    infinite: bool,
    last_scroll_left: f32,
    anchor: Option<NaiveDate>,
    pending_jump: Option<NaiveDate>,
    pending_zoom: Option<ScrollCorrection>,
    last_size: Option<ViewportSize>,
    size_stable: bool,
}

impl WindowController {
    pub fn new(range: TimeRange, options: &GanttOptions) -> Self {
        Self {
            window: TimelineWindow::new(range),
            state: WindowState::Idle,
            cell_width: options.cell_width,
            buffer_day: options.buffer_day,
            buffer_months: options.buffer_months,
            lead_in_days: options.lead_in_days,
            infinite: options.is_infinite_horizontal,
            last_scroll_left: 0.0,
            anchor: None,
            pending_jump: None,
            pending_zoom: None,
            last_size: None,
            size_stable: false,
        }
    }

    /// A controller materializing `buffer_months` around `date`, with a
    /// pending jump that scrolls `date` into view.
    pub fn anchored(date: NaiveDate, options: &GanttOptions) -> Self {
        let mut controller = Self::new(TimeRange::new(date, date), options);
        controller.anchor_to(date);
        controller
    }

    pub fn window(&self) -> TimelineWindow {
        self.window
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn cell_width(&self) -> f32 {
        self.cell_width
    }

    pub fn anchor(&self) -> Option<NaiveDate> {
        self.anchor
    }

    pub fn has_pending_jump(&self) -> bool {
        self.pending_jump.is_some()
    }

    /// The day a jump would put `lead_in_days` from the viewport's left
    /// edge, clamped to the window. A queued jump answers with its target.
    pub fn leading_date(&self) -> NaiveDate {
        let date = self.pending_jump.unwrap_or_else(|| {
            offset_to_date(self.last_scroll_left, self.cell_width, self.window.origin)
                + Duration::days(self.lead_in_days)
        });
        date.clamp(self.window.range.start, self.window.range.end)
    }

    /// Pick up option changes that don't need a rebase.
    pub fn configure(&mut self, options: &GanttOptions) {
        self.buffer_day = options.buffer_day;
        self.buffer_months = options.buffer_months;
        self.lead_in_days = options.lead_in_days;
        self.infinite = options.is_infinite_horizontal;
        if options.cell_width != self.cell_width {
            self.set_cell_width(options.cell_width);
        }
    }

    /// React to a scroll event. Returns `true` when the range grew.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        self.last_scroll_left = metrics.scroll_left;

        if !self.infinite || self.state != WindowState::Idle || self.pending_jump.is_some() {
            return false;
        }

        if metrics.at_left_edge() {
            self.window.range.extend_start(self.buffer_day);
            self.window.origin = self.window.range.start;
            let delta = days_to_pixels(self.buffer_day, self.cell_width);
            self.state = WindowState::PendingRebaseLeft {
                correction: ScrollCorrection {
                    target: metrics.scroll_left + delta,
                    delta,
                },
            };
            log::debug!(
                "rebased left by {} days, range now {} ..= {}",
                self.buffer_day,
                self.window.range.start,
                self.window.range.end
            );
            true
        } else if metrics.at_right_edge() {
            // Appending keeps the origin, so holding the offset keeps the dates in place.
            self.window.range.extend_end(self.buffer_day);
            self.state = WindowState::PendingRebaseRight {
                correction: ScrollCorrection {
                    target: metrics.scroll_left,
                    delta: 0.0,
                },
            };
            log::debug!(
                "extended right by {} days, range now {} ..= {}",
                self.buffer_day,
                self.window.range.start,
                self.window.range.end
            );
            true
        } else {
            false
        }
    }

    /// Record the latest viewport size. A jump waits until two consecutive
    /// observations agree on a non-zero width.
    pub fn on_resize(&mut self, size: ViewportSize) {
        self.size_stable = size.width > 0.0 && self.last_size == Some(size);
        self.last_size = Some(size);
    }

    /// Called after the header has been rebuilt for the current range.
    /// Releases at most one pending scroll correction.
    pub fn on_layout(&mut self) -> Option<ScrollCorrection> {
        match self.state {
            WindowState::PendingRebaseLeft { correction }
            | WindowState::PendingRebaseRight { correction } => {
                self.state = WindowState::Idle;
                self.last_scroll_left = correction.target;
                return Some(correction);
            }
            WindowState::Idle => {}
        }

        if let Some(correction) = self.pending_zoom.take() {
            self.last_scroll_left = correction.target;
            return Some(correction);
        }

        let date = self.pending_jump?;
        if !self.size_stable {
            return None;
        }
        self.pending_jump = None;
        let target = days_to_pixels(
            day_offset(date, self.window.origin) - self.lead_in_days,
            self.cell_width,
        )
        .max(0.0);
        let correction = ScrollCorrection {
            target,
            delta: target - self.last_scroll_left,
        };
        self.last_scroll_left = target;
        log::debug!("jumped to {date} at {target}px");
        Some(correction)
    }

    /// Materialize `buffer_months` around `date` and queue a jump to it.
    /// Does nothing when already anchored at `date`.
    pub fn anchor_to(&mut self, date: NaiveDate) -> bool {
        if self.anchor == Some(date) {
            return false;
        }
        let [before, after] = self.buffer_months;
        let start = date.checked_sub_months(Months::new(before)).unwrap_or(date);
        let end = date.checked_add_months(Months::new(after)).unwrap_or(date);

        self.window = TimelineWindow::new(TimeRange::new(start, end));
        self.state = WindowState::Idle;
        self.pending_zoom = None;
        self.anchor = Some(date);
        self.pending_jump = Some(date);
        log::debug!("anchored at {date}, range {start} ..= {end}");
        true
    }

    /// Like [`Self::anchor_to`], but always re-anchors.
    pub fn jump_to(&mut self, date: NaiveDate) {
        self.anchor = None;
        self.anchor_to(date);
    }

    /// Change the zoom level, keeping the day at the viewport's left edge.
    ///
    /// A queued rebase correction is rescaled in place, so it lands on the
    /// same day at the new width and no separate zoom correction follows.
    pub fn set_cell_width(&mut self, cell_width: f32) {
        if !(cell_width > 0.0) || cell_width == self.cell_width {
            return;
        }
        let scale = cell_width / self.cell_width;
        self.cell_width = cell_width;
        match &mut self.state {
            WindowState::PendingRebaseLeft { correction }
            | WindowState::PendingRebaseRight { correction } => {
                correction.target *= scale;
                correction.delta = correction.target - self.last_scroll_left;
                self.pending_zoom = None;
            }
            WindowState::Idle => {
                // Zooming twice before a layout scales the queued target again.
                let from = self.pending_zoom.map_or(self.last_scroll_left, |z| z.target);
                let target = from * scale;
                self.pending_zoom = Some(ScrollCorrection {
                    target,
                    delta: target - self.last_scroll_left,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn controller() -> WindowController {
        let options = GanttOptions {
            cell_width: 30.0,
            buffer_day: 20,
            ..Default::default()
        };
        WindowController::new(TimeRange::new(date(2024, 3, 1), date(2024, 5, 31)), &options)
    }

    fn metrics(scroll_left: f32) -> ScrollMetrics {
        ScrollMetrics {
            scroll_left,
            client_width: 600.0,
            scroll_width: 92.0 * 30.0,
        }
    }

    #[test]
    fn unchanged_scroll_keeps_the_range() {
        let mut controller = controller();
        let before = controller.window();
        for _ in 0..5 {
            assert!(!controller.on_scroll(metrics(450.0)));
            assert_eq!(controller.on_layout(), None);
        }
        assert_eq!(controller.window(), before);
    }

    #[test]
    fn left_edge_extends_start_and_corrects_once() {
        let mut controller = controller();
        assert!(controller.on_scroll(metrics(0.0)));
        assert_eq!(controller.window().range.start, date(2024, 2, 10));
        assert_eq!(controller.window().origin, date(2024, 2, 10));

        // Further edge hits are ignored until the correction fires.
        assert!(!controller.on_scroll(metrics(0.0)));
        assert_eq!(controller.window().range.start, date(2024, 2, 10));

        assert_eq!(
            controller.on_layout(),
            Some(ScrollCorrection { target: 600.0, delta: 600.0 })
        );
        assert_eq!(controller.on_layout(), None);
        assert_eq!(controller.state(), WindowState::Idle);
    }

    #[test]
    fn right_edge_extends_end_and_holds_position() {
        let mut controller = controller();
        let at_end = 92.0 * 30.0 - 600.0;
        assert!(controller.on_scroll(metrics(at_end)));
        assert_eq!(controller.window().range.end, date(2024, 6, 20));
        assert_eq!(controller.window().origin, date(2024, 3, 1));
        assert_eq!(
            controller.on_layout(),
            Some(ScrollCorrection { target: at_end, delta: 0.0 })
        );
    }

    #[test]
    fn disabled_infinite_mode_never_rebases() {
        let options = GanttOptions {
            is_infinite_horizontal: false,
            ..Default::default()
        };
        let mut controller =
            WindowController::new(TimeRange::new(date(2024, 3, 1), date(2024, 3, 31)), &options);
        assert!(!controller.on_scroll(metrics(0.0)));
    }

    #[test]
    fn jump_waits_for_a_stable_viewport() {
        let options = GanttOptions {
            cell_width: 10.0,
            buffer_months: [1, 2],
            lead_in_days: 2,
            ..Default::default()
        };
        let mut controller = WindowController::anchored(date(2024, 3, 15), &options);
        assert_eq!(
            controller.window().range,
            TimeRange::new(date(2024, 2, 15), date(2024, 5, 15))
        );

        // Scroll events during the jump don't rebase.
        assert!(!controller.on_scroll(metrics(0.0)));
        assert_eq!(controller.on_layout(), None);

        controller.on_resize(ViewportSize { width: 0.0, height: 0.0 });
        assert_eq!(controller.on_layout(), None);
        controller.on_resize(ViewportSize { width: 800.0, height: 400.0 });
        assert_eq!(controller.on_layout(), None);
        controller.on_resize(ViewportSize { width: 800.0, height: 400.0 });

        // 29 days from Feb 15 to Mar 15, minus two days of lead-in.
        assert_eq!(
            controller.on_layout(),
            Some(ScrollCorrection { target: 270.0, delta: 270.0 })
        );
        assert!(!controller.has_pending_jump());
        assert!(!controller.anchor_to(date(2024, 3, 15)));

        controller.jump_to(date(2024, 3, 15));
        assert!(controller.has_pending_jump());
    }

    #[test]
    fn zoom_keeps_left_day_in_place() {
        let mut controller = controller();
        controller.on_scroll(metrics(300.0));
        controller.set_cell_width(60.0);
        assert_eq!(
            controller.on_layout(),
            Some(ScrollCorrection { target: 600.0, delta: 300.0 })
        );
        assert_eq!(controller.cell_width(), 60.0);
    }

    #[test]
    fn zoom_during_left_rebase_rescales_the_correction() {
        let mut controller = controller();
        assert!(controller.on_scroll(metrics(0.0)));
        controller.set_cell_width(60.0);

        // Twenty prepended days at the new width, released once.
        assert_eq!(
            controller.on_layout(),
            Some(ScrollCorrection { target: 1200.0, delta: 1200.0 })
        );
        assert_eq!(controller.on_layout(), None);
        // Still March 1st at the left edge, plus two days of lead-in.
        assert_eq!(controller.leading_date(), date(2024, 3, 3));
    }

    #[test]
    fn repeated_zoom_before_layout_compounds() {
        let mut controller = controller();
        controller.on_scroll(metrics(300.0));
        controller.set_cell_width(60.0);
        controller.set_cell_width(15.0);
        assert_eq!(
            controller.on_layout(),
            Some(ScrollCorrection { target: 150.0, delta: -150.0 })
        );
    }

    #[test]
    fn leading_date_tracks_scroll_and_jumps() {
        let options = GanttOptions {
            cell_width: 10.0,
            buffer_months: [1, 1],
            lead_in_days: 2,
            is_infinite_horizontal: false,
            ..Default::default()
        };
        let mut controller = WindowController::anchored(date(2024, 3, 15), &options);
        assert_eq!(controller.leading_date(), date(2024, 3, 15));

        controller.on_resize(ViewportSize { width: 800.0, height: 400.0 });
        controller.on_resize(ViewportSize { width: 800.0, height: 400.0 });
        assert!(controller.on_layout().is_some());
        assert_eq!(controller.leading_date(), date(2024, 3, 15));

        controller.on_scroll(metrics(100.0));
        assert_eq!(controller.leading_date(), date(2024, 2, 27));
        // Past the end of the window it clamps.
        controller.on_scroll(metrics(5000.0));
        assert_eq!(controller.leading_date(), date(2024, 4, 15));
    }
}
