use chrono::{Duration, NaiveDate};
use egui::Color32;

use super::day_offset::{day_offset, days_to_pixels};
use crate::model::{Milestone, MilestonePosition, TimeRange, TimelineWindow};

/// A run of consecutive non-working days, shaded behind the bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HolidaySpan {
    pub start: NaiveDate,
    pub days: i64,
    pub x: f32,
    pub width: f32,
}

/// A milestone resolved to a pixel column.
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneMarker {
    pub date: NaiveDate,
    /// Center of the milestone's day column.
    pub x: f32,
    pub title: String,
    pub color: Color32,
    pub position: MilestonePosition,
}

pub fn holiday_spans(
    range: TimeRange,
    origin: NaiveDate,
    cell_width: f32,
    is_holiday: impl Fn(NaiveDate) -> bool,
) -> Vec<HolidaySpan> {
    let mut spans: Vec<HolidaySpan> = Vec::new();
    for day in range.iter_days().filter(|d| is_holiday(*d)) {
        match spans.last_mut() {
            Some(span) if span.start + Duration::days(span.days) == day => {
                span.days += 1;
                span.width += cell_width;
            }
            _ => spans.push(HolidaySpan {
                start: day,
                days: 1,
                x: days_to_pixels(day_offset(day, origin), cell_width),
                width: cell_width,
            }),
        }
    }
    spans
}

pub fn milestone_markers(
    milestones: &[Milestone],
    window: TimelineWindow,
    cell_width: f32,
) -> Vec<MilestoneMarker> {
    milestones
        .iter()
        .filter(|m| window.range.contains(m.date))
        .map(|m| MilestoneMarker {
            date: m.date,
            x: days_to_pixels(day_offset(m.date, window.origin), cell_width) + cell_width / 2.0,
            title: m.title.clone(),
            color: m.color,
            position: m.position,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GanttOptions;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekends_merge_into_spans() {
        let options = GanttOptions {
            holidays: vec![date(2024, 6, 10)],
            ..Default::default()
        };
        let range = TimeRange::new(date(2024, 6, 3), date(2024, 6, 16));
        let calendar = options.holiday_calendar();
        let spans = holiday_spans(range, range.start, 10.0, |d| calendar.is_holiday(d));

        let summary: Vec<_> = spans.iter().map(|s| (s.start, s.days, s.x, s.width)).collect();
        assert_eq!(
            summary,
            vec![
                (date(2024, 6, 8), 3, 50.0, 30.0),
                (date(2024, 6, 15), 2, 120.0, 20.0),
            ]
        );
    }

    #[test]
    fn milestones_outside_the_window_are_hidden() {
        let milestone = |d| Milestone {
            date: d,
            title: "Beta".into(),
            color: Color32::RED,
            position: MilestonePosition::Bottom,
        };
        let window = TimelineWindow::new(TimeRange::new(date(2024, 6, 1), date(2024, 6, 30)));
        let markers = milestone_markers(
            &[milestone(date(2024, 6, 5)), milestone(date(2024, 7, 5))],
            window,
            20.0,
        );
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].x, 90.0);
        assert_eq!(markers[0].position, MilestonePosition::Bottom);
    }
}
