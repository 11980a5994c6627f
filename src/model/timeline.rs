use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Controls the granularity of the date axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AxisMode {
    #[default]
    DayInMonth,
    DayInWeek,
    Week,
    Month,
    Quarter,
    /// Anything the built-in header builder does not know. Renders no columns.
    #[serde(other)]
    Custom,
}

/// The sub-unit grouping days under a year in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubUnit {
    Month,
    Week,
}

impl AxisMode {
    pub const ALL: [AxisMode; 5] = [
        AxisMode::DayInMonth,
        AxisMode::DayInWeek,
        AxisMode::Week,
        AxisMode::Month,
        AxisMode::Quarter,
    ];

    pub fn sub_unit(self) -> Option<SubUnit> {
        match self {
            AxisMode::DayInMonth | AxisMode::Month | AxisMode::Quarter => Some(SubUnit::Month),
            AxisMode::DayInWeek | AxisMode::Week => Some(SubUnit::Week),
            AxisMode::Custom => None,
        }
    }

    /// Cell width a host may fall back to when switching modes.
    pub fn default_cell_width(self) -> f32 {
        match self {
            AxisMode::DayInMonth | AxisMode::DayInWeek => 40.0,
            AxisMode::Week => 20.0,
            AxisMode::Month => 8.0,
            AxisMode::Quarter => 3.0,
            AxisMode::Custom => 40.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AxisMode::DayInMonth => "Day / Month",
            AxisMode::DayInWeek => "Day / Week",
            AxisMode::Week => "Week",
            AxisMode::Month => "Month",
            AxisMode::Quarter => "Quarter",
            AxisMode::Custom => "Custom",
        }
    }
}

/// The materialized window of calendar days. Always `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    /// Number of calendar days covered, inclusive of both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn extend_start(&mut self, days: i64) {
        self.start -= Duration::days(days);
    }

    pub fn extend_end(&mut self, days: i64) {
        self.end += Duration::days(days);
    }

    /// Iterate every day in the range.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// Immutable snapshot of the range together with the pixel origin.
///
/// The origin is the date at pixel offset zero. It only moves when the
/// whole window rebases to the left or is re-anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimelineWindow {
    pub range: TimeRange,
    pub origin: NaiveDate,
}

impl TimelineWindow {
    pub fn new(range: TimeRange) -> Self {
        Self {
            range,
            origin: range.start,
        }
    }
}
