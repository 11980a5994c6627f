use chrono::{Datelike, Duration, NaiveDate};

use crate::model::{AxisMode, HeaderLabels, SubUnit, TimeRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLevel {
    Year,
    Month,
    Week,
    Day,
}

/// One node of the header tree. Only day leaves carry a size; parents are
/// as wide as the sum of their leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderColumn {
    pub id: String,
    pub label: String,
    pub level: ColumnLevel,
    /// First in-range day this column covers.
    pub date: NaiveDate,
    pub size: Option<f32>,
    pub children: Vec<HeaderColumn>,
}

impl HeaderColumn {
    pub fn width(&self) -> f32 {
        match self.size {
            Some(size) => size,
            None => self.children.iter().map(HeaderColumn::width).sum(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.level == ColumnLevel::Day
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a HeaderColumn>) {
        if self.is_leaf() {
            out.push(self);
        }
        for child in &self.children {
            child.collect_leaves(out);
        }
    }
}

/// Build the year → month|week → day header for `[start, end]`.
///
/// Unknown modes produce no columns; hosts that need them supply their own
/// builder.
pub fn build_header(
    mode: AxisMode,
    start: NaiveDate,
    end: NaiveDate,
    labels: &HeaderLabels,
    cell_width: f32,
    week_starts_monday: bool,
) -> Vec<HeaderColumn> {
    let Some(unit) = mode.sub_unit() else {
        return Vec::new();
    };
    let range = TimeRange::new(start, end);

    let mut years: Vec<HeaderColumn> = Vec::new();
    let mut current_unit: Option<NaiveDate> = None;

    for day in range.iter_days() {
        let unit_start = match unit {
            SubUnit::Month => day - Duration::days(i64::from(day.day0())),
            SubUnit::Week => week_start(day, week_starts_monday),
        };

        if current_unit != Some(unit_start) {
            current_unit = Some(unit_start);

            // A week straddling New Year stays with the year it was opened in.
            if years.last().map_or(true, |y| y.date.year() != day.year()) {
                years.push(parent_column(
                    format!("{:04}", day.year()),
                    day.format(&labels.year).to_string(),
                    ColumnLevel::Year,
                    day,
                ));
            }

            let column = match unit {
                SubUnit::Month => parent_column(
                    day.format("%Y-%m").to_string(),
                    day.format(&labels.month).to_string(),
                    ColumnLevel::Month,
                    day,
                ),
                SubUnit::Week => {
                    let (week_year, week) = week_number(unit_start, week_starts_monday);
                    parent_column(
                        format!("{week_year:04}-W{week:02}"),
                        format!("{}{}", labels.week_prefix, week),
                        ColumnLevel::Week,
                        day,
                    )
                }
            };
            if let Some(year) = years.last_mut() {
                year.children.push(column);
            }
        }

        let Some(sub) = years.last_mut().and_then(|y| y.children.last_mut()) else {
            continue;
        };
        sub.children.push(HeaderColumn {
            id: day.format("%Y-%m-%d").to_string(),
            label: day.format(&labels.day).to_string(),
            level: ColumnLevel::Day,
            date: day,
            size: Some(cell_width),
            children: Vec::new(),
        });
    }

    years
}

fn parent_column(id: String, label: String, level: ColumnLevel, date: NaiveDate) -> HeaderColumn {
    HeaderColumn {
        id,
        label,
        level,
        date,
        size: None,
        children: Vec::new(),
    }
}

/// First day of the week containing `day`.
pub fn week_start(day: NaiveDate, monday: bool) -> NaiveDate {
    let offset = if monday {
        day.weekday().num_days_from_monday()
    } else {
        day.weekday().num_days_from_sunday()
    };
    day - Duration::days(i64::from(offset))
}

/// `(week_year, week)` for the week starting at `week_start`.
///
/// Monday weeks follow ISO 8601 (week 1 holds the first Thursday); Sunday
/// weeks follow the US rule (week 1 holds January 1st).
pub fn week_number(week_start: NaiveDate, monday: bool) -> (i32, u32) {
    if monday {
        let iso = week_start.iso_week();
        (iso.year(), iso.week())
    } else {
        let saturday = week_start + Duration::days(6);
        (saturday.year(), saturday.ordinal0() / 7 + 1)
    }
}

pub fn leaves(columns: &[HeaderColumn]) -> Vec<&HeaderColumn> {
    let mut out = Vec::new();
    for column in columns {
        column.collect_leaves(&mut out);
    }
    out
}

pub fn leaf_count(columns: &[HeaderColumn]) -> usize {
    leaves(columns).len()
}

pub fn leaf_dates(columns: &[HeaderColumn]) -> Vec<NaiveDate> {
    leaves(columns).into_iter().map(|c| c.date).collect()
}
