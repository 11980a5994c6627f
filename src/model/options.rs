use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, NaiveDate, Weekday};
use egui::Color32;
use serde::{Deserialize, Serialize};

use super::timeline::AxisMode;
use crate::error::{GanttError, Result};

/// chrono format strings used for header labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderLabels {
    pub year: String,
    pub month: String,
    pub day: String,
    pub week_prefix: String,
}

impl Default for HeaderLabels {
    fn default() -> Self {
        Self {
            year: "%Y".to_string(),
            month: "%b".to_string(),
            day: "%d".to_string(),
            week_prefix: "W".to_string(),
        }
    }
}

/// How rows grouped by one column render their group header bar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupOption {
    pub column_id: String,
    /// Component id reported as the node type.
    #[serde(default = "default_group_component")]
    pub component: String,
    /// Pin the bar horizontally and disable dragging.
    #[serde(default)]
    pub is_fixed_x: bool,
}

fn default_group_component() -> String {
    "groupbar".to_string()
}

/// Grouping configuration handed to the projector when group view is on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupingOptions {
    pub options: Vec<GroupOption>,
}

impl GroupingOptions {
    pub fn find(&self, column_id: &str) -> Option<&GroupOption> {
        self.options.iter().find(|o| o.column_id == column_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestonePosition {
    #[default]
    Top,
    Bottom,
}

/// A dated vertical marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub date: NaiveDate,
    pub title: String,
    #[serde(with = "color_serde", default = "default_milestone_color")]
    pub color: Color32,
    #[serde(default)]
    pub position: MilestonePosition,
}

fn default_milestone_color() -> Color32 {
    Color32::from_rgb(255, 165, 0) // Orange
}

/// Every recognized widget option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GanttOptions {
    pub mode: AxisMode,
    /// Pixel width of one day column.
    pub cell_width: f32,
    pub row_height: f32,
    pub group_gap: f32,
    /// Vertical inset between the row edge and its bar.
    pub bar_margin: f32,
    /// Days added per infinite-scroll rebase.
    pub buffer_day: i64,
    /// Months materialized `[before, after]` an anchor date.
    pub buffer_months: [u32; 2],
    /// Minimum bar span in days when only one endpoint is known.
    pub min_bar_range: i64,
    pub is_week_start_monday: bool,
    pub is_infinite_horizontal: bool,
    pub is_group_view: bool,
    pub group_options: Vec<GroupOption>,
    pub holidays: Vec<NaiveDate>,
    pub weekends_are_holidays: bool,
    pub milestones: Vec<Milestone>,
    /// Days left visible before the anchor date after a jump.
    pub lead_in_days: i64,
    pub throttle_ms: u64,
    pub labels: HeaderLabels,
}

impl Default for GanttOptions {
    fn default() -> Self {
        Self {
            mode: AxisMode::DayInMonth,
            cell_width: 40.0,
            row_height: 36.0,
            group_gap: 4.0,
            bar_margin: 4.0,
            buffer_day: 20,
            buffer_months: [1, 2],
            min_bar_range: 1,
            is_week_start_monday: true,
            is_infinite_horizontal: true,
            is_group_view: false,
            group_options: Vec::new(),
            holidays: Vec::new(),
            weekends_are_holidays: true,
            milestones: Vec::new(),
            lead_in_days: 2,
            throttle_ms: 300,
            labels: HeaderLabels::default(),
        }
    }
}

impl GanttOptions {
    /// Parse and validate options from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: GanttOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.cell_width > 0.0) {
            return Err(GanttError::InvalidOptions(format!(
                "cell_width must be positive, got {}",
                self.cell_width
            )));
        }
        if self.bar_margin < 0.0 || self.row_height <= self.bar_margin * 2.0 {
            return Err(GanttError::InvalidOptions(format!(
                "row_height {} leaves no room for bar_margin {}",
                self.row_height, self.bar_margin
            )));
        }
        if self.buffer_day < 1 {
            return Err(GanttError::InvalidOptions(format!(
                "buffer_day must be at least 1, got {}",
                self.buffer_day
            )));
        }
        if self.min_bar_range < 0 {
            return Err(GanttError::InvalidOptions(
                "min_bar_range cannot be negative".to_string(),
            ));
        }
        for format in [&self.labels.year, &self.labels.month, &self.labels.day] {
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(GanttError::InvalidOptions(format!(
                    "invalid label format `{format}`"
                )));
            }
        }
        Ok(())
    }

    pub fn grouping(&self) -> Option<GroupingOptions> {
        self.is_group_view.then(|| GroupingOptions {
            options: self.group_options.clone(),
        })
    }

    pub fn holiday_calendar(&self) -> HolidayCalendar {
        HolidayCalendar {
            dates: self.holidays.clone(),
            weekends: self.weekends_are_holidays,
        }
    }
}

/// Non-working days shaded behind the bars.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct HolidayCalendar {
    pub dates: Vec<NaiveDate>,
    pub weekends: bool,
}

impl HolidayCalendar {
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        (self.weekends && matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
            || self.dates.contains(&date)
    }
}

/// Serde helper for `Color32`.
mod color_serde {
    use egui::Color32;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(color: &Color32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [color.r(), color.g(), color.b(), color.a()].serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Color32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [r, g, b, a]: [u8; 4] = Deserialize::deserialize(deserializer)?;
        Ok(Color32::from_rgba_unmultiplied(r, g, b, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_partial_json_with_defaults() {
        let options = GanttOptions::from_json(
            r#"{
                "mode": "week",
                "cell_width": 24,
                "is_group_view": true,
                "group_options": [{ "column_id": "story", "is_fixed_x": true }],
                "milestones": [{ "date": "2024-06-01", "title": "Beta", "color": [255, 0, 0, 255] }]
            }"#,
        )
        .unwrap();

        assert_eq!(options.mode, AxisMode::Week);
        assert_eq!(options.cell_width, 24.0);
        assert_eq!(options.buffer_day, 20);
        assert_eq!(options.milestones[0].color, Color32::from_rgb(255, 0, 0));
        assert_eq!(options.milestones[0].position, MilestonePosition::Top);

        let grouping = options.grouping().unwrap();
        let story = grouping.find("story").unwrap();
        assert_eq!(story.component, "groupbar");
        assert!(story.is_fixed_x);
    }

    #[test]
    fn rejects_non_positive_cell_width() {
        let err = GanttOptions::from_json(r#"{ "cell_width": 0 }"#).unwrap_err();
        assert!(matches!(err, GanttError::InvalidOptions(_)));

        let err = GanttOptions::from_json("{ not json").unwrap_err();
        assert!(matches!(err, GanttError::Parse(_)));
    }

    #[test]
    fn grouping_is_absent_unless_group_view() {
        let options = GanttOptions {
            group_options: vec![GroupOption {
                column_id: "story".into(),
                component: "storybar".into(),
                is_fixed_x: false,
            }],
            ..Default::default()
        };
        assert!(options.grouping().is_none());
    }

    #[test]
    fn holidays_include_weekends_and_listed_days() {
        let options = GanttOptions {
            holidays: vec![NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()],
            ..Default::default()
        };
        let calendar = options.holiday_calendar();
        assert!(calendar.is_holiday(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()));
        assert!(calendar.is_holiday(NaiveDate::from_ymd_opt(2024, 12, 28).unwrap()));
        assert!(!calendar.is_holiday(NaiveDate::from_ymd_opt(2024, 12, 27).unwrap()));
    }
}
