pub mod node;
pub mod options;
pub mod row;
pub mod timeline;

pub use node::{Edge, GroupMeta, Node, NodeType};
pub use options::{
    GanttOptions, GroupOption, GroupingOptions, HeaderLabels, HolidayCalendar, Milestone,
    MilestonePosition,
};
pub use row::{GanttRecord, Row, RowId};
pub use timeline::{AxisMode, SubUnit, TimeRange, TimelineWindow};
