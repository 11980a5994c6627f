pub mod axis;
pub mod day_offset;
pub mod gesture;
pub mod group;
pub mod markers;
pub mod pipeline;
pub mod projector;
pub mod rate_limit;
pub mod viewport;
pub mod virtual_rows;
pub mod window;

pub use axis::{build_header, ColumnLevel, HeaderColumn};
pub use day_offset::{day_diff, day_offset, offset_to_date};
pub use gesture::{
    BarChange, BarGesture, ConnectResponse, Connection, DragKind, GanttHandler, LinkGesture,
    LinkOutcome,
};
pub use group::{group_range, group_rows, leaf_rows, GroupRange};
pub use markers::{HolidaySpan, MilestoneMarker};
pub use pipeline::{LayoutInputs, LayoutOutput, LayoutPipeline};
pub use projector::{find_node, project, project_edges};
pub use rate_limit::{Debounce, Throttle};
pub use viewport::{drive_window, ViewportSensor};
pub use virtual_rows::{layout_visible_rows, RowLayout, RowVirtualizer, VirtualItem};
pub use window::{ScrollCorrection, ScrollMetrics, ViewportSize, WindowController, WindowState};
