pub mod gantt_chart;
pub mod palette;
pub mod task_table;
pub mod toolbar;
