//! Layout core of a virtualized Gantt timeline.
//!
//! The crate turns a date range and a window of visible rows into positioned
//! bars, dependency edges and a hierarchical date header, and keeps the date
//! window growing as the user scrolls toward either edge. Everything here is
//! headless: hosts plug in their scroll container through
//! [`engine::viewport::ViewportSensor`] and paint the [`engine::LayoutOutput`].

pub mod engine;
pub mod error;
pub mod model;

pub use error::{GanttError, Result};
