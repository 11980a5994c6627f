use thiserror::Error;

use crate::model::RowId;

/// Errors surfaced by operations that target specific rows or parse configuration.
///
/// Pure layout passes never return these; they clamp or degrade instead.
#[derive(Debug, Error)]
pub enum GanttError {
    #[error("row `{0}` is not realized as a node")]
    RowNotFound(RowId),
    #[error("bar `{0}` cannot be dragged")]
    NotDraggable(RowId),
    #[error("no gesture in progress")]
    NoActiveGesture,
    #[error("unknown pending connection #{0}")]
    UnknownConnection(u64),
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error("failed to parse options: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GanttError>;
