use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a row or of the record behind a leaf row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RowId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<Uuid> for RowId {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

/// Accessors the caller supplies for its own record type.
///
/// These must be pure: the layout pass may call them any number of times.
pub trait GanttRecord {
    /// Stable id of the underlying record. Dependency links refer to it.
    fn record_id(&self) -> RowId;

    fn bar_start(&self) -> Option<NaiveDate>;

    fn bar_end(&self) -> Option<NaiveDate>;

    /// Ids of the records this one depends on (links point *into* this bar).
    fn from_link_ids(&self) -> Vec<RowId> {
        Vec::new()
    }
}

/// A row handle borrowed from the external table engine.
#[derive(Debug)]
pub enum Row<'a, T> {
    Leaf {
        id: RowId,
        record: &'a T,
    },
    Group {
        id: RowId,
        /// Identity of the column this group was formed by.
        column_id: String,
        /// Display value shared by the group's leaves.
        value: String,
        leaves: Vec<&'a T>,
    },
}

// Derive would require `T: Clone`.
impl<T> Clone for Row<'_, T> {
    fn clone(&self) -> Self {
        match self {
            Row::Leaf { id, record } => Row::Leaf {
                id: id.clone(),
                record: *record,
            },
            Row::Group {
                id,
                column_id,
                value,
                leaves,
            } => Row::Group {
                id: id.clone(),
                column_id: column_id.clone(),
                value: value.clone(),
                leaves: leaves.clone(),
            },
        }
    }
}

impl<'a, T> Row<'a, T> {
    pub fn row_id(&self) -> &RowId {
        match self {
            Row::Leaf { id, .. } | Row::Group { id, .. } => id,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Row::Group { .. })
    }

    pub fn grouping_column_id(&self) -> Option<&str> {
        match self {
            Row::Group { column_id, .. } => Some(column_id),
            Row::Leaf { .. } => None,
        }
    }

    pub fn record(&self) -> Option<&'a T> {
        match self {
            Row::Leaf { record, .. } => Some(*record),
            Row::Group { .. } => None,
        }
    }
}

impl<T: GanttRecord> Row<'_, T> {
    /// Id a node for this row is keyed by: the record id for leaves, the row id for groups.
    pub fn node_id(&self) -> RowId {
        match self {
            Row::Leaf { record, .. } => record.record_id(),
            Row::Group { id, .. } => id.clone(),
        }
    }
}
