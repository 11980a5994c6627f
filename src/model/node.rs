use chrono::NaiveDate;

use super::row::RowId;

/// Which bar component renders a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    Bar,
    /// Group header bar rendered by the configured component.
    Group(String),
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Bar => "gantbar",
            NodeType::Group(component) => component,
        }
    }
}

/// Metadata carried by group header nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMeta {
    pub column_id: String,
    pub value: String,
    pub leaf_count: usize,
}

/// A positioned bar for one visible row. Rebuilt on every layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: RowId,
    pub row_index: usize,
    pub node_type: NodeType,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Pinned horizontal position; set for fixed group bars.
    pub fixed_x: Option<f32>,
    pub draggable: bool,
    /// Neither date is known; the node only backs click-to-create.
    pub empty_range: bool,
    pub group: Option<GroupMeta>,
}

impl Node {
    pub fn is_group(&self) -> bool {
        self.group.is_some()
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.y + self.height
    }
}

/// A directed finish-to-start link between two realized nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: RowId,
    pub target: RowId,
}

impl Edge {
    pub fn new(source: RowId, target: RowId) -> Self {
        Self { source, target }
    }

    pub fn id(&self) -> String {
        format!("{}->{}", self.source, self.target)
    }
}
