use std::collections::HashSet;

use chrono::{Duration, NaiveDate};

use super::day_offset::{day_diff, day_offset, days_to_pixels};
use super::group::group_range;
use super::virtual_rows::RowLayout;
use crate::error::{GanttError, Result};
use crate::model::{Edge, GanttRecord, GroupMeta, GroupingOptions, Node, NodeType, Row, RowId};

/// Horizontal placement of a bar.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Span {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    x: f32,
    width: f32,
}

fn span(
    id: &RowId,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    origin: NaiveDate,
    cell_width: f32,
    min_bar_range_days: i64,
    empty_anchor: Option<NaiveDate>,
) -> Span {
    let end = match (start, end) {
        (Some(s), Some(e)) if e < s => {
            log::warn!("bar {id} ends {e} before it starts {s}; clamping end to start");
            Some(s)
        }
        _ => end,
    };

    let assumed_start = start.or_else(|| end.map(|e| e - Duration::days(min_bar_range_days)));
    let width_days = day_diff(end, assumed_start, min_bar_range_days) + 1;

    let anchor = start.or_else(|| end.map(|e| e - Duration::days(1)));
    let x_days = match (anchor, empty_anchor) {
        (None, Some(placeholder)) => day_offset(placeholder, origin),
        _ => day_diff(anchor, Some(origin), 0),
    };

    Span {
        start,
        end,
        x: days_to_pixels(x_days, cell_width),
        width: days_to_pixels(width_days, cell_width),
    }
}

/// Position a node for every visible row.
///
/// Leaf rows take their span from the record accessors. Group rows are only
/// drawn when grouping is enabled and their column has a [`GroupOption`];
/// their span covers all of their leaves.
///
/// Rows without any dates are placed on `empty_anchor`, or on the origin
/// when the host gives none.
///
/// [`GroupOption`]: crate::model::GroupOption
pub fn project<T: GanttRecord>(
    rows: &[Row<'_, T>],
    layouts: &[RowLayout],
    origin: NaiveDate,
    cell_width: f32,
    min_bar_range_days: i64,
    grouping: Option<&GroupingOptions>,
    empty_anchor: Option<NaiveDate>,
) -> Vec<Node> {
    layouts
        .iter()
        .filter_map(|layout| {
            let row = rows.get(layout.index)?;
            match row {
                Row::Leaf { record, .. } => {
                    let id = record.record_id();
                    let span = span(
                        &id,
                        record.bar_start(),
                        record.bar_end(),
                        origin,
                        cell_width,
                        min_bar_range_days,
                        empty_anchor,
                    );
                    let empty_range = span.start.is_none() && span.end.is_none();
                    Some(Node {
                        id,
                        row_index: layout.index,
                        node_type: NodeType::Bar,
                        x: span.x,
                        y: layout.y_offset,
                        width: span.width,
                        height: layout.height,
                        start: span.start,
                        end: span.end,
                        fixed_x: None,
                        draggable: !empty_range,
                        empty_range,
                        group: None,
                    })
                }
                Row::Group {
                    id,
                    column_id,
                    value,
                    leaves,
                } => {
                    let option = grouping?.find(column_id)?;
                    let range = group_range(leaves, T::bar_start, T::bar_end);
                    let span = span(
                        id,
                        range.start,
                        range.end,
                        origin,
                        cell_width,
                        min_bar_range_days,
                        empty_anchor,
                    );
                    let empty_range = span.start.is_none() && span.end.is_none();
                    Some(Node {
                        id: id.clone(),
                        row_index: layout.index,
                        node_type: NodeType::Group(option.component.clone()),
                        x: span.x,
                        y: layout.y_offset,
                        width: span.width,
                        height: layout.height,
                        start: span.start,
                        end: span.end,
                        fixed_x: option.is_fixed_x.then_some(span.x),
                        draggable: !option.is_fixed_x && !empty_range,
                        empty_range,
                        group: Some(GroupMeta {
                            column_id: column_id.clone(),
                            value: value.clone(),
                            leaf_count: leaves.len(),
                        }),
                    })
                }
            }
        })
        .collect()
}

/// Dependency edges between nodes realized in this pass.
///
/// Links to rows outside the visible window are left out; they come back
/// once the other row scrolls into view.
pub fn project_edges<T: GanttRecord>(
    rows: &[Row<'_, T>],
    layouts: &[RowLayout],
    nodes: &[Node],
) -> Vec<Edge> {
    let realized: HashSet<&RowId> = nodes.iter().map(|n| &n.id).collect();
    let mut seen = HashSet::new();
    let mut edges = Vec::new();

    for layout in layouts {
        let Some(Row::Leaf { record, .. }) = rows.get(layout.index) else {
            continue;
        };
        let target = record.record_id();
        if !realized.contains(&target) {
            continue;
        }
        for source in record.from_link_ids() {
            if !realized.contains(&source) {
                continue;
            }
            let edge = Edge::new(source, target.clone());
            if seen.insert(edge.clone()) {
                edges.push(edge);
            }
        }
    }
    edges
}

pub fn find_node<'a>(nodes: &'a [Node], id: &RowId) -> Result<&'a Node> {
    nodes
        .iter()
        .find(|n| &n.id == id)
        .ok_or_else(|| GanttError::RowNotFound(id.clone()))
}
