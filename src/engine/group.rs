use chrono::NaiveDate;

use crate::model::{GanttRecord, Row, RowId};

/// Combined span of a group's leaves. Either bound is `None` when no leaf defines it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Earliest start and latest end across `leaves`.
///
/// Recomputed on every pass: group membership follows the external grouping
/// configuration and may change between passes.
pub fn group_range<T>(
    leaves: &[&T],
    start_of: impl Fn(&T) -> Option<NaiveDate>,
    end_of: impl Fn(&T) -> Option<NaiveDate>,
) -> GroupRange {
    leaves.iter().fold(GroupRange::default(), |acc, leaf| GroupRange {
        start: match (acc.start, start_of(*leaf)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        },
        end: match (acc.end, end_of(*leaf)) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        },
    })
}

/// Flat, ungrouped rows: one leaf per record, keyed by the record id.
pub fn leaf_rows<T: GanttRecord>(records: &[T]) -> Vec<Row<'_, T>> {
    records
        .iter()
        .map(|record| Row::Leaf {
            id: record.record_id(),
            record,
        })
        .collect()
}

/// Group `records` by `key`, emitting each group header followed by its leaves.
///
/// Groups appear in the order their first record appears. This stands in for
/// the grouping a table engine would normally provide.
pub fn group_rows<'a, T: GanttRecord>(
    records: &'a [T],
    column_id: &str,
    key: impl Fn(&T) -> String,
) -> Vec<Row<'a, T>> {
    let mut groups: Vec<(String, Vec<&'a T>)> = Vec::new();
    for record in records {
        let value = key(record);
        match groups.iter_mut().find(|(v, _)| *v == value) {
            Some((_, members)) => members.push(record),
            None => groups.push((value, vec![record])),
        }
    }

    let mut rows = Vec::with_capacity(records.len() + groups.len());
    for (value, members) in groups {
        rows.push(Row::Group {
            id: RowId::from(format!("{column_id}:{value}")),
            column_id: column_id.to_string(),
            value,
            leaves: members.clone(),
        });
        rows.extend(members.into_iter().map(|record| Row::Leaf {
            id: record.record_id(),
            record,
        }));
    }
    rows
}
