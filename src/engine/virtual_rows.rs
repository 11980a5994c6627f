//! Vertical layout for the window of rows the virtualizer has realized.
//!
//! [`layout_visible_rows`] is the adapter between any virtualization
//! primitive and the projector. [`RowVirtualizer`] is a small prefix-sum
//! virtualizer hosts can use when they have none of their own.

use crate::model::Row;

/// A realized row as reported by the virtualizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualItem {
    pub index: usize,
    /// Pixel offset of the row's top edge within the scroll content.
    pub start: f32,
    pub size: f32,
}

/// Vertical placement of the bar inside one visible row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowLayout {
    pub index: usize,
    pub y_offset: f32,
    pub height: f32,
    pub is_group: bool,
}

/// Inset every visible row by `bar_margin` and push group rows down by `group_gap`.
///
/// The estimate driving `items` is trusted as-is. If rendered rows end up a
/// different height, the virtualizer has to remeasure; nothing here corrects it.
pub fn layout_visible_rows<T>(
    rows: &[Row<'_, T>],
    items: &[VirtualItem],
    bar_margin: f32,
    group_gap: f32,
) -> Vec<RowLayout> {
    items
        .iter()
        .filter_map(|item| {
            let row = rows.get(item.index)?;
            let is_group = row.is_group();
            let gap = if is_group { group_gap } else { 0.0 };
            Some(RowLayout {
                index: item.index,
                y_offset: item.start + bar_margin + gap,
                height: (item.size - bar_margin * 2.0 - gap).max(0.0),
                is_group,
            })
        })
        .collect()
}

/// Prefix-sum virtualizer over estimated row sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct RowVirtualizer {
    sizes: Vec<f32>,
    /// `offsets[i]` is the top of row `i`; the last entry is the total size.
    offsets: Vec<f32>,
    pub overscan: usize,
}

impl RowVirtualizer {
    pub fn new(count: usize, estimate: impl Fn(usize) -> f32, overscan: usize) -> Self {
        let sizes = (0..count).map(estimate).collect();
        let mut virtualizer = Self {
            sizes,
            offsets: Vec::new(),
            overscan,
        };
        virtualizer.rebuild_offsets();
        virtualizer
    }

    fn rebuild_offsets(&mut self) {
        self.offsets.clear();
        self.offsets.reserve(self.sizes.len() + 1);
        let mut acc = 0.0;
        self.offsets.push(acc);
        for size in &self.sizes {
            acc += size;
            self.offsets.push(acc);
        }
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn total_size(&self) -> f32 {
        self.offsets.last().copied().unwrap_or(0.0)
    }

    pub fn item(&self, index: usize) -> Option<VirtualItem> {
        Some(VirtualItem {
            index,
            start: *self.offsets.get(index)?,
            size: *self.sizes.get(index)?,
        })
    }

    /// Replace the estimate for one row with its measured size.
    pub fn measure(&mut self, index: usize, size: f32) {
        if let Some(slot) = self.sizes.get_mut(index) {
            if *slot != size {
                *slot = size;
                self.rebuild_offsets();
            }
        }
    }

    /// Rows intersecting `[scroll_offset, scroll_offset + viewport_height)`, plus overscan.
    pub fn visible_items(&self, scroll_offset: f32, viewport_height: f32) -> Vec<VirtualItem> {
        if self.sizes.is_empty() || viewport_height <= 0.0 {
            return Vec::new();
        }
        let top = scroll_offset.max(0.0);
        let bottom = top + viewport_height;

        // First row whose bottom edge lies below `top`.
        let first = self.offsets[1..].partition_point(|&end| end <= top);
        // One past the last row whose top edge lies above `bottom`.
        let last = self.offsets[..self.sizes.len()].partition_point(|&start| start < bottom);
        if first >= last {
            return Vec::new();
        }

        let first = first.saturating_sub(self.overscan);
        let last = (last + self.overscan).min(self.sizes.len());
        (first..last).filter_map(|index| self.item(index)).collect()
    }
}
