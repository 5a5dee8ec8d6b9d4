//! Column-order resolver.
//!
//! Pages are assumed to hold one or two columns, with the whole left column
//! read before the whole right column. Blocks are split on the page's
//! horizontal midpoint and keep their relative input order inside each
//! column; no interleaving by height is attempted across columns.

use crate::error::{Column, PageAnomaly};
use crate::geometry::BoundingBox;
use crate::page::TextBlock;
use tracing::warn;

/// Result of resolving a page's reading order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnOrder {
    /// Indices of left-column blocks, in input order.
    pub left: Vec<usize>,
    /// Indices of right-column blocks, in input order.
    pub right: Vec<usize>,
    /// Blocks found above their predecessor in the same column.
    pub anomalies: Vec<PageAnomaly>,
}

impl ColumnOrder {
    /// Reading order as indices: the left run, then the right run.
    pub fn indices(&self) -> Vec<usize> {
        self.left.iter().chain(&self.right).copied().collect()
    }

    /// Blocks in reading order.
    pub fn apply<'b>(&self, blocks: &'b [TextBlock]) -> Vec<&'b TextBlock> {
        self.left
            .iter()
            .chain(&self.right)
            .filter_map(|&i| blocks.get(i))
            .collect()
    }
}

/// Split `blocks` into left and right columns around `page.right / 2`.
///
/// A block whose centre is left of the midpoint goes left, anything else
/// right. Within a column, a block whose top is above the top of the last
/// in-order block is reported as [`PageAnomaly::OutOfOrder`] but kept in
/// place; only in-order blocks move the tracked top down.
pub fn order_columns(page_id: usize, blocks: &[TextBlock], page: &BoundingBox) -> ColumnOrder {
    let midpoint = page.right / 2.0;
    let mut order = ColumnOrder::default();
    let mut left_top = page.top;
    let mut right_top = page.top;

    for (idx, block) in blocks.iter().enumerate() {
        let (column, run, previous_top) = if block.bounding_box.center_x() < midpoint {
            (Column::Left, &mut order.left, &mut left_top)
        } else {
            (Column::Right, &mut order.right, &mut right_top)
        };

        let top = block.top();
        if top > *previous_top {
            warn!(
                "Page {}: {} column block #{} (top {}) is above the previous block (top {})",
                page_id, column, idx, top, previous_top
            );
            order.anomalies.push(PageAnomaly::OutOfOrder {
                page: page_id,
                column,
                block: idx,
                top,
                previous_top: *previous_top,
            });
        } else {
            *previous_top = top;
        }
        run.push(idx);
    }

    order
}
