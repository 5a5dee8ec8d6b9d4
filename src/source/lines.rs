//! Grouping of single-line text runs into text blocks.
//!
//! PDF text layers report text as runs on one line. Consecutive runs are
//! joined the way pdfminer's line-margin rule does it: a run continues the
//! current line when it sits beside it on the same row, and starts a new line
//! of the same block when it sits directly below, horizontally overlapping
//! the block, separated by at most half a line height.

use crate::geometry::BoundingBox;
use crate::page::TextBlock;

/// Largest vertical gap, as a fraction of the previous line's height, that
/// still joins two lines into one block.
pub const LINE_MARGIN: f64 = 0.5;

/// A run of text on a single line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub bounding_box: BoundingBox,
    pub text: String,
}

impl TextLine {
    pub fn new(bounding_box: impl Into<BoundingBox>, text: impl Into<String>) -> Self {
        Self {
            bounding_box: bounding_box.into(),
            text: text.into(),
        }
    }
}

struct OpenBlock {
    bbox: BoundingBox,
    text: String,
    last: BoundingBox,
}

impl OpenBlock {
    fn same_row(&self, line: &BoundingBox) -> bool {
        let last = &self.last;
        let shared = last.top.min(line.top) - last.bottom.max(line.bottom);
        let height = last.height().min(line.height());
        let gap = line.left - last.right;
        height > 0.0 && shared >= height * 0.5 && gap >= -height * 0.5 && gap <= last.height()
    }

    fn next_row(&self, line: &BoundingBox) -> bool {
        let h = self.last.height();
        let gap = self.last.bottom - line.top;
        let overlaps_x = line.left < self.bbox.right && self.bbox.left < line.right;
        overlaps_x && gap >= -h * LINE_MARGIN && gap <= h * LINE_MARGIN
    }

    fn into_block(self) -> TextBlock {
        TextBlock::new(self.bbox, self.text)
    }
}

/// Group runs, given in content order, into blocks. Blank runs are dropped.
pub fn group_lines(lines: impl IntoIterator<Item = TextLine>) -> Vec<TextBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<OpenBlock> = None;

    for line in lines {
        let text = line.text.trim();
        if text.is_empty() {
            continue;
        }
        let lb = line.bounding_box;

        match open.as_mut() {
            Some(block) if block.same_row(&lb) => {
                if !block.text.ends_with(' ') {
                    block.text.push(' ');
                }
                block.text.push_str(text);
                block.last = block.last.union(&lb);
                block.bbox = block.bbox.union(&lb);
            }
            Some(block) if block.next_row(&lb) => {
                block.text.push('\n');
                block.text.push_str(text);
                block.last = lb;
                block.bbox = block.bbox.union(&lb);
            }
            _ => {
                if let Some(done) = open.take() {
                    blocks.push(done.into_block());
                }
                open = Some(OpenBlock {
                    bbox: lb,
                    text: text.to_string(),
                    last: lb,
                });
            }
        }
    }

    if let Some(done) = open {
        blocks.push(done.into_block());
    }
    blocks
}
