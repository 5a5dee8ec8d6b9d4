//! Page data flowing through the pipeline.
//!
//! [`Page`] and [`TextBlock`] are the decoded input handed over by a page
//! source and are never modified. [`PageRecord`] wraps one page together
//! with everything the pipeline stages derive from it.

use crate::error::PageAnomaly;
use crate::geometry::BoundingBox;
use serde::{Deserialize, Serialize};

/// A rectangular region of horizontal text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub text: String,
}

impl TextBlock {
    pub fn new(bounding_box: impl Into<BoundingBox>, text: impl Into<String>) -> Self {
        Self {
            bounding_box: bounding_box.into(),
            text: text.into(),
        }
    }

    pub fn bottom(&self) -> f64 {
        self.bounding_box.bottom
    }

    pub fn top(&self) -> f64 {
        self.bounding_box.top
    }
}

/// One decoded page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based, strictly increasing across the pages a source emits.
    pub page_id: usize,
    pub bounding_box: BoundingBox,
    pub text_blocks: Vec<TextBlock>,
}

impl Page {
    pub fn new(page_id: usize, bounding_box: impl Into<BoundingBox>, text_blocks: Vec<TextBlock>) -> Self {
        Self {
            page_id,
            bounding_box: bounding_box.into(),
            text_blocks,
        }
    }
}

/// Lowest and highest block bottom on a page. `min_bottom <= max_bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BottomExtent {
    pub min_bottom: f64,
    pub max_bottom: f64,
}

impl BottomExtent {
    /// Extremes of the blocks' bottom coordinates; `None` without blocks.
    pub fn of<'a>(blocks: impl IntoIterator<Item = &'a TextBlock>) -> Option<Self> {
        blocks.into_iter().fold(None, |acc, block| {
            let b = block.bottom();
            Some(match acc {
                None => BottomExtent {
                    min_bottom: b,
                    max_bottom: b,
                },
                Some(e) => BottomExtent {
                    min_bottom: e.min_bottom.min(b),
                    max_bottom: e.max_bottom.max(b),
                },
            })
        })
    }

    /// Strictly between the extremes: the block's bottom lies above the
    /// lowest bottom and its top below the highest bottom. The blocks that
    /// define the extremes are therefore never inside.
    pub fn contains(&self, block: &TextBlock) -> bool {
        self.min_bottom < block.bottom() && block.top() < self.max_bottom
    }
}

/// Per-page pipeline state.
///
/// Created once per page, mutated by each stage in turn and finished when the
/// driver appends `output` to the transcript. Fields set by a stage stay
/// `None` until that stage has run.
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub page: Page,
    /// Append-only text fragment accumulated by the stages.
    pub output: String,
    /// Indices into `page.text_blocks` in column reading order: the left
    /// column run followed by the right column run.
    pub ordered_texts: Option<Vec<usize>>,
    pub bottoms: Option<BottomExtent>,
    pub anomalies: Vec<PageAnomaly>,
}

impl PageRecord {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            output: String::new(),
            ordered_texts: None,
            bottoms: None,
            anomalies: Vec::new(),
        }
    }

    pub fn page_id(&self) -> usize {
        self.page.page_id
    }

    pub fn min_bottom(&self) -> Option<f64> {
        self.bottoms.map(|b| b.min_bottom)
    }

    pub fn max_bottom(&self) -> Option<f64> {
        self.bottoms.map(|b| b.max_bottom)
    }

    /// Blocks in reading order when the column resolver has run, otherwise
    /// in the order the source delivered them.
    pub fn blocks_in_order(&self) -> Vec<&TextBlock> {
        match &self.ordered_texts {
            Some(order) => order
                .iter()
                .filter_map(|&i| self.page.text_blocks.get(i))
                .collect(),
            None => self.page.text_blocks.iter().collect(),
        }
    }
}
