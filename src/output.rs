//! Output types produced by an extraction run.

use crate::error::PageAnomaly;
use crate::geometry::{BoundingBox, RelativeCoords};
use crate::page::PageRecord;
use serde::{Deserialize, Serialize};

/// The finished text of one page plus the geometry the stages derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageFragment {
    pub page_id: usize,
    /// Accumulated stage output for the page.
    pub text: String,
    pub min_bottom: Option<f64>,
    pub max_bottom: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<PageAnomaly>,
}

impl From<PageRecord> for PageFragment {
    fn from(record: PageRecord) -> Self {
        Self {
            page_id: record.page.page_id,
            min_bottom: record.min_bottom(),
            max_bottom: record.max_bottom(),
            text: record.output,
            anomalies: record.anomalies,
        }
    }
}

/// Result of a complete extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Page fragments concatenated in emission order.
    pub text: String,
    pub pages: Vec<PageFragment>,
    pub stats: ExtractionStats,
}

impl ExtractionOutput {
    /// All anomalies of the run, in page order.
    pub fn anomalies(&self) -> impl Iterator<Item = &PageAnomaly> {
        self.pages.iter().flat_map(|p| p.anomalies.iter())
    }
}

/// Counters for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages pulled from the source. Lower than the document length when
    /// `to_page` stopped reading early.
    pub pages_read: usize,
    /// Pages that made it through every filter.
    pub pages_emitted: usize,
    pub ordering_anomalies: usize,
    pub overlap_anomalies: usize,
    pub duration_ms: u64,
}

/// Geometry report for one page, without running the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayoutSummary {
    pub page_id: usize,
    pub bounding_box: BoundingBox,
    pub block_count: usize,
    pub min_bottom: Option<f64>,
    pub max_bottom: Option<f64>,
    pub min_relative_bottom: Option<f64>,
    pub max_relative_bottom: Option<f64>,
    /// Blocks the fixed 0.87 / 0.095 thresholds classify as header or footer.
    pub margin_candidates: Vec<MarginCandidate>,
}

/// A block that sits in the top or bottom margin of its page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginCandidate {
    pub text: String,
    pub bounding_box: BoundingBox,
    pub relative: RelativeCoords,
}
