//! Page delimiter stage.

use super::{map_records, PipelineStage, RecordIter};
use crate::config::PageMarker;

/// Append a delimiter line carrying the page id. Touches nothing else.
#[derive(Debug, Clone)]
pub struct PageNumberAnnotator {
    marker: PageMarker,
}

impl PageNumberAnnotator {
    pub fn new(marker: PageMarker) -> Self {
        Self { marker }
    }
}

impl PipelineStage for PageNumberAnnotator {
    fn name(&self) -> &'static str {
        "page-numbers"
    }

    fn process<'a>(&self, upstream: RecordIter<'a>) -> RecordIter<'a> {
        let marker = self.marker.clone();
        map_records(upstream, move |record| {
            record.output.push_str(&marker.render(record.page_id()));
            Ok(())
        })
    }
}
