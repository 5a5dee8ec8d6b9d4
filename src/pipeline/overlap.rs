//! Overlap detection stage. Diagnostic only: records pass through unchanged
//! apart from the anomaly list.

use super::{map_records, PipelineStage, RecordIter};
use crate::error::PageAnomaly;
use crate::geometry::overlap_area;
use tracing::warn;

/// Checks the resolved blocks of each page for shared interior area.
/// Pages the column resolver has not seen are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapDetector;

impl PipelineStage for OverlapDetector {
    fn name(&self) -> &'static str {
        "detect-overlap"
    }

    fn process<'a>(&self, upstream: RecordIter<'a>) -> RecordIter<'a> {
        map_records(upstream, |record| {
            if record.ordered_texts.is_none() {
                return Ok(());
            }
            let shared = overlap_area(record.blocks_in_order().iter().map(|b| &b.bounding_box));
            if shared > 0.0 {
                let anomaly = PageAnomaly::Overlap {
                    page: record.page.page_id,
                    overlap_area: shared,
                };
                warn!("{}", anomaly);
                record.anomalies.push(anomaly);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Page, PageRecord, TextBlock};
    use crate::pipeline::bounds::BoundaryDetector;
    use crate::pipeline::PipelineStage;

    fn page(blocks: Vec<TextBlock>) -> Page {
        Page::new(1, [0.0, 0.0, 100.0, 100.0], blocks)
    }

    fn run(stages: &[&dyn PipelineStage], page: Page) -> PageRecord {
        let upstream: RecordIter<'_> = Box::new(std::iter::once(Ok(PageRecord::new(page))));
        stages
            .iter()
            .fold(upstream, |records, stage| stage.process(records))
            .next()
            .unwrap()
            .unwrap()
    }

    #[test]
    fn overlapping_blocks_are_recorded() {
        let record = run(
            &[&BoundaryDetector, &OverlapDetector],
            // Listed top-down so the column order itself is clean.
            page(vec![
                TextBlock::new([5.0, 5.0, 15.0, 15.0], "b"),
                TextBlock::new([0.0, 0.0, 10.0, 10.0], "a"),
            ]),
        );
        assert_eq!(record.anomalies.len(), 1);
        match record.anomalies[0] {
            PageAnomaly::Overlap { overlap_area, .. } => assert!((overlap_area - 25.0).abs() < 1e-6),
            ref other => panic!("unexpected anomaly {other:?}"),
        }
    }

    #[test]
    fn overlap_is_reported_alongside_ordering_anomaly() {
        let record = run(
            &[&BoundaryDetector, &OverlapDetector],
            page(vec![
                TextBlock::new([0.0, 0.0, 10.0, 10.0], "a"),
                TextBlock::new([5.0, 5.0, 15.0, 15.0], "b"),
            ]),
        );
        let overlaps: Vec<f64> = record
            .anomalies
            .iter()
            .filter_map(|a| match a {
                PageAnomaly::Overlap { overlap_area, .. } => Some(*overlap_area),
                _ => None,
            })
            .collect();
        assert_eq!(overlaps.len(), 1);
        assert!((overlaps[0] - 25.0).abs() < 1e-6);
        assert!(matches!(record.anomalies[0], PageAnomaly::OutOfOrder { block: 1, .. }));
    }

    #[test]
    fn stacked_blocks_pass_cleanly() {
        let record = run(
            &[&BoundaryDetector, &OverlapDetector],
            page(vec![
                TextBlock::new([0.0, 10.0, 10.0, 20.0], "a"),
                TextBlock::new([0.0, 0.0, 10.0, 10.0], "b"),
            ]),
        );
        assert!(record.anomalies.is_empty());
        assert!(record.output.is_empty());
    }

    #[test]
    fn skipped_without_resolved_order() {
        let record = run(
            &[&OverlapDetector],
            page(vec![
                TextBlock::new([0.0, 0.0, 10.0, 10.0], "a"),
                TextBlock::new([5.0, 5.0, 15.0, 15.0], "b"),
            ]),
        );
        assert!(record.anomalies.is_empty());
    }
}
