//! Boundary detection: reading order plus the page's body band.

use super::columns::order_columns;
use super::{map_records, PipelineStage, RecordIter};
use crate::page::BottomExtent;
use tracing::debug;

/// Sets `ordered_texts` from the column resolver and `bottoms` from the
/// lowest and highest block bottom. A page without blocks gets neither.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryDetector;

impl PipelineStage for BoundaryDetector {
    fn name(&self) -> &'static str {
        "detect-bounds"
    }

    fn process<'a>(&self, upstream: RecordIter<'a>) -> RecordIter<'a> {
        map_records(upstream, |record| {
            let page = &record.page;
            let Some(bottoms) = BottomExtent::of(&page.text_blocks) else {
                debug!("Page {}: no text blocks, no body band", page.page_id);
                return Ok(());
            };

            let order = order_columns(page.page_id, &page.text_blocks, &page.bounding_box);
            debug!(
                "Page {}: {} left / {} right blocks, bottoms {}..{}",
                page.page_id,
                order.left.len(),
                order.right.len(),
                bottoms.min_bottom,
                bottoms.max_bottom
            );

            record.ordered_texts = Some(order.indices());
            record.anomalies.extend(order.anomalies);
            record.bottoms = Some(bottoms);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Page, PageRecord, TextBlock};
    use crate::pipeline::test_support::{blank_pages, header_body_footer};

    fn run(page: Page) -> PageRecord {
        let upstream: RecordIter<'_> = Box::new(std::iter::once(Ok(PageRecord::new(page))));
        BoundaryDetector.process(upstream).next().unwrap().unwrap()
    }

    #[test]
    fn page_without_blocks_gets_no_metadata() {
        let record = run(blank_pages(1).remove(0));
        assert!(record.bottoms.is_none());
        assert!(record.min_bottom().is_none());
        assert!(record.max_bottom().is_none());
        assert!(record.ordered_texts.is_none());
    }

    #[test]
    fn extremes_come_from_block_bottoms() {
        let record = run(header_body_footer(1));
        assert_eq!(record.min_bottom(), Some(5.0));
        assert_eq!(record.max_bottom(), Some(190.0));
        assert!(record.min_bottom() <= record.max_bottom());
    }

    #[test]
    fn ordered_texts_is_a_permutation_of_the_blocks() {
        let page = Page::new(
            1,
            [0.0, 0.0, 600.0, 800.0],
            vec![
                TextBlock::new([320.0, 700.0, 550.0, 750.0], "R1"),
                TextBlock::new([50.0, 700.0, 280.0, 750.0], "L1"),
                TextBlock::new([320.0, 600.0, 550.0, 650.0], "R2"),
                TextBlock::new([50.0, 600.0, 280.0, 650.0], "L2"),
            ],
        );
        let record = run(page);
        let order = record.ordered_texts.clone().unwrap();
        assert_eq!(order, vec![1, 3, 0, 2]);
        let texts: Vec<&str> = record
            .blocks_in_order()
            .iter()
            .map(|b| b.text.as_str())
            .collect();
        assert_eq!(texts, vec!["L1", "L2", "R1", "R2"]);
    }

    #[test]
    fn ordering_anomalies_are_recorded() {
        let page = Page::new(
            2,
            [0.0, 0.0, 600.0, 800.0],
            vec![
                TextBlock::new([50.0, 100.0, 280.0, 150.0], "low"),
                TextBlock::new([50.0, 700.0, 280.0, 750.0], "high"),
            ],
        );
        let record = run(page);
        assert_eq!(record.anomalies.len(), 1);
        assert_eq!(record.anomalies[0].page(), 2);
    }
}
