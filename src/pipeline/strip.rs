//! Header/footer stripping.
//!
//! With the adaptive policy the band comes from the record's `bottoms`, set
//! by [`super::bounds::BoundaryDetector`]. Without it the page contributes no
//! text. Blocks are read in resolved column order when available, otherwise
//! in source order.
//!
//! The fixed-threshold policy ignores `bottoms` and classifies each block by
//! its bottom edge relative to the page height.

use super::{map_records, PipelineStage, RecordIter};
use crate::config::BandPolicy;
use crate::error::PageStripError;
use crate::geometry::relative_coordinates;
use crate::page::PageRecord;
use tracing::debug;

/// Appends the text of every body block to the record output, one block
/// per line.
#[derive(Debug, Clone, Copy)]
pub struct MarginStripper {
    policy: BandPolicy,
}

impl MarginStripper {
    pub fn new(policy: BandPolicy) -> Self {
        Self { policy }
    }
}

impl PipelineStage for MarginStripper {
    fn name(&self) -> &'static str {
        "strip-margins"
    }

    fn process<'a>(&self, upstream: RecordIter<'a>) -> RecordIter<'a> {
        let policy = self.policy;
        map_records(upstream, move |record| match policy {
            BandPolicy::Adaptive => {
                strip_adaptive(record);
                Ok(())
            }
            BandPolicy::FixedThreshold { header, footer } => {
                strip_fixed(record, header, footer)
            }
        })
    }
}

fn strip_adaptive(record: &mut PageRecord) {
    let Some(band) = record.bottoms else {
        debug!("Page {}: no body band, nothing kept", record.page_id());
        return;
    };

    let mut body = String::new();
    let mut dropped = 0usize;
    for block in record.blocks_in_order() {
        if band.contains(block) {
            body.push_str(&block.text);
            body.push('\n');
        } else {
            dropped += 1;
        }
    }
    debug!("Page {}: {} margin blocks dropped", record.page_id(), dropped);
    record.output.push_str(&body);
}

fn strip_fixed(record: &mut PageRecord, header: f64, footer: f64) -> Result<(), PageStripError> {
    let page_box = record.page.bounding_box;
    let mut body = String::new();
    for block in record.blocks_in_order() {
        let rel = relative_coordinates(&block.bounding_box, &page_box)?;
        if footer < rel.bottom && rel.bottom < header {
            body.push_str(&block.text);
            body.push('\n');
        }
    }
    record.output.push_str(&body);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{BottomExtent, Page, TextBlock};
    use crate::pipeline::bounds::BoundaryDetector;
    use crate::pipeline::test_support::{blank_pages, header_body_footer};

    fn one(record: PageRecord) -> RecordIter<'static> {
        Box::new(std::iter::once(Ok(record)))
    }

    fn detect_then_strip(page: Page, policy: BandPolicy) -> Result<PageRecord, PageStripError> {
        let detected = BoundaryDetector.process(one(PageRecord::new(page)));
        MarginStripper::new(policy).process(detected).next().unwrap()
    }

    #[test]
    fn only_body_between_header_and_footer_is_kept() {
        let record = detect_then_strip(header_body_footer(1), BandPolicy::Adaptive).unwrap();
        assert_eq!(record.min_bottom(), Some(5.0));
        assert_eq!(record.max_bottom(), Some(190.0));
        assert_eq!(record.output, "Body paragraph\n");
    }

    #[test]
    fn page_without_bounds_adds_nothing() {
        let record = MarginStripper::new(BandPolicy::Adaptive)
            .process(one(PageRecord::new(header_body_footer(1))))
            .next()
            .unwrap()
            .unwrap();
        assert!(record.output.is_empty());
    }

    #[test]
    fn blank_page_adds_nothing() {
        let record = detect_then_strip(blank_pages(1).remove(0), BandPolicy::Adaptive).unwrap();
        assert!(record.output.is_empty());
    }

    #[test]
    fn raw_order_is_used_without_resolver() {
        // bottoms set by hand, ordered_texts left empty
        let page = Page::new(
            1,
            [0.0, 0.0, 600.0, 800.0],
            vec![
                TextBlock::new([320.0, 500.0, 550.0, 550.0], "right"),
                TextBlock::new([50.0, 500.0, 280.0, 550.0], "left"),
            ],
        );
        let mut record = PageRecord::new(page);
        record.bottoms = Some(BottomExtent {
            min_bottom: 0.0,
            max_bottom: 800.0,
        });
        let out = MarginStripper::new(BandPolicy::Adaptive)
            .process(one(record))
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(out.output, "right\nleft\n");
    }

    #[test]
    fn two_column_body_follows_column_order() {
        let page = Page::new(
            1,
            [0.0, 0.0, 600.0, 800.0],
            vec![
                TextBlock::new([50.0, 760.0, 550.0, 780.0], "header"),
                TextBlock::new([50.0, 500.0, 280.0, 700.0], "L1"),
                TextBlock::new([320.0, 500.0, 550.0, 700.0], "R1"),
                TextBlock::new([50.0, 300.0, 280.0, 480.0], "L2"),
                TextBlock::new([320.0, 300.0, 550.0, 480.0], "R2"),
                TextBlock::new([290.0, 20.0, 310.0, 35.0], "12"),
            ],
        );
        let record = detect_then_strip(page, BandPolicy::Adaptive).unwrap();
        assert_eq!(record.output, "L1\nL2\nR1\nR2\n");
    }

    #[test]
    fn block_starting_at_lowest_bottom_is_excluded() {
        // A short closing paragraph sharing the footer's bottom edge is lost
        // along with the footer.
        let page = Page::new(
            1,
            [0.0, 0.0, 100.0, 200.0],
            vec![
                TextBlock::new([10.0, 190.0, 90.0, 198.0], "header"),
                TextBlock::new([10.0, 100.0, 90.0, 150.0], "body"),
                TextBlock::new([10.0, 5.0, 40.0, 12.0], "closing"),
                TextBlock::new([60.0, 5.0, 90.0, 12.0], "7"),
            ],
        );
        let record = detect_then_strip(page, BandPolicy::Adaptive).unwrap();
        assert_eq!(record.output, "body\n");
    }

    #[test]
    fn fixed_threshold_keeps_mid_page_blocks() {
        let page = Page::new(
            1,
            [0.0, 0.0, 100.0, 200.0],
            vec![
                TextBlock::new([10.0, 180.0, 90.0, 195.0], "header"), // 0.9
                TextBlock::new([10.0, 100.0, 90.0, 150.0], "body"),   // 0.5
                TextBlock::new([10.0, 10.0, 90.0, 18.0], "footer"),   // 0.05
            ],
        );
        let record = detect_then_strip(page, BandPolicy::LEGACY_THRESHOLD).unwrap();
        assert_eq!(record.output, "body\n");
    }

    #[test]
    fn fixed_threshold_fails_on_degenerate_page() {
        let page = Page::new(
            1,
            [0.0, 0.0, 0.0, 200.0],
            vec![TextBlock::new([0.0, 100.0, 0.0, 150.0], "body")],
        );
        let err = detect_then_strip(page, BandPolicy::LEGACY_THRESHOLD).unwrap_err();
        assert!(matches!(err, PageStripError::DegeneratePage { .. }));
    }
}
