//! Page-range stages.
//!
//! `ToPage` ends the stream as soon as the last admitted page has gone
//! through, so the source is never asked for the pages after it. `FromPage`
//! is a plain filter: rejected pages are still pulled and dropped.

use super::{PipelineStage, RecordIter};
use crate::error::PageStripError;
use crate::page::PageRecord;
use tracing::debug;

/// Pass pages while `page_id <= to_page`, then stop reading.
#[derive(Debug, Clone, Copy)]
pub struct ToPage {
    to_page: usize,
}

impl ToPage {
    pub fn new(to_page: usize) -> Self {
        Self { to_page }
    }
}

impl PipelineStage for ToPage {
    fn name(&self) -> &'static str {
        "to-page"
    }

    fn process<'a>(&self, upstream: RecordIter<'a>) -> RecordIter<'a> {
        Box::new(UntilPage {
            inner: upstream,
            to_page: self.to_page,
            done: false,
        })
    }
}

/// Page ids strictly increase, so the page equal to `to_page` is the last
/// one that can be admitted; stopping right after it avoids a pointless pull.
struct UntilPage<'a> {
    inner: RecordIter<'a>,
    to_page: usize,
    done: bool,
}

impl Iterator for UntilPage<'_> {
    type Item = Result<PageRecord, PageStripError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.inner.next()?;
        let record = match item {
            Ok(record) => record,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        let page_id = record.page_id();
        if page_id > self.to_page {
            debug!("Page {} is past to_page={}; stop reading", page_id, self.to_page);
            self.done = true;
            return None;
        }
        if page_id == self.to_page {
            debug!("Page {} is the last page admitted; stop reading after it", page_id);
            self.done = true;
        } else {
            debug!("Page {} admitted (≤ {})", page_id, self.to_page);
        }
        Some(Ok(record))
    }
}

/// Pass only pages with `page_id >= from_page`.
#[derive(Debug, Clone, Copy)]
pub struct FromPage {
    from_page: usize,
}

impl FromPage {
    pub fn new(from_page: usize) -> Self {
        Self { from_page }
    }
}

impl PipelineStage for FromPage {
    fn name(&self) -> &'static str {
        "from-page"
    }

    fn process<'a>(&self, upstream: RecordIter<'a>) -> RecordIter<'a> {
        let from_page = self.from_page;
        Box::new(upstream.filter(move |item| match item {
            Ok(record) if record.page_id() < from_page => {
                debug!("Page {} dropped (< {})", record.page_id(), from_page);
                false
            }
            Ok(record) => {
                debug!("Page {} admitted (≥ {})", record.page_id(), from_page);
                true
            }
            Err(_) => true,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use crate::pipeline::test_support::blank_pages;
    use std::cell::Cell;

    fn source<'a>(pages: Vec<Page>, pulled: &'a Cell<usize>) -> RecordIter<'a> {
        Box::new(pages.into_iter().map(move |p| {
            pulled.set(pulled.get() + 1);
            Ok(PageRecord::new(p))
        }))
    }

    fn ids(records: RecordIter<'_>) -> Vec<usize> {
        records.map(|r| r.unwrap().page_id()).collect()
    }

    #[test]
    fn to_page_stops_pulling_after_last_page() {
        let pulled = Cell::new(0);
        let out = ids(ToPage::new(2).process(source(blank_pages(4), &pulled)));
        assert_eq!(out, vec![1, 2]);
        assert_eq!(pulled.get(), 2, "pages 3 and 4 must never be pulled");
    }

    #[test]
    fn to_page_beyond_document_passes_everything() {
        let pulled = Cell::new(0);
        let out = ids(ToPage::new(10).process(source(blank_pages(3), &pulled)));
        assert_eq!(out, vec![1, 2, 3]);
        assert_eq!(pulled.get(), 3);
    }

    #[test]
    fn to_page_stops_at_first_page_past_the_bound() {
        // A gap in page ids: 1, 3, 5 with to_page = 2.
        let pages = vec![
            Page::new(1, [0.0, 0.0, 1.0, 1.0], Vec::new()),
            Page::new(3, [0.0, 0.0, 1.0, 1.0], Vec::new()),
            Page::new(5, [0.0, 0.0, 1.0, 1.0], Vec::new()),
        ];
        let pulled = Cell::new(0);
        let out = ids(ToPage::new(2).process(source(pages, &pulled)));
        assert_eq!(out, vec![1]);
        assert_eq!(pulled.get(), 2);
    }

    #[test]
    fn from_page_drops_earlier_pages_and_keeps_draining() {
        let pulled = Cell::new(0);
        let out = ids(FromPage::new(2).process(source(blank_pages(3), &pulled)));
        assert_eq!(out, vec![2, 3]);
        assert_eq!(pulled.get(), 3);
    }

    #[test]
    fn from_page_past_the_end_yields_nothing() {
        let pulled = Cell::new(0);
        let out = ids(FromPage::new(9).process(source(blank_pages(3), &pulled)));
        assert!(out.is_empty());
        assert_eq!(pulled.get(), 3);
    }

    #[test]
    fn errors_are_not_filtered() {
        let upstream: RecordIter<'_> =
            Box::new(std::iter::once(Err(PageStripError::Internal("boom".into()))));
        let items: Vec<_> = FromPage::new(5).process(upstream).collect();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }
}
