//! Page-processing pipeline.
//!
//! Each submodule implements one stage. A stage consumes a lazy, single-pass
//! sequence of [`PageRecord`]s and produces the sequence the next stage
//! reads, either one-to-one (annotate) or filtering (drop or stop early).
//! Nothing is buffered between stages: one page travels through the whole
//! chain before the next page is pulled from the source.
//!
//! ## Default Data Flow
//!
//! ```text
//! source ──▶ to-page ──▶ from-page ──▶ page-numbers ──▶ detect-bounds ──▶ detect-overlap ──▶ strip-margins
//!            (stop)      (drop)        (marker line)    (columns, band)   (diagnostic)       (body text)
//! ```
//!
//! 1. [`range`]: `to-page` stops pulling once the last wanted page is out;
//!    `from-page` drops earlier pages but keeps draining
//! 2. [`annotate`]: append the page delimiter line
//! 3. [`bounds`]: reading order via [`columns`] plus the page's body band
//! 4. [`overlap`]: flag pages whose blocks share interior area
//! 5. [`strip`]: keep only text inside the body band
//!
//! Items are `Result`s: a stage that hits a fatal error yields `Err` and
//! every later stage passes it through untouched.

pub mod annotate;
pub mod bounds;
pub mod columns;
pub mod overlap;
pub mod range;
pub mod strip;

use crate::config::{ExtractionConfig, StageKind};
use crate::error::PageStripError;
use crate::page::{Page, PageRecord};
use tracing::info;

/// A lazy stream of page records.
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<PageRecord, PageStripError>> + 'a>;

/// One transform in the chain.
pub trait PipelineStage: Send + Sync {
    /// Name used in logs; matches the configuration name of the stage.
    fn name(&self) -> &'static str;

    /// Wrap `upstream` in this stage's transform. Must stay lazy.
    fn process<'a>(&self, upstream: RecordIter<'a>) -> RecordIter<'a>;
}

/// Apply `f` to every successful record, passing errors through. A failing
/// `f` turns the record into an error.
pub(crate) fn map_records<'a, F>(upstream: RecordIter<'a>, mut f: F) -> RecordIter<'a>
where
    F: FnMut(&mut PageRecord) -> Result<(), PageStripError> + 'a,
{
    Box::new(upstream.map(move |item| {
        let mut record = item?;
        f(&mut record)?;
        Ok(record)
    }))
}

/// An ordered chain of stages built once from configuration.
pub struct Pipeline {
    stages: Vec<Box<dyn PipelineStage>>,
}

impl Pipeline {
    /// Validate `config` and instantiate its stages in declared order.
    ///
    /// Fails before any page is read when the configuration is invalid.
    /// Range stages whose bound is not configured are left out.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, PageStripError> {
        config.validate()?;

        let mut stages: Vec<Box<dyn PipelineStage>> = Vec::with_capacity(config.stages.len());
        for kind in &config.stages {
            match kind {
                StageKind::ToPage => {
                    if let Some(to_page) = config.to_page {
                        stages.push(Box::new(range::ToPage::new(to_page)));
                    }
                }
                StageKind::FromPage => {
                    if let Some(from_page) = config.from_page {
                        stages.push(Box::new(range::FromPage::new(from_page)));
                    }
                }
                StageKind::PageNumbers => stages.push(Box::new(annotate::PageNumberAnnotator::new(
                    config.page_marker.clone(),
                ))),
                StageKind::DetectBounds => stages.push(Box::new(bounds::BoundaryDetector)),
                StageKind::DetectOverlap => stages.push(Box::new(overlap::OverlapDetector)),
                StageKind::StripMargins => {
                    stages.push(Box::new(strip::MarginStripper::new(config.band_policy)))
                }
            }
        }

        let pipeline = Self { stages };
        info!(
            "Pipeline: [{}] from_page={:?} to_page={:?} policy={:?}",
            pipeline.stage_names().join(" → "),
            config.from_page,
            config.to_page,
            config.band_policy
        );
        Ok(pipeline)
    }

    /// Names of the instantiated stages, in chain order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Wrap `pages` in page records and chain every stage over them.
    ///
    /// Nothing is read until the returned iterator is pulled.
    pub fn run<'a, I>(&self, pages: I) -> RecordIter<'a>
    where
        I: IntoIterator<Item = Result<Page, PageStripError>>,
        I::IntoIter: 'a,
    {
        let source: RecordIter<'a> = Box::new(pages.into_iter().map(|p| p.map(PageRecord::new)));
        self.stages
            .iter()
            .fold(source, |records, stage| stage.process(records))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::config::ExtractionConfig;

    fn collect(pipeline: &Pipeline, pages: Vec<Page>) -> Vec<PageRecord> {
        pipeline
            .run(pages.into_iter().map(Ok))
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn unset_range_stages_are_not_instantiated() {
        let pipeline = Pipeline::from_config(&ExtractionConfig::default()).unwrap();
        assert_eq!(
            pipeline.stage_names(),
            vec!["page-numbers", "detect-bounds", "detect-overlap", "strip-margins"]
        );
    }

    #[test]
    fn invalid_config_fails_before_running() {
        let config = ExtractionConfig {
            from_page: Some(3),
            to_page: Some(2),
            ..ExtractionConfig::default()
        };
        let err = Pipeline::from_config(&config).err().unwrap();
        assert!(matches!(err, PageStripError::InvalidPageRange { .. }));
    }

    #[test]
    fn declared_order_is_respected() {
        // Strip before page numbers: the marker lands after the body text.
        let config = ExtractionConfig::builder()
            .stages([
                StageKind::DetectBounds,
                StageKind::StripMargins,
                StageKind::PageNumbers,
            ])
            .build()
            .unwrap();
        let pipeline = Pipeline::from_config(&config).unwrap();
        let records = collect(&pipeline, vec![header_body_footer(1)]);
        assert_eq!(records[0].output, "Body paragraph\n---1---\n");
    }

    #[test]
    fn default_chain_end_to_end() {
        let pipeline = Pipeline::from_config(&ExtractionConfig::default()).unwrap();
        let records = collect(&pipeline, vec![header_body_footer(1), header_body_footer(2)]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].output, "---1---\nBody paragraph\n");
        assert_eq!(records[1].output, "---2---\nBody paragraph\n");
        assert!(records.iter().all(|r| r.anomalies.is_empty()));
    }

    #[test]
    fn source_errors_pass_through_stages() {
        let pipeline = Pipeline::from_config(&ExtractionConfig::default()).unwrap();
        let pages = vec![
            Ok(header_body_footer(1)),
            Err(PageStripError::Internal("bad page".into())),
        ];
        let items: Vec<_> = pipeline.run(pages).collect();
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(PageStripError::Internal(_))));
    }

    #[test]
    fn blank_pages_only_get_markers() {
        let pipeline = Pipeline::from_config(&ExtractionConfig::default()).unwrap();
        let records = collect(&pipeline, blank_pages(2));
        assert_eq!(records[0].output, "---1---\n");
        assert!(records[0].bottoms.is_none());
    }
}
