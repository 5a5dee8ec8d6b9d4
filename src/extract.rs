//! Stream driver: run the pipeline over a page source and collect the
//! transcript.
//!
//! [`extract_pages`] is the synchronous core: it wraps the source, chains
//! the configured stages, drains the result and appends each page's output to
//! the transcript in emission order. The file-based entry points resolve the
//! input, then run that core inside `spawn_blocking` because pdfium is not
//! async-safe.

use crate::config::ExtractionConfig;
use crate::error::{PageAnomaly, PageStripError};
use crate::geometry::relative_coordinates;
use crate::output::{
    ExtractionOutput, ExtractionStats, MarginCandidate, PageFragment, PageLayoutSummary,
};
use crate::page::{BottomExtent, Page};
use crate::pipeline::Pipeline;
use crate::source::{self, layout::LayoutDocument};
use std::cell::Cell;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Relative bottom at or above which `inspect` reports a header candidate.
const HEADER_CANDIDATE: f64 = 0.87;
/// Relative bottom at or below which `inspect` reports a footer candidate.
const FOOTER_CANDIDATE: f64 = 0.095;

/// Run the configured pipeline over an in-memory page sequence.
///
/// # Example
/// ```rust
/// use pagestrip::{extract_pages, ExtractionConfig, Page, TextBlock};
///
/// let page = Page::new(1, [0.0, 0.0, 100.0, 200.0], vec![
///     TextBlock::new([10.0, 190.0, 90.0, 198.0], "Header"),
///     TextBlock::new([10.0, 100.0, 90.0, 150.0], "Body"),
///     TextBlock::new([45.0, 5.0, 55.0, 12.0], "1"),
/// ]);
/// let output = extract_pages(vec![page], &ExtractionConfig::default()).unwrap();
/// assert_eq!(output.text, "---1---\nBody\n");
/// ```
pub fn extract_pages<I>(pages: I, config: &ExtractionConfig) -> Result<ExtractionOutput, PageStripError>
where
    I: IntoIterator<Item = Page>,
{
    try_extract_pages(pages.into_iter().map(Ok), config)
}

/// Like [`extract_pages`] for a source that can fail part-way. The first
/// error aborts the run; no partial output is returned.
pub fn try_extract_pages<I>(
    pages: I,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, PageStripError>
where
    I: IntoIterator<Item = Result<Page, PageStripError>>,
{
    let start = Instant::now();
    let pipeline = Pipeline::from_config(config)?;

    let pages_read = Cell::new(0usize);
    let counted = pages
        .into_iter()
        .inspect(|_| pages_read.set(pages_read.get() + 1));

    let mut transcript = Transcript::default();
    for record in pipeline.run(counted) {
        transcript.push(PageFragment::from(record?));
    }

    let output = transcript.finish(pages_read.get(), start.elapsed().as_millis() as u64);
    info!(
        "Extraction complete: {}/{} pages emitted, {} ordering / {} overlap anomalies, {}ms",
        output.stats.pages_emitted,
        output.stats.pages_read,
        output.stats.ordering_anomalies,
        output.stats.overlap_anomalies,
        output.stats.duration_ms
    );
    Ok(output)
}

/// Append-only accumulator for page fragments.
#[derive(Default)]
struct Transcript {
    text: String,
    pages: Vec<PageFragment>,
    stats: ExtractionStats,
}

impl Transcript {
    fn push(&mut self, fragment: PageFragment) {
        for anomaly in &fragment.anomalies {
            match anomaly {
                PageAnomaly::OutOfOrder { .. } => self.stats.ordering_anomalies += 1,
                PageAnomaly::Overlap { .. } => self.stats.overlap_anomalies += 1,
            }
        }
        self.text.push_str(&fragment.text);
        self.stats.pages_emitted += 1;
        self.pages.push(fragment);
    }

    fn finish(mut self, pages_read: usize, duration_ms: u64) -> ExtractionOutput {
        self.stats.pages_read = pages_read;
        self.stats.duration_ms = duration_ms;
        ExtractionOutput {
            text: self.text,
            pages: self.pages,
            stats: self.stats,
        }
    }
}

/// Extract the body-text transcript of a PDF or JSON layout file.
///
/// # Errors
/// Configuration errors are returned before the input is opened. Input,
/// PDF and geometry errors abort the run.
pub async fn extract(
    input: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, PageStripError> {
    config.validate()?;
    let resolved = source::resolve_input(input.as_ref())?;
    info!("Starting extraction: {}", resolved.path.display());

    let config = config.clone();
    tokio::task::spawn_blocking(move || {
        source::with_pages(&resolved, config.password.as_deref(), |pages| {
            try_extract_pages(pages, &config)
        })
    })
    .await
    .map_err(|e| PageStripError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, PageStripError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PageStripError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input, config))
}

/// Extract and write the transcript to `output_path`.
///
/// Uses atomic write (temp file + rename) so a failed run never leaves a
/// truncated transcript behind.
pub async fn extract_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, PageStripError> {
    let output = extract(input, config).await?;
    let path = output_path.as_ref();
    write_atomic(path, output.text.as_bytes()).await?;
    Ok(output.stats)
}

/// Extract from a document held in memory (PDF or layout JSON bytes).
///
/// The bytes are written to a managed [`tempfile`] that is removed when
/// the call returns.
///
/// # Example
/// ```rust,no_run
/// use pagestrip::{extract_from_bytes, ExtractionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes: Vec<u8> = std::fs::read("paper.pdf")?;
/// let output = extract_from_bytes(&bytes, &ExtractionConfig::default()).await?;
/// println!("{}", output.text);
/// # Ok(())
/// # }
/// ```
pub async fn extract_from_bytes(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, PageStripError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| PageStripError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| PageStripError::Internal(format!("tempfile write: {e}")))?;
    // `tmp` is dropped (and the file deleted) when `extract` returns
    extract(tmp.path(), config).await
}

pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PageStripError> {
    let write_err = |source| PageStripError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)
}

/// Report per-page geometry without running the pipeline.
///
/// Lists each page's extreme block bottoms in absolute and relative units and
/// the blocks the fixed thresholds (0.87 / 0.095 of the page height) would
/// treat as header or footer. Useful for choosing between the band policies.
pub async fn inspect(input: impl AsRef<Path>) -> Result<Vec<PageLayoutSummary>, PageStripError> {
    let resolved = source::resolve_input(input.as_ref())?;
    tokio::task::spawn_blocking(move || {
        source::with_pages(&resolved, None, |pages| {
            pages.map(|page| summarize_page(&page?)).collect()
        })
    })
    .await
    .map_err(|e| PageStripError::Internal(format!("Inspect task panicked: {}", e)))?
}

/// Decode every page of `input` into a [`LayoutDocument`] that can be edited
/// and fed back in.
pub async fn export_layout(
    input: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<LayoutDocument, PageStripError> {
    let resolved = source::resolve_input(input.as_ref())?;
    let password = password.map(str::to_string);
    tokio::task::spawn_blocking(move || {
        source::with_pages(&resolved, password.as_deref(), |pages| {
            let pages = pages.collect::<Result<Vec<_>, _>>()?;
            Ok(LayoutDocument::from_pages(&pages))
        })
    })
    .await
    .map_err(|e| PageStripError::Internal(format!("Export task panicked: {}", e)))?
}

/// Geometry summary of a single page.
///
/// # Errors
/// [`PageStripError::DegeneratePage`] when the page has blocks but zero
/// width or height.
pub fn summarize_page(page: &Page) -> Result<PageLayoutSummary, PageStripError> {
    let bottoms = BottomExtent::of(&page.text_blocks);
    let mut min_rel: Option<f64> = None;
    let mut max_rel: Option<f64> = None;
    let mut margin_candidates = Vec::new();

    for block in &page.text_blocks {
        let rel = relative_coordinates(&block.bounding_box, &page.bounding_box)?;
        min_rel = Some(min_rel.map_or(rel.bottom, |m| m.min(rel.bottom)));
        max_rel = Some(max_rel.map_or(rel.bottom, |m| m.max(rel.bottom)));
        if rel.bottom >= HEADER_CANDIDATE || rel.bottom <= FOOTER_CANDIDATE {
            margin_candidates.push(MarginCandidate {
                text: block.text.clone(),
                bounding_box: block.bounding_box,
                relative: rel,
            });
        }
    }

    Ok(PageLayoutSummary {
        page_id: page.page_id,
        bounding_box: page.bounding_box,
        block_count: page.text_blocks.len(),
        min_bottom: bottoms.map(|b| b.min_bottom),
        max_bottom: bottoms.map(|b| b.max_bottom),
        min_relative_bottom: min_rel,
        max_relative_bottom: max_rel,
        margin_candidates,
    })
}
