//! Error types for the pagestrip library.
//!
//! Two distinct types reflect two distinct failure modes:
//!
//! * [`PageStripError`]: **Fatal.** The run cannot proceed (invalid page
//!   range, degenerate page geometry, unreadable input). Returned as
//!   `Err(PageStripError)` from the `extract*` functions; no partial
//!   transcript is returned.
//!
//! * [`PageAnomaly`]: **Non-fatal.** A page's layout geometry looks
//!   inconsistent (blocks out of top-to-bottom order within a column, blocks
//!   overlapping each other). Logged at WARN and stored on the page's
//!   [`crate::output::PageFragment`] so the page can be reviewed after the
//!   run. Anomalies never change the produced text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pagestrip library.
#[derive(Debug, Error)]
pub enum PageStripError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// `to_page` lies before `from_page`; detected before any page is read.
    #[error("Invalid page range: to_page {to_page} is before from_page {from_page}")]
    InvalidPageRange { from_page: usize, to_page: usize },

    /// Builder validation failed for another reason.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Geometry errors ───────────────────────────────────────────────────
    /// A page bounding box has zero width or height, so relative
    /// coordinates cannot be computed.
    #[error("Degenerate page bounding box ({width} x {height}): width and height must be non-zero")]
    DegeneratePage { width: f64, height: f64 },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file is neither a PDF nor a JSON layout document.
    #[error("Unsupported input '{path}': expected a PDF or a JSON layout file\nFirst bytes: {magic:?}")]
    UnsupportedInput { path: PathBuf, magic: Vec<u8> },

    /// JSON layout file could not be parsed.
    #[error("Invalid layout file '{path}': {detail}")]
    InvalidLayout { path: PathBuf, detail: String },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt, or a page could not be read.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is normally downloaded automatically on first run.\n\
If the auto-download failed, set PDFIUM_LIB_PATH=/path/to/libpdfium\n\
or convert the document to a JSON layout file first.\n"
    )]
    PdfiumBindingFailed(String),

    /// This build has no PDF support (`pdf` feature disabled).
    #[error("PDF input '{path}' requires the `pdf` feature")]
    PdfSupportDisabled { path: PathBuf },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output transcript file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PageStripError {
    /// `true` for errors caused by the run configuration rather than the input.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            PageStripError::InvalidPageRange { .. } | PageStripError::InvalidConfig(_)
        )
    }
}

/// Which column of a page a block was assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Left,
    Right,
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Left => f.write_str("left"),
            Column::Right => f.write_str("right"),
        }
    }
}

/// A non-fatal layout inconsistency found on a single page.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageAnomaly {
    /// A block sits higher on the page than the block before it in the same
    /// column, so the column is not in top-to-bottom order.
    #[error("Page {page}: {column} column block #{block} (top {top}) is above the previous block (top {previous_top})")]
    OutOfOrder {
        page: usize,
        column: Column,
        /// Index of the offending block in the page's raw block list.
        block: usize,
        top: f64,
        previous_top: f64,
    },

    /// Two or more blocks on the page share interior area.
    #[error("Page {page}: text blocks overlap by {overlap_area:.1} square units; line breaks or columns may be misdetected")]
    Overlap { page: usize, overlap_area: f64 },
}

impl PageAnomaly {
    /// 1-based id of the page the anomaly was found on.
    pub fn page(&self) -> usize {
        match self {
            PageAnomaly::OutOfOrder { page, .. } | PageAnomaly::Overlap { page, .. } => *page,
        }
    }
}
