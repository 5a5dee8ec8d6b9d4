//! # pagestrip
//!
//! Extract the body text of paginated documents (typically academic papers)
//! page by page, dropping running headers, footers and page numbers.
//!
//! ## Why this crate?
//!
//! Text extractors return everything on the page, including the running
//! title, the journal name and the page number, interleaved with the body.
//! Those lines break sentences across page boundaries and pollute any
//! downstream text processing. This crate looks at the geometry of each
//! page's text blocks instead of their content: the highest and lowest
//! blocks define a band, and only text strictly inside it is kept.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / layout JSON
//!  │
//!  ├─ 1. Source    decode pages lazily (pdfium or serde_json)
//!  ├─ 2. Range     to-page stops reading, from-page drops earlier pages
//!  ├─ 3. Marker    ---N--- delimiter per page
//!  ├─ 4. Bounds    two-column reading order + body band
//!  ├─ 5. Overlap   flag pages whose blocks intersect
//!  ├─ 6. Strip     keep text inside the band
//!  └─ 7. Output    concatenated transcript + per-page fragments + stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pagestrip::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder().from_page(2).build()?;
//!     let output = extract("paper.pdf", &config).await?;
//!     println!("{}", output.text);
//!     for anomaly in output.anomalies() {
//!         eprintln!("warning: {}", anomaly);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pagestrip` binary (clap + anyhow + tracing-subscriber) |
//! | `pdf`   | on      | PDF input through pdfium; without it only layout JSON is read |
//!
//! Disable both when using only the geometry pipeline on your own pages:
//! ```toml
//! pagestrip = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod output;
pub mod page;
pub mod pipeline;
pub mod source;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{BandPolicy, ExtractionConfig, ExtractionConfigBuilder, PageMarker, StageKind};
pub use error::{Column, PageAnomaly, PageStripError};
pub use extract::{
    export_layout, extract, extract_from_bytes, extract_pages, extract_sync, extract_to_file, inspect,
    summarize_page, try_extract_pages,
};
pub use geometry::{detect_overlap, overlap_area, relative_coordinates, BoundingBox, RelativeCoords};
pub use output::{
    ExtractionOutput, ExtractionStats, MarginCandidate, PageFragment, PageLayoutSummary,
};
pub use page::{BottomExtent, Page, PageRecord, TextBlock};
pub use pipeline::{Pipeline, PipelineStage, RecordIter};
pub use source::layout::LayoutDocument;
pub use stream::{extract_stream, FragmentStream};
