//! PDF page source backed by pdfium.
//!
//! ## Why a callback?
//!
//! `PdfDocument` borrows the `Pdfium` binding and every `PdfPage` borrows the
//! document, so the page sequence cannot outlive the function that opened
//! the file. [`with_pdf_pages`] keeps them alive for the duration of the
//! caller's work instead of collecting every page up front.
//!
//! pdfium keeps thread-local state; callers in async code run this inside
//! `tokio::task::spawn_blocking`.

use super::lines::{group_lines, TextLine};
use super::PageIter;
use crate::error::PageStripError;
use crate::geometry::BoundingBox;
use crate::page::Page;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Open the PDF at `path` and pass its lazily decoded pages to `f`.
pub fn with_pdf_pages<R>(
    path: &Path,
    password: Option<&str>,
    f: impl FnOnce(PageIter<'_>) -> Result<R, PageStripError>,
) -> Result<R, PageStripError> {
    let pdfium = pdfium_auto::bind_pdfium_silent()
        .map_err(|e| PageStripError::PdfiumBindingFailed(e.to_string()))?;

    let document = pdfium
        .load_pdf_from_file(path, password)
        .map_err(|e| load_error(path, password, e))?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let iter = pages
        .iter()
        .enumerate()
        .map(move |(idx, page)| read_page(path, idx + 1, &page));
    f(Box::new(iter))
}

fn load_error(path: &Path, password: Option<&str>, e: PdfiumError) -> PageStripError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if password.is_some() {
            PageStripError::WrongPassword {
                path: path.to_path_buf(),
            }
        } else {
            PageStripError::PasswordRequired {
                path: path.to_path_buf(),
            }
        }
    } else {
        PageStripError::CorruptPdf {
            path: path.to_path_buf(),
            detail: err_str,
        }
    }
}

/// Decode one page's text layer into blocks.
fn read_page(path: &Path, page_id: usize, page: &PdfPage) -> Result<Page, PageStripError> {
    let width = page.width().value as f64;
    let height = page.height().value as f64;

    let text = page.text().map_err(|e| PageStripError::CorruptPdf {
        path: path.to_path_buf(),
        detail: format!("page {}: text layer unreadable: {:?}", page_id, e),
    })?;

    let lines: Vec<TextLine> = text
        .segments()
        .iter()
        .map(|segment| {
            let r = segment.bounds();
            TextLine::new(
                BoundingBox::new(
                    r.left().value as f64,
                    r.bottom().value as f64,
                    r.right().value as f64,
                    r.top().value as f64,
                ),
                segment.text(),
            )
        })
        .collect();

    let blocks = group_lines(lines);
    debug!("Read page {}: {} text blocks", page_id, blocks.len());
    Ok(Page::new(page_id, [0.0, 0.0, width, height], blocks))
}
