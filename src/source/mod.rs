//! Page sources: turn an input file into a lazy sequence of [`Page`]s.
//!
//! Two formats are accepted, told apart by their first bytes:
//!
//! * `%PDF`: read through pdfium (feature `pdf`); text segments are grouped
//!   into blocks by [`lines::group_lines`].
//! * `{`: a JSON layout file holding already-decoded block geometry, see
//!   [`layout`].
//!
//! Pages are produced lazily so that a `to-page` stage really saves the work
//! of decoding the pages after it.

pub mod layout;
pub mod lines;
#[cfg(feature = "pdf")]
pub mod pdf;

use crate::error::PageStripError;
use crate::page::Page;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A lazy, fallible sequence of pages.
pub type PageIter<'a> = Box<dyn Iterator<Item = Result<Page, PageStripError>> + 'a>;

/// Detected input format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    Layout,
}

/// An input file that exists, is readable and has a known format.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub path: PathBuf,
    pub kind: InputKind,
}

/// Check that `path` is a readable PDF or JSON layout file.
pub fn resolve_input(path: &Path) -> Result<ResolvedInput, PageStripError> {
    let path = path.to_path_buf();
    if !path.exists() {
        return Err(PageStripError::FileNotFound { path });
    }

    let mut file = match std::fs::File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PageStripError::PermissionDenied { path });
        }
        Err(_) => return Err(PageStripError::FileNotFound { path }),
    };

    let mut head = [0u8; 64];
    let n = file.read(&mut head).map_err(|e| PageStripError::Internal(e.to_string()))?;
    let kind = sniff(&head[..n]).ok_or_else(|| PageStripError::UnsupportedInput {
        path: path.clone(),
        magic: head[..n.min(4)].to_vec(),
    })?;

    debug!("Resolved {:?} input: {}", kind, path.display());
    Ok(ResolvedInput { path, kind })
}

fn sniff(head: &[u8]) -> Option<InputKind> {
    if head.starts_with(b"%PDF") {
        return Some(InputKind::Pdf);
    }
    let first = head
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map(|i| &head[i..])?;
    let first = first.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(first);
    first.starts_with(b"{").then_some(InputKind::Layout)
}

/// Open `input` and hand its page sequence to `f`.
///
/// The sequence may borrow decoder state that only lives for the duration
/// of the call, hence the callback.
pub fn with_pages<R>(
    input: &ResolvedInput,
    password: Option<&str>,
    f: impl FnOnce(PageIter<'_>) -> Result<R, PageStripError>,
) -> Result<R, PageStripError> {
    match input.kind {
        InputKind::Layout => {
            let _ = password;
            let document = layout::read_layout(&input.path)?;
            f(Box::new(document.into_pages().map(Ok)))
        }
        #[cfg(feature = "pdf")]
        InputKind::Pdf => pdf::with_pdf_pages(&input.path, password, f),
        #[cfg(not(feature = "pdf"))]
        InputKind::Pdf => Err(PageStripError::PdfSupportDisabled {
            path: input.path.clone(),
        }),
    }
}
