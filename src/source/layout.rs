//! JSON layout files: page geometry produced (or corrected) outside this
//! crate.
//!
//! ```json
//! {"pages": [
//!   {"bounding_box": [0, 0, 612, 792],
//!    "text_blocks": [{"bounding_box": [72, 700, 540, 720], "text": "..."}]}
//! ]}
//! ```
//!
//! Page ids are not stored; pages are numbered from 1 in file order.

use crate::error::PageStripError;
use crate::geometry::BoundingBox;
use crate::page::{Page, TextBlock};
use serde::{Deserialize, Serialize};
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub pages: Vec<LayoutPage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPage {
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub text_blocks: Vec<TextBlock>,
}

impl LayoutDocument {
    /// Pages numbered from 1 in document order.
    pub fn into_pages(self) -> impl Iterator<Item = Page> {
        self.pages
            .into_iter()
            .enumerate()
            .map(|(idx, p)| Page::new(idx + 1, p.bounding_box, p.text_blocks))
    }

    /// Snapshot of decoded pages, e.g. to hand-correct PDF geometry.
    pub fn from_pages<'a>(pages: impl IntoIterator<Item = &'a Page>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|p| LayoutPage {
                    bounding_box: p.bounding_box,
                    text_blocks: p.text_blocks.clone(),
                })
                .collect(),
        }
    }
}

/// Parse a layout file.
pub fn read_layout(path: &Path) -> Result<LayoutDocument, PageStripError> {
    let file = std::fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            PageStripError::PermissionDenied {
                path: path.to_path_buf(),
            }
        } else {
            PageStripError::FileNotFound {
                path: path.to_path_buf(),
            }
        }
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| PageStripError::InvalidLayout {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}
