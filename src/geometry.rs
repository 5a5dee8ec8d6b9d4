//! Geometry helpers: page-relative coordinates and block overlap detection.
//!
//! All coordinates use the PDF convention: the origin is at the bottom-left
//! of the page and `y` grows upwards, so a block's `top` is greater than its
//! `bottom`.

use crate::error::PageStripError;
use geo::{coord, Area, BooleanOps, MultiPolygon, Rect};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Relative tolerance when comparing the union area against the summed
/// block areas. Floating-point noise from the sweep must not read as overlap.
const AREA_EPSILON: f64 = 1e-9;

/// Axis-aligned rectangle in absolute page units.
///
/// Serialised as a `[left, bottom, right, top]` array, the layout used by
/// the JSON layout files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl BoundingBox {
    pub const fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Horizontal centre, used to assign a block to a column.
    pub fn center_x(&self) -> f64 {
        (self.left + self.right) / 2.0
    }

    pub fn area(&self) -> f64 {
        self.width().abs() * self.height().abs()
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            left: self.left.min(other.left),
            bottom: self.bottom.min(other.bottom),
            right: self.right.max(other.right),
            top: self.top.max(other.top),
        }
    }

    fn to_rect(self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.left, y: self.bottom },
            coord! { x: self.right, y: self.top },
        )
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from([left, bottom, right, top]: [f64; 4]) -> Self {
        Self::new(left, bottom, right, top)
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.left, b.bottom, b.right, b.top]
    }
}

/// A block position expressed as fractions of the page size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativeCoords {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

/// Express `bbox` relative to `page`: x values are divided by the page
/// width, y values by the page height, each rounded to 3 decimals.
///
/// # Errors
/// [`PageStripError::DegeneratePage`] when the page has zero width or height.
pub fn relative_coordinates(
    bbox: &BoundingBox,
    page: &BoundingBox,
) -> Result<RelativeCoords, PageStripError> {
    let page_width = page.width();
    let page_height = page.height();
    if page_width == 0.0 || page_height == 0.0 {
        return Err(PageStripError::DegeneratePage {
            width: page_width,
            height: page_height,
        });
    }

    Ok(RelativeCoords {
        left: round3(bbox.left / page_width),
        bottom: round3(bbox.bottom / page_height),
        width: round3(bbox.width() / page_width),
        height: round3(bbox.height() / page_height),
    })
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Area shared by two or more of the given boxes.
///
/// Computed as the difference between the summed box areas and the area of
/// their polygon union, so boxes that only touch along an edge or at a corner
/// contribute nothing. Zero-area boxes cannot share interior and are skipped.
pub fn overlap_area<'a>(boxes: impl IntoIterator<Item = &'a BoundingBox>) -> f64 {
    let mut union: Option<MultiPolygon<f64>> = None;
    let mut summed = 0.0;

    for bbox in boxes {
        let area = bbox.area();
        if area == 0.0 {
            continue;
        }
        summed += area;
        let piece = MultiPolygon::new(vec![bbox.to_rect().to_polygon()]);
        union = Some(match union {
            Some(acc) => acc.union(&piece),
            None => piece,
        });
    }

    let covered = union.map_or(0.0, |u| u.unsigned_area());
    let shared = summed - covered;
    if shared <= AREA_EPSILON * summed.max(1.0) {
        0.0
    } else {
        shared
    }
}

/// Whether the boxes form a valid planar arrangement, i.e. no two of them
/// share interior area. Edge-adjacent boxes are valid.
///
/// Logs a warning when the arrangement is invalid.
pub fn detect_overlap<'a>(boxes: impl IntoIterator<Item = &'a BoundingBox>) -> bool {
    let shared = overlap_area(boxes);
    if shared > 0.0 {
        warn!(
            "Overlapping text blocks ({:.1} square units shared); check line breaks and columns",
            shared
        );
        return false;
    }
    true
}
