//! Configuration types for layout extraction.
//!
//! Every knob lives in [`ExtractionConfig`], built via its
//! [`ExtractionConfigBuilder`]. The page range and the declared stage order
//! are the only parameters that change what the pipeline does; the rest
//! shapes the produced text.

use crate::error::PageStripError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Configuration for one extraction run.
///
/// # Example
/// ```rust
/// use pagestrip::{ExtractionConfig, PageMarker};
///
/// let config = ExtractionConfig::builder()
///     .from_page(2)
///     .to_page(10)
///     .page_marker(PageMarker::Comment)
///     .build()
///     .unwrap();
/// assert_eq!(config.to_page, Some(10));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// First page (1-based, inclusive) admitted by the `FromPage` stage.
    pub from_page: Option<usize>,

    /// Last page (1-based, inclusive) admitted by the `ToPage` stage. Reading
    /// stops after this page; later pages are never pulled from the source.
    pub to_page: Option<usize>,

    /// Stages in the order they are chained. Default: [`StageKind::DEFAULT_ORDER`].
    pub stages: Vec<StageKind>,

    /// How the stripping stage decides what is header/footer. Default: adaptive.
    pub band_policy: BandPolicy,

    /// Delimiter line written by the page-number stage. Default: `---N---`.
    pub page_marker: PageMarker,

    /// PDF user password for encrypted documents.
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            from_page: None,
            to_page: None,
            stages: StageKind::DEFAULT_ORDER.to_vec(),
            band_policy: BandPolicy::default(),
            page_marker: PageMarker::default(),
            password: None,
        }
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Check the constraints [`ExtractionConfigBuilder::build`] enforces.
    pub fn validate(&self) -> Result<(), PageStripError> {
        if self.from_page == Some(0) || self.to_page == Some(0) {
            return Err(PageStripError::InvalidConfig(
                "Pages are 1-indexed, page bounds must be ≥ 1".into(),
            ));
        }
        if let (Some(from_page), Some(to_page)) = (self.from_page, self.to_page) {
            if to_page < from_page {
                return Err(PageStripError::InvalidPageRange { from_page, to_page });
            }
        }
        if self.stages.is_empty() {
            return Err(PageStripError::InvalidConfig(
                "At least one pipeline stage is required".into(),
            ));
        }
        if let BandPolicy::FixedThreshold { header, footer } = self.band_policy {
            if !(0.0..=1.0).contains(&header) || !(0.0..=1.0).contains(&footer) || footer >= header {
                return Err(PageStripError::InvalidConfig(format!(
                    "Fixed thresholds must satisfy 0 ≤ footer < header ≤ 1, got footer={footer} header={header}"
                )));
            }
        }
        Ok(())
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn from_page(mut self, page: usize) -> Self {
        self.config.from_page = Some(page);
        self
    }

    pub fn to_page(mut self, page: usize) -> Self {
        self.config.to_page = Some(page);
        self
    }

    pub fn stages(mut self, stages: impl IntoIterator<Item = StageKind>) -> Self {
        self.config.stages = stages.into_iter().collect();
        self
    }

    /// Remove the page-number stage, keeping the order of the others.
    pub fn without_page_numbers(mut self) -> Self {
        self.config.stages.retain(|s| *s != StageKind::PageNumbers);
        self
    }

    pub fn band_policy(mut self, policy: BandPolicy) -> Self {
        self.config.band_policy = policy;
        self
    }

    pub fn page_marker(mut self, marker: PageMarker) -> Self {
        self.config.page_marker = marker;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, PageStripError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// A pipeline stage, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageKind {
    /// Stop reading after `to_page`.
    ToPage,
    /// Drop pages before `from_page`.
    FromPage,
    /// Write a page delimiter line.
    PageNumbers,
    /// Resolve column order and record the extreme block bottoms.
    DetectBounds,
    /// Warn about overlapping blocks.
    DetectOverlap,
    /// Keep only text between the header and footer.
    StripMargins,
}

impl StageKind {
    pub const DEFAULT_ORDER: [StageKind; 6] = [
        StageKind::ToPage,
        StageKind::FromPage,
        StageKind::PageNumbers,
        StageKind::DetectBounds,
        StageKind::DetectOverlap,
        StageKind::StripMargins,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::ToPage => "to-page",
            StageKind::FromPage => "from-page",
            StageKind::PageNumbers => "page-numbers",
            StageKind::DetectBounds => "detect-bounds",
            StageKind::DetectOverlap => "detect-overlap",
            StageKind::StripMargins => "strip-margins",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageKind {
    type Err = PageStripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        StageKind::DEFAULT_ORDER
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| PageStripError::InvalidConfig(format!("Unknown stage '{}'", s.trim())))
    }
}

/// How header/footer bands are determined.
///
/// | Policy | Body text is |
/// |--------|--------------|
/// | `Adaptive` | strictly between the page's lowest and highest block bottom |
/// | `FixedThreshold` | relative bottom strictly between `footer` and `header` |
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "policy")]
pub enum BandPolicy {
    /// Derive the band per page from the extreme block positions. (default)
    #[default]
    Adaptive,
    /// Fixed fractions of the page height.
    FixedThreshold { header: f64, footer: f64 },
}

impl BandPolicy {
    /// The fixed fractions used before thresholds were derived per page.
    pub const LEGACY_THRESHOLD: BandPolicy = BandPolicy::FixedThreshold {
        header: 0.87,
        footer: 0.095,
    };
}

/// Page delimiter written by the page-number stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum PageMarker {
    /// `---N---` (default)
    #[default]
    Dashes,
    /// `<!-- page N -->`
    Comment,
    /// Custom template; `{page}` is replaced by the page id.
    Custom(String),
}

impl PageMarker {
    /// Render the delimiter line, including its trailing newline.
    pub fn render(&self, page_id: usize) -> String {
        match self {
            PageMarker::Dashes => format!("---{}---\n", page_id),
            PageMarker::Comment => format!("<!-- page {} -->\n", page_id),
            PageMarker::Custom(template) => {
                format!("{}\n", template.replace("{page}", &page_id.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ExtractionConfig::builder().build().unwrap();
        assert_eq!(config.stages, StageKind::DEFAULT_ORDER.to_vec());
        assert_eq!(config.band_policy, BandPolicy::Adaptive);
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = ExtractionConfig::builder()
            .from_page(3)
            .to_page(2)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            PageStripError::InvalidPageRange {
                from_page: 3,
                to_page: 2
            }
        ));
    }

    #[test]
    fn single_page_range_is_accepted() {
        assert!(ExtractionConfig::builder()
            .from_page(4)
            .to_page(4)
            .build()
            .is_ok());
    }

    #[test]
    fn zero_page_bound_is_rejected() {
        let err = ExtractionConfig::builder().to_page(0).build().unwrap_err();
        assert!(matches!(err, PageStripError::InvalidConfig(_)));
    }

    #[test]
    fn empty_stage_list_is_rejected() {
        let err = ExtractionConfig::builder()
            .stages(Vec::new())
            .build()
            .unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let err = ExtractionConfig::builder()
            .band_policy(BandPolicy::FixedThreshold {
                header: 0.1,
                footer: 0.9,
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, PageStripError::InvalidConfig(_)));
    }

    #[test]
    fn without_page_numbers_keeps_order() {
        let config = ExtractionConfig::builder()
            .without_page_numbers()
            .build()
            .unwrap();
        assert_eq!(config.stages.len(), 5);
        assert_eq!(config.stages[0], StageKind::ToPage);
        assert!(!config.stages.contains(&StageKind::PageNumbers));
    }

    #[test]
    fn stage_names_parse() {
        assert_eq!("strip-margins".parse::<StageKind>().unwrap(), StageKind::StripMargins);
        assert_eq!("DETECT_BOUNDS".parse::<StageKind>().unwrap(), StageKind::DetectBounds);
        assert!("reflow".parse::<StageKind>().is_err());
    }

    #[test]
    fn page_marker_render() {
        assert_eq!(PageMarker::Dashes.render(3), "---3---\n");
        assert_eq!(PageMarker::Comment.render(3), "<!-- page 3 -->\n");
        assert_eq!(
            PageMarker::Custom("== p.{page} ==".into()).render(12),
            "== p.12 ==\n"
        );
    }
}
