//! Listing-page detail extraction.
//!
//! A page is read once into [`evidence::Evidence`] (header summary,
//! description block, lowercased page text, geo from JSON-LD) and every
//! detail field is then resolved by its cascade in [`cascade::CASCADES`].
//! Sections that fail to read and strategies that fail are reported as
//! issues and simply contribute nothing; extraction itself never fails.

use scraper::Html;
use serde::Serialize;
use tracing::warn;

pub mod amenities;
pub mod cascade;
pub mod evidence;
pub mod geo;
pub mod normalize;
pub mod record;
pub mod rules;

pub use cascade::Commit;
pub use record::{DetailsRecord, Field};

pub const DEFAULT_YEAR_MIN: u16 = 1900;
pub const DEFAULT_YEAR_MAX: u16 = 2030;

/// Per-run knobs for extraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ExtractConfig {
    pub year_min: u16,
    pub year_max: u16,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { year_min: DEFAULT_YEAR_MIN, year_max: DEFAULT_YEAR_MAX }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    Selector { css: &'static str, reason: String },
    Strategy { field: &'static str, strategy: &'static str, reason: String },
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Selector { css, reason } => write!(f, "invalid selector {css}: {reason}"),
            ExtractError::Strategy { field, strategy, reason } => write!(f, "{strategy} failed for {field}: {reason}"),
        }
    }
}

impl std::error::Error for ExtractError {}

impl Serialize for ExtractError {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// A fetched listing page: the DOM plus its full text, lowercased.
pub struct ListingPage {
    doc: Html,
    text_lower: String,
}

impl ListingPage {
    pub fn parse(html: &str) -> Self {
        let doc = Html::parse_document(html);
        let text_lower = doc.root_element().text().collect::<String>().to_lowercase();
        Self { doc, text_lower }
    }

    pub fn document(&self) -> &Html { &self.doc }

    pub fn text_lower(&self) -> &str { &self.text_lower }
}

/// Result of aggregating one page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Extraction {
    pub details: DetailsRecord,
    pub issues: Vec<ExtractError>,
    pub trace: Vec<Commit>,
}

impl Extraction {
    /// Some section could not be read, so fields may be missing that the page has.
    pub fn is_partial(&self) -> bool { !self.issues.is_empty() }
}

pub fn aggregate(page: &ListingPage) -> Extraction {
    aggregate_with(page, &ExtractConfig::default())
}

pub fn aggregate_with(page: &ListingPage, cfg: &ExtractConfig) -> Extraction {
    aggregate_using(page, cfg, cascade::CASCADES)
}

fn aggregate_using(page: &ListingPage, cfg: &ExtractConfig, cascades: &[cascade::Cascade]) -> Extraction {
    let mut issues = Vec::new();
    let doc = page.document();

    let summary = evidence::read_summary(doc).unwrap_or_else(|e| caught(&mut issues, e));
    let description = evidence::read_description(doc).unwrap_or_else(|e| caught(&mut issues, e));
    let payloads = evidence::read_payloads(doc).unwrap_or_else(|e| caught(&mut issues, e));

    let ev = evidence::Evidence {
        summary,
        description,
        page_text_lower: page.text_lower(),
        geo: geo::extract_geo(&payloads),
    };

    let mut details = DetailsRecord::default();
    let trace = cascade::resolve_with(cascades, &ev, cfg, &mut details, &mut issues);
    Extraction { details, issues, trace }
}

fn caught<T: Default>(issues: &mut Vec<ExtractError>, e: ExtractError) -> T {
    warn!(error = %e, "page section skipped");
    issues.push(e);
    T::default()
}

/// Parse and aggregate in one go; the DOM is dropped before returning.
pub fn extract_details(html: &str, cfg: &ExtractConfig) -> Extraction {
    let page = ListingPage::parse(html);
    aggregate_with(&page, cfg)
}
