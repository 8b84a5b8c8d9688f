use scraper::{ElementRef, Html, Selector};

use super::ExtractError;
use super::normalize::normalize;
use super::rules::{self, SummaryLabel, SUMMARY_LABELS};

/// Everything the cascades read, gathered from one page up front.
/// Sections that could not be read are `None`.
#[derive(Debug, Default)]
pub struct Evidence<'a> {
    pub summary: Option<Summary>,
    pub description: Option<Description>,
    pub page_text_lower: &'a str,
    pub geo: (String, String),
}

/// Header block: city/district line, street line, labelled summary rows.
#[derive(Debug, Default, Clone)]
pub struct Summary {
    pub city: Option<String>,
    pub street: Option<String>,
    pub rows: Vec<SummaryRow>,
}

#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub label: String,
    pub value: Option<String>,
}

impl SummaryRow {
    pub fn kind(&self) -> Option<SummaryLabel> {
        SUMMARY_LABELS
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| self.label.contains(n)))
            .map(|(kind, _)| *kind)
    }
}

impl Summary {
    /// Values of rows labelled `kind`, in document order.
    pub fn values(&self, kind: SummaryLabel) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .filter(move |r| r.kind() == Some(kind))
            .filter_map(|r| r.value.as_deref())
    }
}

/// Description block: prose plus the raw text of its bullet items.
#[derive(Debug, Default, Clone)]
pub struct Description {
    pub text: Option<String>,
    pub items: Vec<String>,
}

pub fn selector(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector { css, reason: format!("{e:?}") })
}

fn text_of(el: ElementRef<'_>) -> String {
    normalize(&el.text().collect::<String>())
}

pub fn read_summary(doc: &Html) -> Result<Option<Summary>, ExtractError> {
    let container_sel = selector(rules::SUMMARY_CONTAINER)?;
    let Some(container) = doc.select(&container_sel).next() else { return Ok(None) };

    let city_sel = selector(rules::SUMMARY_CITY)?;
    let street_sel = selector(rules::SUMMARY_STREET)?;
    let row_sel = selector(rules::SUMMARY_ROWS)?;
    let value_sel = selector(rules::SUMMARY_VALUE)?;

    let rows = container
        .select(&row_sel)
        .map(|row| SummaryRow {
            label: text_of(row),
            value: row.select(&value_sel).next().map(text_of),
        })
        .collect();

    Ok(Some(Summary {
        city: container.select(&city_sel).next().map(text_of),
        street: container.select(&street_sel).next().map(text_of),
        rows,
    }))
}

pub fn read_description(doc: &Html) -> Result<Option<Description>, ExtractError> {
    let container_sel = selector(rules::DESCRIPTION_CONTAINER)?;
    let Some(container) = doc.select(&container_sel).next() else { return Ok(None) };

    let text_sel = selector(rules::DESCRIPTION_TEXT)?;
    let items_sel = selector(rules::DESCRIPTION_ITEMS)?;

    // anchors contribute their text nodes, so links collapse to anchor text
    let text = container.select(&text_sel).next().map(text_of);
    let items = container
        .select(&items_sel)
        .map(|li| li.text().collect::<String>())
        .collect();

    Ok(Some(Description { text, items }))
}

pub fn read_payloads(doc: &Html) -> Result<Vec<String>, ExtractError> {
    let sel = selector(rules::STRUCTURED_PAYLOADS)?;
    Ok(doc
        .select(&sel)
        .map(|s| s.text().collect::<String>())
        .filter(|s| !s.trim().is_empty())
        .collect())
}
