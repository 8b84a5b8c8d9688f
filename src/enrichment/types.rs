use serde::Serialize;

use super::pipeline::RowReport;

// Plan envelope types
#[derive(Serialize)]
pub struct EnrichPlan {
    pub input: String,
    pub output: String,
    pub rows: usize,
    pub rows_with_url: usize,
    pub delay_secs: f64,
    pub year_min: u16,
    pub year_max: u16,
    pub sample_urls: Vec<String>,
}

// Apply/result envelope types
#[derive(Serialize, Debug, Default, PartialEq, Eq)]
pub struct EnrichTotals { pub rows: usize, pub enriched: usize, pub partial: usize, pub failed: usize, pub skipped: usize }

#[derive(Serialize)]
pub struct EnrichApply {
    pub output: Option<String>,
    pub cancelled: bool,
    pub totals: EnrichTotals,
    pub rows: Vec<RowReport>,
}
