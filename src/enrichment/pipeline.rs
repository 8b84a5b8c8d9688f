use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::extraction::{self, ExtractConfig, Extraction};
use crate::telemetry::{self};
use crate::telemetry::ops::enrich::Phase as EnrichPhase;

use super::fetch::PageFetcher;
use super::merge::{degraded, merge};
use super::schema::{BaseRow, CombinedRow};
use super::types::EnrichTotals;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Enriched,
    Partial,
    Failed,
    Skipped,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Enriched => "enriched",
            RowStatus::Partial => "partial",
            RowStatus::Failed => "failed",
            RowStatus::Skipped => "skipped",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RowReport {
    pub position: usize,
    pub url: String,
    pub status: RowStatus,
    pub resolved: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PipelineConfig {
    /// Pause before every fetch except the first.
    pub delay: Duration,
    pub extract: ExtractConfig,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub rows: Vec<CombinedRow>,
    pub reports: Vec<RowReport>,
    /// Stopped before every input row was processed.
    pub cancelled: bool,
}

impl BatchOutcome {
    pub fn totals(&self) -> EnrichTotals {
        let count = |s: RowStatus| self.reports.iter().filter(|r| r.status == s).count();
        EnrichTotals {
            rows: self.rows.len(),
            enriched: count(RowStatus::Enriched),
            partial: count(RowStatus::Partial),
            failed: count(RowStatus::Failed),
            skipped: count(RowStatus::Skipped),
        }
    }
}

/// Enrich `rows` one at a time, in input order. Every processed input row
/// yields exactly one output row; failures degrade to base-only rows.
pub async fn process_rows(
    fetcher: &dyn PageFetcher,
    rows: &[BaseRow],
    cfg: &PipelineConfig,
    cancel: &CancellationToken,
) -> BatchOutcome {
    let log = telemetry::enrich();
    let total = rows.len();
    let mut out = BatchOutcome::default();
    let mut fetched_any = false;

    for (idx, base) in rows.iter().enumerate() {
        let position = idx + 1;
        if cancel.is_cancelled() {
            out.cancelled = true;
            break;
        }

        let url = base.url().trim();
        if url.is_empty() {
            log.warn_kv("↩️ skip", [("position", position.to_string()), ("reason", "no-url".to_string())]);
            push(&mut out, degraded(base), RowReport { position, url: String::new(), status: RowStatus::Skipped, resolved: 0, error: None });
            continue;
        }

        if fetched_any && !cfg.delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => { out.cancelled = true; break; }
                _ = tokio::time::sleep(cfg.delay) => {}
            }
        }
        fetched_any = true;

        let fetched = fetcher
            .fetch(url)
            .instrument(log.span_kv(&EnrichPhase::Fetch, [("url", url.to_string())]))
            .await;
        let html = match fetched {
            Ok(html) => html,
            Err(e) => {
                log.warn_kv("⚠️ fetch failed", [("url", url.to_string()), ("error", e.to_string())]);
                let report = RowReport { position, url: url.to_string(), status: RowStatus::Failed, resolved: 0, error: Some(e.to_string()) };
                log.row_done(position, total, url, report.status.as_str(), 0);
                push(&mut out, degraded(base), report);
                continue;
            }
        };

        let extracted = {
            let _s = log.span(&EnrichPhase::Extract).entered();
            panic::catch_unwind(AssertUnwindSafe(|| extraction::extract_details(&html, &cfg.extract)))
        };
        let (row, report) = match extracted {
            Ok(ex) => {
                let _s = log.span(&EnrichPhase::Merge).entered();
                let status = row_status(&ex);
                let error = if ex.issues.is_empty() {
                    None
                } else {
                    Some(ex.issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))
                };
                let resolved = ex.details.resolved_count();
                (merge(base, &ex.details), RowReport { position, url: url.to_string(), status, resolved, error })
            }
            Err(_) => {
                log.warn_kv("⚠️ extraction aborted", [("url", url.to_string())]);
                let report = RowReport { position, url: url.to_string(), status: RowStatus::Failed, resolved: 0, error: Some("extraction aborted".to_string()) };
                (degraded(base), report)
            }
        };
        log.row_done(position, total, url, report.status.as_str(), report.resolved);
        push(&mut out, row, report);
    }

    out
}

/// Fields that did resolve are kept either way; issues only downgrade the status.
fn row_status(ex: &Extraction) -> RowStatus {
    if ex.is_partial() { RowStatus::Partial } else { RowStatus::Enriched }
}

fn push(out: &mut BatchOutcome, row: CombinedRow, report: RowReport) {
    out.rows.push(row);
    out.reports.push(report);
}
