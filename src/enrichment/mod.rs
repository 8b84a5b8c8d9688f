use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;

use crate::extraction::ExtractConfig;
use crate::table::Table;
use crate::telemetry::{self};
use crate::telemetry::ops::enrich::Phase as EnrichPhase;

pub mod fetch;
pub mod merge;
pub mod pipeline;
pub mod schema;
mod types;

use fetch::{FetchConfig, HttpFetcher};
use pipeline::{PipelineConfig, process_rows};

#[derive(Args, Debug)]
pub struct EnrichCmd {
    #[arg(long)] pub input: PathBuf,
    #[arg(long)] pub output: PathBuf,
    /// Seconds between successive page fetches (env: LISTINGS_DELAY_MS)
    #[arg(long)] pub delay: Option<f64>,
    /// Per-request timeout in seconds (env: LISTINGS_TIMEOUT_SECS)
    #[arg(long)] pub timeout: Option<u64>,
    #[arg(long)] pub retries: Option<u32>,
    #[arg(long, default_value_t = crate::extraction::DEFAULT_YEAR_MIN)] pub year_min: u16,
    #[arg(long, default_value_t = crate::extraction::DEFAULT_YEAR_MAX)] pub year_max: u16,
    #[arg(long, default_value_t = false)] pub apply: bool,
    #[arg(long, default_value_t = 10)] pub plan_limit: usize,
}

impl EnrichCmd {
    fn fetch_config(&self) -> Result<FetchConfig> {
        let mut cfg = FetchConfig::from_env();
        if let Some(secs) = self.delay { cfg.delay = delay_from_secs(secs)?; }
        if let Some(secs) = self.timeout { cfg.timeout = Duration::from_secs(secs); }
        if let Some(n) = self.retries { cfg.retries = n; }
        Ok(cfg)
    }
}

fn delay_from_secs(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs.max(0.0)).with_context(|| format!("invalid --delay {secs}"))
}

pub async fn run(args: EnrichCmd) -> Result<()> {
    let started = Instant::now();
    let log = telemetry::enrich();
    let _g = log.root_span_kv([
        ("apply", args.apply.to_string()),
        ("input", args.input.display().to_string()),
        ("output", args.output.display().to_string()),
        ("plan_limit", args.plan_limit.to_string()),
    ]).entered();

    let extract = ExtractConfig { year_min: args.year_min, year_max: args.year_max };
    anyhow::ensure!(extract.year_min <= extract.year_max, "--year-min must not exceed --year-max");
    let fetch_cfg = args.fetch_config()?;

    let input = { let _s = log.span(&EnrichPhase::ReadInput).entered(); Table::read(&args.input)? };
    if input.is_empty() { log.warn(format!("{} has no data rows", args.input.display())); }
    let rows = schema::base_rows(&input);
    let with_url: Vec<&str> = rows.iter().map(|r| r.url().trim()).filter(|u| !u.is_empty()).collect();

    if !args.apply {
        if telemetry::config::json_mode() {
            let plan = types::EnrichPlan {
                input: args.input.display().to_string(),
                output: args.output.display().to_string(),
                rows: rows.len(),
                rows_with_url: with_url.len(),
                delay_secs: fetch_cfg.delay.as_secs_f64(),
                year_min: extract.year_min,
                year_max: extract.year_max,
                sample_urls: with_url.iter().take(args.plan_limit).map(|u| u.to_string()).collect(),
            };
            log.plan(&plan)?;
        } else {
            log.info(format!("📝 Enrich plan — rows={} with_url={} delay={:.2}s years={}..={}",
                rows.len(), with_url.len(), fetch_cfg.delay.as_secs_f64(), extract.year_min, extract.year_max));
            for u in with_url.iter().take(args.plan_limit) { log.info(format!("  {}", u)); }
            if with_url.len() > args.plan_limit { log.info(format!("  ... ({} more)", with_url.len() - args.plan_limit)); }
            log.info("   Use --apply to execute.");
        }
        return Ok(());
    }

    let fetcher = HttpFetcher::new(&fetch_cfg).context("build http client")?;
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let cfg = PipelineConfig { delay: fetch_cfg.delay, extract };
    let outcome = process_rows(&fetcher, &rows, &cfg, &cancel).await;
    if outcome.cancelled {
        log.warn(format!("⏹️ interrupted — {} of {} row(s) processed", outcome.rows.len(), rows.len()));
    }

    let totals = outcome.totals();
    log.totals(totals.rows, totals.enriched, totals.partial, totals.failed, totals.skipped);

    let written = if outcome.rows.is_empty() {
        log.warn("no rows produced; output not written");
        None
    } else {
        let _s = log.span_kv(&EnrichPhase::WriteOutput, [("path", args.output.display().to_string())]).entered();
        let table = schema::to_table(outcome.rows);
        table.write(&args.output)?;
        log.info_kv(&format!("💾 wrote {}", args.output.display()), [("rows", table.len().to_string())]);
        Some(args.output.display().to_string())
    };

    if telemetry::config::json_mode() {
        let result = types::EnrichApply { output: written, cancelled: outcome.cancelled, totals, rows: outcome.reports };
        log.result_timed(&result, started)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_flag_bounds() {
        assert_eq!(delay_from_secs(0.25).unwrap(), Duration::from_millis(250));
        assert_eq!(delay_from_secs(-1.0).unwrap(), Duration::ZERO);
        assert!(delay_from_secs(f64::INFINITY).is_err());
        assert!(delay_from_secs(1e30).is_err());
    }
}
