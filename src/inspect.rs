use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::extraction::{self, ExtractConfig, Extraction, Field};
use crate::telemetry::{self};
use crate::telemetry::ops::inspect::Phase as InspectPhase;

#[derive(Args, Debug)]
pub struct InspectCmd {
    /// Saved listing page (HTML)
    pub path: PathBuf,
    #[arg(long, default_value_t = extraction::DEFAULT_YEAR_MIN)] pub year_min: u16,
    #[arg(long, default_value_t = extraction::DEFAULT_YEAR_MAX)] pub year_max: u16,
    /// Also show which strategy resolved each field
    #[arg(long, default_value_t = false)] pub trace: bool,
}

/// entry point for inspect
pub fn run(args: InspectCmd) -> Result<()> {
    let log = telemetry::inspect();
    let _g = log.root_span_kv([("path", args.path.display().to_string())]).entered();

    let html = {
        let _s = log.span(&InspectPhase::Read).entered();
        std::fs::read_to_string(&args.path).with_context(|| format!("read {}", args.path.display()))?
    };
    let cfg = ExtractConfig { year_min: args.year_min, year_max: args.year_max };
    let ex = { let _s = log.span(&InspectPhase::Extract).entered(); extraction::extract_details(&html, &cfg) };

    if telemetry::config::json_mode() {
        log.result(&ex)?;
    } else {
        print_text(&args, &ex);
    }
    Ok(())
}

fn print_text(args: &InspectCmd, ex: &Extraction) {
    println!("🏠 {} — {}/{} fields", args.path.display(), ex.details.resolved_count(), Field::ALL.len());
    for field in Field::ALL {
        let value = ex.details.get(field);
        if value.is_empty() { continue; }
        let shown = if value.chars().count() > 120 { format!("{}…", value.chars().take(120).collect::<String>()) } else { value.to_string() };
        println!("  {}: {}", field.column(), shown);
    }
    if args.trace {
        println!("🔎 Trace:");
        for c in &ex.trace { println!("  {} ← {} ({:?})", c.field, c.strategy, c.source); }
    }
    for issue in &ex.issues { println!("⚠️  {}", issue); }
}
