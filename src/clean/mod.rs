use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::table::Table;
use crate::telemetry::{self};
use crate::telemetry::ops::clean::Phase as CleanPhase;

mod filter;

pub use filter::{clean_table, default_output_path, CleanOptions, CleanStats};

#[derive(Args, Debug)]
pub struct CleanCmd {
    pub input: PathBuf,
    /// Defaults to `<input stem without _detailed>_cleaned.csv` next to the input
    #[arg(long)] pub output: Option<PathBuf>,
    #[arg(long, default_value_t = 5)] pub min_fields: usize,
    /// Drop rows whose total price asks to enquire ("zapytaj o cenę")
    #[arg(long, default_value_t = false)] pub remove_price_ask: bool,
    #[arg(long, default_value_t = false)] pub apply: bool,
}

#[derive(Serialize)]
struct CleanOut {
    input: String,
    output: String,
    min_fields: usize,
    remove_price_ask: bool,
    stats: CleanStats,
}

pub fn run(args: CleanCmd) -> Result<()> {
    let log = telemetry::clean();
    let _g = log.root_span_kv([
        ("apply", args.apply.to_string()),
        ("input", args.input.display().to_string()),
        ("min_fields", args.min_fields.to_string()),
        ("remove_price_ask", args.remove_price_ask.to_string()),
    ]).entered();

    if !args.input.exists() {
        anyhow::bail!("input file {} does not exist", args.input.display());
    }
    let output = args.output.clone().unwrap_or_else(|| default_output_path(&args.input));
    let opts = CleanOptions { min_fields: args.min_fields, remove_price_ask: args.remove_price_ask };

    let table = { let _s = log.span(&CleanPhase::ReadInput).entered(); Table::read(&args.input)? };
    let (cleaned, stats) = {
        let _s = log.span(&CleanPhase::Filter).entered();
        clean_table(&table, &opts).with_context(|| format!("clean {}", args.input.display()))?
    };

    log.info(format!("📝 Clean {} — rows={} min_fields={}", if args.apply { "apply" } else { "plan" }, stats.initial, opts.min_fields));
    log.removed("sparse", stats.sparse);
    log.removed("no_location", stats.no_location);
    if opts.remove_price_ask { log.removed("price_ask", stats.price_ask); }
    log.removed("duplicates", stats.duplicates);
    if stats.initial > 0 {
        log.info(format!("   kept={} removed={} ({:.1}%)", stats.kept, stats.removed(), stats.removed() as f64 * 100.0 / stats.initial as f64));
    }

    if args.apply {
        let _s = log.span_kv(&CleanPhase::WriteOutput, [("path", output.display().to_string())]).entered();
        cleaned.write(&output)?;
        log.info(format!("💾 wrote {}", output.display()));
    } else if !telemetry::config::json_mode() {
        log.info(format!("   Would write {}. Use --apply to execute.", output.display()));
    }

    if telemetry::config::json_mode() {
        let out = CleanOut {
            input: args.input.display().to_string(),
            output: output.display().to_string(),
            min_fields: opts.min_fields,
            remove_price_ask: opts.remove_price_ask,
            stats,
        };
        if args.apply { log.result(&out)?; } else { log.plan(&out)?; }
    }
    Ok(())
}
