use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

mod clean;
mod enrichment;
mod extraction;
mod inspect;
mod output;
mod table;
mod telemetry;

#[derive(Parser)]
#[command(name = "listings", about = "Real-estate listing detail extraction CLI")]
struct Cli {
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every listing page of a base CSV and write the detailed CSV
    Enrich(enrichment::EnrichCmd),
    /// Drop sparse, location-less and duplicate rows from a CSV
    Clean(clean::CleanCmd),
    /// Run the extractor over one saved listing page
    Inspect(inspect::InspectCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // initialize logging/tracing (stderr). Respect RUST_LOG and LISTINGS_LOG_FORMAT
    telemetry::config::init_tracing();

    match cli.command {
        Commands::Enrich(args) => enrichment::run(args).await?,
        Commands::Clean(args) => clean::run(args)?,
        Commands::Inspect(args) => inspect::run(args)?,
    }

    Ok(())
}
