mod config;
mod extract;
mod fetcher;
mod pipeline;
mod pmcids;
mod store;
mod throttle;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use tracing::info;

use config::Settings;
use extract::TableExtractor;
use fetcher::HttpFetcher;
use pipeline::Pipeline;
use throttle::Throttle;

#[derive(Parser)]
#[command(
    name = "pmc_coords",
    about = "Download PMC articles and extract stereotactic coordinates from their tables"
)]
struct Cli {
    /// File with one PMCID per line, without the PMC prefix
    pmcids_file: PathBuf,
    /// Directory for downloaded pages and coordinate files (created if missing)
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::new(cli.pmcids_file, cli.output_dir);

    let ids = pmcids::read_pmcids(&settings.pmcids_file)?;
    let fetcher = HttpFetcher::new(&settings)?;
    let throttle = Throttle::new(settings.min_delay, settings.mean_delay)?;

    let mut pipeline = Pipeline::new(fetcher, TableExtractor, throttle, &settings.url_template)
        .with_progress(true);
    let summary = pipeline.run(&ids, &settings.output_dir)?;

    info!(
        "Done: {} PMCIDs ({} ok, {} errors), {} coordinates from {} articles in {}",
        summary.total,
        summary.ok,
        summary.errors,
        summary.coordinates,
        summary.articles,
        elapsed_label(t0.elapsed())
    );
    println!("{}", summary.merged.display());
    Ok(())
}

/// Wall-clock label for the final log line: "8.4s" or "12m05s".
fn elapsed_label(d: Duration) -> String {
    let total = d.as_secs();
    match (total / 60, total % 60) {
        (0, _) => format!("{:.1}s", d.as_secs_f64()),
        (mins, secs) => format!("{mins}m{secs:02}s"),
    }
}
