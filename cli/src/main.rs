//! jobstat - percentile analytics over job performance datasets.
//!
//! Usage: jobstat [--config PATH] [--json] <summary|series|snapshot|matrix> --data FILE ...
//!
//! Output: a text table on stdout, or the engine payload as JSON with `--json`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::EnvFilter;

use jobstat_core::config::load_or_default;

mod commands;
mod render;

use commands::{FilterArgs, RenderOptions};

#[derive(Parser)]
#[command(version, about = "Percentile analytics for job performance datasets")]
struct Cli {
    /// Engine config TOML (defaults to the user config dir, then built-ins)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print the raw payload as JSON
    #[arg(long, global = true)]
    json: bool,
    /// Use `,` as the decimal separator in text output
    #[arg(long, global = true)]
    european: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List raids, bosses, jobs and dates present in a dataset; with
    /// filters, dates are narrowed to the matching rows
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Daily series per job at one percentile, gaps filled
    Series {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(short, long)]
        percentile: u32,
        #[arg(long)]
        hps: bool,
        /// Halve values of composite pair identities
        #[arg(long)]
        halve_pairs: bool,
    },
    /// Percentile distribution for one date
    Snapshot {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        include_extremes: bool,
        #[arg(long)]
        hps: bool,
        /// Match composite job selections by their parts
        #[arg(long)]
        expand: bool,
    },
    /// Pairwise percentile gap matrices
    Matrix {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long = "date")]
        dates: Vec<String>,
        #[arg(long)]
        hps: bool,
    },
}

/// Initialize logging, writing to JOBSTAT_LOG_PATH if set, otherwise stderr.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var("JOBSTAT_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .init();
            return;
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), String> {
    init_logging();

    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref()).map_err(|e| e.to_string())?;
    let render = RenderOptions {
        json: cli.json,
        european: cli.european,
    };

    let output = match &cli.command {
        Commands::Summary { filters } => commands::summary(filters, render)?,
        Commands::Series {
            filters,
            percentile,
            hps,
            halve_pairs,
        } => commands::series(filters, *percentile, *hps, *halve_pairs, &config, render)?,
        Commands::Snapshot {
            filters,
            date,
            include_extremes,
            hps,
            expand,
        } => commands::snapshot(
            filters,
            date.as_deref(),
            *include_extremes,
            *hps,
            *expand,
            &config,
            render,
        )?,
        Commands::Matrix {
            filters,
            dates,
            hps,
        } => commands::matrix(filters, dates, *hps, config, render)?,
    };

    println!("{output}");
    Ok(())
}
