use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod classify;
mod models;
mod report;
mod store;
mod trend;

#[derive(Parser)]
#[command(name = "kairos-reflection")]
#[command(about = "Daily reflection over behavioral signals for the Kairos persona", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample signal log for trying out the pipeline
    Seed {
        #[arg(long)]
        signals_dir: PathBuf,
    },
    /// Append signals from a CSV file to the log directory
    Import {
        #[arg(long)]
        signals_dir: PathBuf,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print detected dimension trends
    Trends {
        #[arg(long)]
        signals_dir: PathBuf,
        #[arg(long, default_value_t = trend::TREND_WINDOW_DAYS)]
        window: usize,
    },
    /// Generate the daily reflection report
    Report {
        #[arg(long)]
        signals_dir: PathBuf,
        /// Write the report here as well as printing it
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, default_value_t = trend::TREND_WINDOW_DAYS)]
        window: usize,
        /// Header date for the report (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Print the report without writing any files
        #[arg(long)]
        dry_run: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("KAIROS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Seed { signals_dir } => {
            let written = store::seed_signals(&signals_dir)?;
            println!("Wrote {written} sample signals to {}.", signals_dir.display());
        }
        Commands::Import { signals_dir, csv } => {
            let appended = store::import_csv(&signals_dir, &csv)
                .with_context(|| format!("failed to import {}", csv.display()))?;
            println!("Appended {appended} signals from {}.", csv.display());
        }
        Commands::Trends { signals_dir, window } => {
            let Some(loaded) = load_or_report_empty(&signals_dir)? else {
                return Ok(());
            };
            let trends = trend::detect_trends(&loaded.by_date, window);

            if trends.is_empty() {
                println!("No trends detected: no dimension has signals on {window} distinct days yet.");
                return Ok(());
            }

            println!("Detected trends for {} dimensions:", trends.len());
            for (dim, t) in &trends {
                println!(
                    "- {} {} strength {:.2} across {} signals over {} signal-days",
                    dim,
                    report::direction_glyph(t.direction),
                    t.strength,
                    t.total_signals,
                    t.days
                );
            }
        }
        Commands::Report {
            signals_dir,
            out,
            window,
            date,
            dry_run,
        } => {
            let Some(loaded) = load_or_report_empty(&signals_dir)? else {
                return Ok(());
            };
            println!(
                "Loaded {} signals across {} days.",
                loaded.total_signals(),
                loaded.by_date.len()
            );

            let trends = trend::detect_trends(&loaded.by_date, window);
            println!("Detected trends for {} dimensions.", trends.len());
            println!();

            let report_date = date.unwrap_or_else(|| Utc::now().date_naive());
            let rendered = report::build_report(report_date, &loaded.by_date, &trends);
            println!("{rendered}");

            if dry_run {
                println!("Dry run: no files written.");
            } else if let Some(out) = out {
                if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&out, &rendered)
                    .with_context(|| format!("failed to write report to {}", out.display()))?;
                println!("Reflection saved to {}.", out.display());
            }
        }
    }

    Ok(())
}

fn load_or_report_empty(signals_dir: &Path) -> anyhow::Result<Option<models::LoadedSignals>> {
    match store::load_signals(signals_dir) {
        Ok(loaded) => Ok(Some(loaded)),
        Err(store::StoreError::EmptyInput { .. }) => {
            println!("No signals found. Nothing to reflect on.");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}
