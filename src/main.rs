#![forbid(unsafe_code)]
//! # cdp_reasons CLI
//!
//! Runs one `(year, region, number)` request against the CDP open-data
//! snapshots and prints the frequency view, the bigram network, or both.
//!
//! ## Example
//! ```bash
//! cargo run --release -- both --year 2018 --region "Latin America" --number 10 --export-format csv
//! ```
//!
//! Use `--data-dir` to read `<dataset>.csv` snapshots from disk instead of
//! fetching them. See `--help` for all available options.

use std::path::PathBuf;
use std::process;

use cdp_reasons::export::{render_frequency_txt, render_network_txt};
use cdp_reasons::source::DEFAULT_BASE_URL;
use cdp_reasons::{
    DataSource, DirectorySource, ExportFormat, HttpSource, PipelineConfig, RegionFilter, Result,
    build_frequency_view, build_network_view, export_frequency, export_network,
};
use clap::{Parser, ValueEnum};
use log::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum View {
    Frequency,
    Network,
    Both,
}

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Which view to build
    view: View,

    /// Disclosure year (2013-2020)
    #[arg(long, default_value_t = 2017)]
    year: u16,

    /// CDP region, or "All regions"
    #[arg(long, default_value = "All regions")]
    region: String,

    /// Number of top words / word pairs to keep
    #[arg(long, default_value_t = 13)]
    number: usize,

    /// Output format for export (txt, csv, tsv, json); txt only prints
    #[arg(long, default_value = "txt")]
    export_format: ExportFormat,

    /// Directory for exported files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Read snapshots from <DATA_DIR>/<dataset>.csv instead of fetching them
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Base URL of the open-data API
    #[arg(long, env = "CDP_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Maximum number of rows requested per dataset
    #[arg(long)]
    limit: Option<u32>,

    /// Seed for the network layout
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        error!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let region: RegionFilter = cli.region.parse()?;

    let mut config = PipelineConfig {
        base_url: cli.base_url.clone(),
        row_limit: cli.limit,
        ..PipelineConfig::default()
    };
    if let Some(seed) = cli.seed {
        config.layout.seed = seed;
    }

    let source: Box<dyn DataSource> = match &cli.data_dir {
        Some(dir) => Box::new(DirectorySource::new(dir)),
        None => Box::new(HttpSource::new(&config.base_url, config.row_limit)?),
    };
    let stem = export_stem(cli.year, region);

    if matches!(cli.view, View::Frequency | View::Both) {
        let view = build_frequency_view(source.as_ref(), &config, cli.year, region, cli.number)?;
        println!("Word frequencies - {} / {}", cli.year, region);
        println!("{}", render_frequency_txt(&view));
        if cli.export_format != ExportFormat::Txt {
            export_frequency(&view, cli.export_format, &cli.out_dir, &stem)?;
        }
    }

    if matches!(cli.view, View::Network | View::Both) {
        let view = build_network_view(source.as_ref(), &config, cli.year, region, cli.number)?;
        println!("Bigram network - {} / {}", cli.year, region);
        println!("{}", render_network_txt(&view));
        if cli.export_format != ExportFormat::Txt {
            export_network(&view, cli.export_format, &cli.out_dir, &stem)?;
        }
    }

    Ok(())
}

/// `2018_latin_america`, `2017_all_regions`
fn export_stem(year: u16, region: RegionFilter) -> String {
    let slug: String = region
        .to_string()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!("{year}_{slug}")
}
