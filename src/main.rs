mod clock;
mod derive;
mod oem;
mod query;
mod refresh;
mod series;
#[cfg(test)]
mod test_support;
mod web;

use clap::{Parser, Subcommand};
use std::fs;
use std::process::ExitCode;
use std::sync::Arc;

use crate::clock::SystemClock;
use crate::oem::{format_epoch, parse_oem};
use crate::refresh::{HttpFeedSource, RefreshOutcome, Refresher};
use crate::series::{MemoryStore, SeriesStore, TimeSeries};
use crate::web::Config;

#[derive(Parser)]
#[command(name = "iss-tracker")]
#[command(about = "International Space Station trajectory service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API with periodic feed refresh
    Serve {
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Parse a local OEM file and summarize it
    Validate { file: String },
    /// Fetch and parse the configured feed once
    Fetch {
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(config.as_deref()).await,
        Commands::Validate { file } => validate(&file),
        Commands::Fetch { config } => fetch(config.as_deref()).await,
    }
}

fn load_config(path: Option<&str>) -> Option<Config> {
    match Config::load(path) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            None
        }
    }
}

async fn serve(config_path: Option<&str>) -> ExitCode {
    let Some(config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };

    match web::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn validate(path: &str) -> ExitCode {
    let raw = match fs::read(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match parse_oem(&raw) {
        Ok(vectors) => {
            let parsed = vectors.len();
            let series = TimeSeries::new(vectors);
            println!("Feed is valid ({} state vectors)", series.len());
            if parsed != series.len() {
                println!(
                    "  {} duplicate epochs replaced by later entries",
                    parsed - series.len()
                );
            }
            print_span(&series);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Parse error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn fetch(config_path: Option<&str>) -> ExitCode {
    let Some(config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };

    let source = match HttpFeedSource::new(config.feed.timeout) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let store = Arc::new(SeriesStore::new(Arc::new(MemoryStore::new())));
    let refresher = Refresher::new(
        source,
        config.feed.url.clone(),
        store.clone(),
        Arc::new(SystemClock),
    );

    match refresher.refresh().await {
        RefreshOutcome::Completed { vectors } => {
            println!("Fetched {} state vectors from {}", vectors, config.feed.url);
            print_span(&store.snapshot());
            ExitCode::SUCCESS
        }
        RefreshOutcome::Failed { message } => {
            eprintln!("Refresh failed: {}", message);
            ExitCode::FAILURE
        }
        RefreshOutcome::Skipped => ExitCode::FAILURE,
    }
}

fn print_span(series: &TimeSeries) {
    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        println!(
            "  {} .. {}",
            format_epoch(&first.epoch),
            format_epoch(&last.epoch)
        );
    }
}
