//! get-papers-list - PubMed papers with pharmaceutical/biotech authors
//!
//! ## Usage
//!
//! ```bash
//! get-papers-list "cancer immunotherapy" --file results.csv
//! get-papers-list "crispr AND 2023[dp]" --debug
//! ```
//!
//! Without `--file` the CSV goes to stdout; logs always go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use pubmed_papers::config::PubMedConfig;
use pubmed_papers::fetcher::{PaperFetcher, DEFAULT_MAX_RESULTS};
use pubmed_papers::pubmed::PubMedClient;
use pubmed_papers::report;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Fetch PubMed papers with non-academic authors.
#[derive(Parser)]
#[command(name = "get-papers-list")]
#[command(version, about, long_about = None)]
struct Cli {
    /// PubMed search query
    query: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Output CSV filename (default: stdout)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Maximum number of papers to request from PubMed
    #[arg(short, long, default_value_t = DEFAULT_MAX_RESULTS)]
    max_results: usize,

    /// Contact email sent to NCBI (overrides NCBI_EMAIL)
    #[arg(long)]
    email: Option<String>,

    /// NCBI API key (overrides NCBI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut config = PubMedConfig::from_env();
    if let Some(email) = cli.email {
        config = config.with_email(email);
    }
    if let Some(key) = cli.api_key {
        config = config.with_api_key(key);
    }

    let papers = match PubMedClient::with_config(config) {
        Ok(client) => {
            PaperFetcher::new(client)
                .fetch_papers(&cli.query, cli.max_results)
                .await
        }
        Err(e) => {
            error!(error = %e, "Error fetching papers: PubMed client unavailable");
            Vec::new()
        }
    };

    match cli.file {
        Some(path) => {
            if let Err(e) = report::save_csv(&papers, &path) {
                eprintln!("Error writing to file: {}", e);
                return Ok(ExitCode::FAILURE);
            }
        }
        None => {
            report::write_csv(&papers, std::io::stdout().lock())
                .context("Failed to write CSV to stdout")?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
