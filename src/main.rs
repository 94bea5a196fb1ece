//! rustpubmed - PubMed papers with industry-affiliated authors
//!
//! Searches PubMed, fetches each matching article, flags authors whose
//! affiliation looks commercial, and writes a CSV summary.
//!
//! ## Usage
//!
//! ### Online
//! ```bash
//! rustpubmed search "biotechnology AND pharmaceutical" --max 20 --file papers.csv
//! ```
//!
//! ### Offline, from a saved efetch document
//! ```bash
//! rustpubmed extract pubmed.xml
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rustpubmed::config::ClientConfig;
use rustpubmed::extractor::{OutputRow, RecordExtractor};
use rustpubmed::pipeline::{self, PipelineReport};
use rustpubmed::pubmed::PubMedClient;
use rustpubmed::sink::{save_csv, write_csv, SaveOutcome};
use rustpubmed::source::XmlFileSource;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Fetch PubMed papers and flag authors with commercial affiliations
#[derive(Parser)]
#[command(name = "rustpubmed")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search PubMed and summarise the results
    Search {
        /// PubMed query (full PubMed syntax)
        #[arg(default_value = "biotechnology AND pharmaceutical")]
        query: String,

        /// Maximum number of papers to fetch
        #[arg(long, default_value = "5")]
        max: usize,

        /// CSV output file (prints to stdout when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// NCBI API key (raises the request rate limit)
        #[arg(long, env = "NCBI_API_KEY")]
        api_key: Option<String>,

        /// Contact email sent to NCBI
        #[arg(long, env = "NCBI_EMAIL")]
        email: Option<String>,

        /// Minimum delay between requests in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// E-utilities base URL
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Summarise articles from a saved efetch XML file
    Extract {
        /// PubmedArticleSet XML file
        xml: PathBuf,

        /// Maximum number of articles to process
        #[arg(long)]
        max: Option<usize>,

        /// CSV output file (prints to stdout when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so CSV on stdout stays clean
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search {
            query,
            max,
            file,
            api_key,
            email,
            delay_ms,
            base_url,
        } => {
            let mut config = ClientConfig::with_api_key(api_key);
            config.email = email;
            if let Some(ms) = delay_ms {
                config.request_interval = Duration::from_millis(ms);
            }
            if let Some(url) = base_url {
                config.base_url = url;
            }
            run_search(&query, max, config, file.as_deref()).await
        }
        Commands::Extract { xml, max, file } => run_extract(&xml, max, file.as_deref()).await,
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn run_search(
    query: &str,
    max: usize,
    config: ClientConfig,
    file: Option<&Path>,
) -> Result<()> {
    info!(query = query, max = max, "Searching PubMed");
    let client = PubMedClient::new(config).context("Failed to create PubMed client")?;
    let extractor = RecordExtractor::default();

    let report = pipeline::run(&client, &extractor, query, max)
        .await
        .context("PubMed search failed")?;

    summarize(&report);
    emit(&report.rows, file)
}

async fn run_extract(xml: &Path, max: Option<usize>, file: Option<&Path>) -> Result<()> {
    let source = XmlFileSource::open(xml)
        .with_context(|| format!("Failed to load {}", xml.display()))?;
    let extractor = RecordExtractor::default();

    let report = pipeline::run(&source, &extractor, "", max.unwrap_or(source.len()))
        .await
        .context("Failed to read records")?;

    summarize(&report);
    emit(&report.rows, file)
}

fn summarize(report: &PipelineReport) {
    eprintln!("Fetched paper IDs: {:?}", report.ids);
    if !report.failed.is_empty() {
        eprintln!("Skipped {} record(s): {:?}", report.failed.len(), report.failed);
    }
}

/// Write rows to `file`, or to stdout
fn emit(rows: &[OutputRow], file: Option<&Path>) -> Result<()> {
    let outcome = match file {
        Some(path) => save_csv(path, rows)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => write_csv(std::io::stdout().lock(), rows)
            .context("Failed to write CSV to stdout")?,
    };

    match (outcome, file) {
        (SaveOutcome::NothingToSave, _) => eprintln!("No data to save."),
        (SaveOutcome::Saved(n), Some(path)) => {
            eprintln!("✓ Saved {} papers to {}", n, path.display())
        }
        (SaveOutcome::Saved(_), None) => {}
    }

    Ok(())
}
