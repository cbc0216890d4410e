//! Sumi-Gather main entry point
//!
//! This is the command-line interface for the Sumi-Gather page harvester.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use sumi_gather::browser::open_all;
use sumi_gather::config::{load_config_or_default, validate, Config};
use sumi_gather::extract::ExtractionMode;
use sumi_gather::harvest::{BatchCoordinator, BatchReport};
use sumi_gather::report::{export, ExportDocument, ExportFormat};
use sumi_gather::{RegistryError, UrlRegistry};
use tracing_subscriber::EnvFilter;

/// Sumi-Gather: fetch pages concurrently and extract their content
///
/// Sumi-Gather fetches every given URL once, extracts one kind of content
/// from each page, and prints a combined report in the order the URLs were
/// given. Failed pages are reported inline without stopping the others.
#[derive(Parser, Debug)]
#[command(name = "sumi-gather")]
#[command(version = "1.0.0")]
#[command(about = "Concurrent multi-page content harvester", long_about = None)]
struct Cli {
    /// URLs to fetch; `https://` is assumed when no scheme is given
    #[arg(value_name = "URL", required = true)]
    urls: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Content to extract (defaults to the configured mode)
    #[arg(short, long, value_enum)]
    mode: Option<ExtractionMode>,

    /// Maximum number of pages fetched at the same time
    #[arg(short = 'j', long, value_name = "N")]
    concurrency: Option<usize>,

    /// Export the combined report as a text file
    #[arg(long, value_name = "PATH")]
    txt: Option<PathBuf>,

    /// Export the results as a PDF document
    #[arg(long, value_name = "PATH")]
    pdf: Option<PathBuf>,

    /// Also open every URL in the default browser
    #[arg(long)]
    open: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(&cli)?;
    let mode = cli.mode.unwrap_or(config.extraction.default_mode);

    let registry = Arc::new(UrlRegistry::new());
    register_urls(&registry, &cli.urls);
    if registry.is_empty() {
        anyhow::bail!("No URLs to fetch");
    }

    if cli.open {
        handle_open(&registry.urls());
    }

    let report = handle_batch(&config, Arc::clone(&registry), mode).await?;

    if !cli.quiet {
        println!("{}", report.report);
    }

    handle_exports(&cli, &config, &report)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_gather=info,warn"),
            1 => EnvFilter::new("sumi_gather=debug,info"),
            2 => EnvFilter::new("sumi_gather=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration file (if any) and applies command-line overrides
fn load_configuration(cli: &Cli) -> anyhow::Result<Config> {
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }

    let mut config =
        load_config_or_default(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(concurrency) = cli.concurrency {
        config.fetcher.max_concurrent_fetches = concurrency;
        validate(&config).context("Invalid --concurrency")?;
    }

    Ok(config)
}

/// Adds every command-line URL to the registry, reporting rejected input
fn register_urls(registry: &UrlRegistry, urls: &[String]) {
    for raw in urls {
        match registry.add_url(raw) {
            Ok(url) => tracing::debug!("Added {}", url),
            Err(RegistryError::AlreadyExists(url)) => {
                tracing::warn!("This URL is already in the list: {}", url)
            }
            Err(e) => tracing::warn!("Skipping {:?}: {}", raw, e),
        }
    }
}

/// Handles --open: launches every URL in the browser
fn handle_open(urls: &[String]) {
    let opened = open_all(urls)
        .iter()
        .filter(|(_, result)| result.is_ok())
        .count();
    tracing::info!("Opened {} of {} URLs in browser", opened, urls.len());
}

/// Runs the batch, logging progress until it finishes or Ctrl-C cancels it
async fn handle_batch(
    config: &Config,
    registry: Arc<UrlRegistry>,
    mode: ExtractionMode,
) -> anyhow::Result<BatchReport> {
    let urls = registry.urls();
    tracing::info!("Fetching data from {} URLs ({} mode)...", urls.len(), mode);

    let coordinator = BatchCoordinator::new(&config.fetcher, registry)?;
    let mut handle = coordinator.submit(urls, mode);

    loop {
        tokio::select! {
            event = handle.next_event() => match event {
                Some(event) if event.phase.is_terminal() => tracing::info!("{}", event),
                Some(event) => tracing::debug!("{}", event),
                None => break,
            },
            _ = tokio::signal::ctrl_c(), if !handle.cancellation_token().is_cancelled() => {
                tracing::warn!("Interrupt received, cancelling remaining fetches");
                handle.cancel();
            }
        }
    }

    let report = handle.finish().await?;
    let summary = report.summary;
    tracing::info!(
        "Fetched {} URLs: {} succeeded, {} failed, {} cancelled",
        summary.total,
        summary.succeeded,
        summary.failed,
        summary.cancelled
    );

    Ok(report)
}

/// Handles --txt and --pdf; a failed export does not affect the other
///
/// Returns an error naming every failed export once both were attempted.
fn handle_exports(cli: &Cli, config: &Config, report: &BatchReport) -> anyhow::Result<()> {
    let requested = [
        (ExportFormat::Text, cli.txt.as_ref()),
        (ExportFormat::Pdf, cli.pdf.as_ref()),
    ];
    if requested.iter().all(|(_, path)| path.is_none()) {
        return Ok(());
    }

    let document = ExportDocument::from_entries(&report.entries);
    let mut failed = Vec::new();

    for (format, path) in requested {
        let Some(path) = path else {
            continue;
        };
        match export(&document, format, path, &config.export) {
            Ok(()) => tracing::info!("All results exported to {}", path.display()),
            Err(e) => {
                tracing::error!("Failed to export {}: {}", path.display(), e);
                failed.push(path.display().to_string());
            }
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("Export failed for {}", failed.join(", "));
    }
    Ok(())
}
