//! Listing-Courier main entry point
//!
//! This is the command-line interface for the Listing-Courier listing crawler.

use anyhow::Context;
use clap::Parser;
use listing_courier::config::{load_config_with_hash, Config};
use listing_courier::model::{LoginSpec, PaginationType};
use listing_courier::{DeliveryMedium, MediumConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Listing-Courier: a paginated listing crawler
///
/// Listing-Courier logs into a listing site, walks its index pages, visits every
/// listing's detail page and writes the results as batches of JSON files.
#[derive(Parser, Debug)]
#[command(name = "listing-courier")]
#[command(version = "1.0.0")]
#[command(about = "A paginated listing crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write batches here instead of the configured data path
    #[arg(long, value_name = "DIR")]
    data_path: Option<PathBuf>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(data_path) = cli.data_path {
        config.medium.data_path = data_path;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_courier=info,warn"),
            1 => EnvFilter::new("listing_courier=debug,info"),
            2 => EnvFilter::new("listing_courier=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Listing-Courier Dry Run ===\n");

    println!("Medium:");
    println!("  Kind: {}", config.medium.kind);
    println!("  Pagination: {}", config.medium.pagination_type);
    if config.medium.pagination_type == PaginationType::Url {
        if let Some(template) = &config.medium.pagination_url_template {
            println!("  URL template: {}", template);
        }
    }
    match config.medium.flush_after {
        Some(flush_after) => println!("  Flush after: {} artifacts", flush_after),
        None => println!("  Flush after: end of crawl"),
    }
    println!("  Data path: {}", config.medium.data_path.display());

    println!("\nLogin:");
    println!("  URL: {}", config.login.url());
    match &config.login {
        LoginSpec::Form(form) => println!("  Method: {}", form.method),
        LoginSpec::Credentials(login) => println!("  User: {}", login.credentials.user),
    }

    println!("\nCrawl:");
    println!("  First index page: {}", config.crawl.first_index_url);
    println!("  Listings: {}", config.crawl.selectors.listings);
    if let Some(next_page) = &config.crawl.selectors.next_page {
        println!("  Next page: {}", next_page);
    }
    match config.crawl.stop_after {
        Some(pages) => println!("  Stop after: {} index pages", pages),
        None => println!("  Stop after: when listings run out"),
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let medium_config = MediumConfig::from_settings(&config.medium);
    let mut medium = DeliveryMedium::create(&config.medium.kind, medium_config)
        .await
        .context("failed to create delivery medium")?;

    let outcome = run_medium(&mut medium, &config).await;

    // Always release the transport, even after a failed login or crawl
    if let Err(e) = medium.destroy().await {
        tracing::error!("Failed to destroy delivery medium: {}", e);
    }

    let report = outcome?;
    println!(
        "Crawl {}: {} index pages, {} artifacts, {} batches written to {}",
        report.termination,
        report.pages_visited,
        report.artifacts_collected,
        report.batches_written,
        config.medium.data_path.display()
    );

    if !report.is_success() {
        anyhow::bail!("crawl ended early: {}", report.termination);
    }
    Ok(())
}

async fn run_medium(
    medium: &mut DeliveryMedium,
    config: &Config,
) -> anyhow::Result<listing_courier::CrawlReport> {
    medium.login(&config.login).await.context("login failed")?;
    let report = medium
        .scrape_index_pages(&config.crawl)
        .await
        .context("crawl could not run")?;
    Ok(report)
}
