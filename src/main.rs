//! Garden-Stock main entry point
//!
//! This is the command-line interface for the Garden-Stock scraper service.

use anyhow::Context;
use clap::Parser;
use garden_stock::config::{load_config_with_hash, validate, Config};
use garden_stock::schedule::{AdaptiveScheduler, SchedulePolicy};
use garden_stock::scrape::StockScraper;
use garden_stock::server::{serve, AppState};
use garden_stock::storage::open_shared_storage;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Garden-Stock: an adaptive stock-page scraper
///
/// Garden-Stock scrapes the stock listing page, stores every category as a
/// replaceable snapshot, reschedules itself from the countdowns on the page,
/// and serves the stored stock over HTTP.
#[derive(Parser, Debug)]
#[command(name = "garden-stock")]
#[command(version)]
#[command(about = "An adaptive stock-page scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Port for the read API, overriding the config file
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run a single scrape cycle, print its report and exit
    #[arg(long, conflicts_with = "dry_run")]
    once: bool,

    /// Validate config and show the effective settings without scraping
    #[arg(long, conflicts_with = "once")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => load(path)?,
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.once {
        handle_once(&config).await?;
    } else {
        handle_serve(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("garden_stock=info,warn"),
            1 => EnvFilter::new("garden_stock=debug,info"),
            2 => EnvFilter::new("garden_stock=trace,debug"),
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

fn load(path: &Path) -> anyhow::Result<Config> {
    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Garden-Stock Dry Run ===\n");

    println!("Scraper:");
    println!("  Target URL: {}", config.scraper.target_url);
    println!("  User agent: {}", config.scraper.user_agent);
    println!("  Timeout: {}s", config.scraper.timeout_secs);

    println!("\nSchedule:");
    println!("  Error backoff: {}s", config.schedule.error_backoff_secs);
    println!("  Run on start: {}", config.schedule.run_on_start);

    println!("\nRead API:");
    println!("  Listen: {}:{}", config.server.host, config.server.port);
    println!("  Stock route: {}/stock", config.server.api_prefix);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --once mode: one cycle, report, exit
async fn handle_once(config: &Config) -> anyhow::Result<()> {
    let storage = open_shared_storage(Path::new(&config.output.database_path))?;
    let scraper = StockScraper::new(config.scraper.clone(), storage)?;

    let report = scraper
        .scrape_once()
        .await
        .context("Scrape cycle failed")?;

    println!("=== Scrape Report ===\n");
    println!("Container: {}", report.hypothesis);
    println!("Sections: {}", report.sections_found);
    for (category, count) in &report.item_counts {
        let interval = report
            .next_updates
            .get(category)
            .map(|secs| format!("{}s", secs))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<10} {:>3} items  (updates in {})",
            category.to_db_string(),
            count,
            interval
        );
    }
    println!("\nNext run in {}s", report.next_run.delay_secs);

    Ok(())
}

/// Handles the default mode: scheduled scraping plus the read API
async fn handle_serve(config: Config) -> anyhow::Result<()> {
    let storage = open_shared_storage(Path::new(&config.output.database_path))?;
    tracing::info!("Database ready at {}", config.output.database_path);

    let scraper = StockScraper::new(config.scraper.clone(), storage.clone())?;
    let scheduler = AdaptiveScheduler::new(scraper, SchedulePolicy::from(&config.schedule));
    scheduler.start(config.schedule.run_on_start);

    let state = AppState {
        scheduler: scheduler.clone(),
        storage,
        api_prefix: config.server.api_prefix.clone(),
    };

    let served = serve(&config.server, state).await;
    scheduler.stop();
    served?;

    Ok(())
}
