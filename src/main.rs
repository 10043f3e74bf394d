//! Frontier-Spider main entry point
//!
//! This is the command-line interface for the Frontier-Spider domain crawler.

use anyhow::Context;
use clap::Parser;
use frontier_spider::config::{load_config, Config};
use frontier_spider::crawler::run_crawl;
use frontier_spider::dataset::Dataset;
use frontier_spider::frontier::{open_frontier, Frontier};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Frontier-Spider: a restartable multi-worker domain crawler
///
/// Frontier-Spider crawls one site with a pool of workers sharing a persistent
/// frontier. Any number of processes can crawl the same frontier at once, and an
/// interrupted crawl picks up where it stopped.
#[derive(Parser, Debug)]
#[command(name = "frontier-spider")]
#[command(version)]
#[command(about = "A restartable multi-worker domain crawler", long_about = None)]
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

    /// Wipe the frontier before seeding and crawling
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "clear", "export"])]
    fresh: bool,

    /// Validate config and show the frontier state without crawling
    #[arg(long, conflicts_with_all = ["stats", "clear", "export"])]
    dry_run: bool,

    /// Show frontier and dataset statistics, including every pending and crawled URL
    #[arg(long, conflicts_with_all = ["dry_run", "clear", "export"])]
    stats: bool,

    /// Wipe the frontier and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "export"])]
    clear: bool,

    /// Export the dataset as JSON Lines to PATH and exit
    #[arg(long, value_name = "PATH", conflicts_with_all = ["dry_run", "stats", "clear"])]
    export: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.clear {
        handle_clear(&config)?;
    } else if let Some(path) = &cli.export {
        handle_export(&config, path)?;
    } else {
        handle_crawl(config, cli.fresh).await?;
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
            0 => EnvFilter::new("frontier_spider=info,warn"),
            1 => EnvFilter::new("frontier_spider=debug,info"),
            2 => EnvFilter::new("frontier_spider=trace,debug"),
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

fn open_stores(config: &Config) -> anyhow::Result<(frontier_spider::SqliteFrontier, Dataset)> {
    let frontier = open_frontier(&config.frontier).with_context(|| {
        format!(
            "failed to open frontier at {}",
            config.frontier.database_path.display()
        )
    })?;
    let dataset = Dataset::open(&config.output.data_path).with_context(|| {
        format!(
            "failed to open dataset at {}",
            config.output.data_path.display()
        )
    })?;
    Ok((frontier, dataset))
}

/// Handles the --dry-run mode: validates config and shows the frontier state
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Frontier-Spider Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Start URL: {}", config.crawler.start_url);
    println!(
        "  Site domain: {}",
        frontier_spider::site_of_url(&config.crawler.start_url)?
    );
    println!("  Workers: {}", config.crawler.number_of_threads);
    println!("  Local queue capacity: {}", config.crawler.queue_capacity);
    println!("  Poll interval: {}ms", config.crawler.poll_interval_ms);
    println!("  Excluded suffixes: {:?}", config.crawler.excluded_suffixes);

    println!("\nExtractor:");
    println!("  User agent: {}", config.extractor.user_agent);
    println!("  Timeout: {}s", config.extractor.timeout_secs);
    println!("  Skip words: {}", config.extractor.skip_words.len());
    println!("  Filter categories ({}):", config.extractor.filters.len());
    for filter in &config.extractor.filters {
        println!("    - {} ({} keywords)", filter.category, filter.keywords.len());
    }

    println!("\nStores:");
    println!("  Frontier: {}", config.frontier.database_path.display());
    println!("  Dataset: {}", config.output.data_path.display());

    let (frontier, dataset) = open_stores(config)?;
    println!("\nCurrent State:");
    println!("  Pending: {}", frontier.pending_count()?);
    println!("  Crawled: {}", frontier.crawled_count()?);
    println!("  Stored: {}", dataset.len()?);

    println!("\n✓ Configuration is valid");
    if frontier.pending_count()? == 0 && frontier.crawled_count()? == 0 {
        println!("✓ Would seed the frontier with {}", config.crawler.start_url);
    }

    Ok(())
}

/// Handles the --stats mode: shows frontier and dataset statistics
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use frontier_spider::output::{load_statistics, print_statistics};

    println!("Frontier: {}", config.frontier.database_path.display());
    println!("Dataset: {}\n", config.output.data_path.display());

    let (frontier, dataset) = open_stores(config)?;
    let stats = load_statistics(&frontier, &dataset)?;
    print_statistics(&stats, true);

    Ok(())
}

/// Handles the --clear mode: wipes the frontier
fn handle_clear(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let (frontier, _) = open_stores(config)?;
    frontier.clear()?;

    tracing::info!("Frontier cleared");
    println!(
        "✓ Cleared frontier at {}",
        config.frontier.database_path.display()
    );
    Ok(())
}

/// Handles the --export mode: writes the dataset as JSON Lines
fn handle_export(config: &Config, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    use frontier_spider::output::export_jsonl;

    let (_, dataset) = open_stores(config)?;
    let count = export_jsonl(&dataset, path)?;

    println!("✓ Exported {} records to: {}", count, path.display());
    Ok(())
}

/// Resolves on Ctrl-C; never resolves if the signal handler cannot be installed
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::warn!("Ctrl-C received, stopping after in-flight pages"),
        Err(e) => {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool) -> Result<(), Box<dyn std::error::Error>> {
    if fresh {
        tracing::info!("Starting fresh crawl (clearing frontier)");
        let (frontier, _) = open_stores(&config)?;
        frontier.clear()?;
    } else {
        tracing::info!("Starting crawl (resuming any pending frontier)");
    }

    tracing::info!(
        "Start URL: {}, workers: {}",
        config.crawler.start_url,
        config.crawler.number_of_threads
    );

    // Run the crawler
    match run_crawl(&config, shutdown_signal()).await {
        Ok(summary) => {
            tracing::info!(
                "Crawl completed: {} batches, {} URLs dispatched{}",
                summary.batches,
                summary.dispatched,
                if summary.interrupted { " (interrupted)" } else { "" }
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
