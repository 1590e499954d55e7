//! Citegraph main entry point
//!
//! This is the command-line interface for the citegraph citation crawler.

use anyhow::{bail, Context};
use citegraph::config::{load_config_or_default, validate, Config};
use citegraph::crawler::build_crawler;
use citegraph::output::{dump_publications, load_statistics, print_statistics};
use citegraph::storage::open_storage;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Citegraph: a resumable citation-graph crawler
///
/// Citegraph looks up an author, lists their publications, and follows
/// "cited by" links outward layer by layer. Every publication and author
/// it finds is written to disk once; pending work is checkpointed so an
/// interrupted crawl picks up where it stopped.
#[derive(Parser, Debug)]
#[command(name = "citegraph")]
#[command(version)]
#[command(about = "A resumable citation-graph crawler", long_about = None)]
struct Cli {
    /// Name of the seed author to crawl from
    #[arg(value_name = "AUTHOR", required_unless_present_any = ["stats", "dump"])]
    author: Option<String>,

    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Discard any checkpoint before crawling (stored records are kept)
    #[arg(long, conflicts_with_all = ["stats", "dump"])]
    fresh: bool,

    /// Show statistics from the store and exit
    #[arg(long, conflicts_with = "dump")]
    stats: bool,

    /// Print every stored publication as a JSON line and exit
    #[arg(long, conflicts_with = "stats")]
    dump: bool,

    /// Maximum citing works followed per publication (0 for no limit)
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Directory for author records
    #[arg(long, value_name = "DIR")]
    authors_dir: Option<String>,

    /// Directory for publication records
    #[arg(long, value_name = "DIR")]
    publications_dir: Option<String>,

    /// Path of the frontier checkpoint file
    #[arg(long, value_name = "FILE")]
    checkpoint: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {:#}", e);
            return Err(e);
        }
    };

    // Handle different modes
    if cli.stats {
        handle_stats(&config)
    } else if cli.dump {
        handle_dump(&config)
    } else {
        match cli.author.as_deref() {
            Some(author) => handle_crawl(&config, author, cli.fresh).await,
            None => bail!("an AUTHOR is required unless --stats or --dump is given"),
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("citegraph=info,warn"),
            1 => EnvFilter::new("citegraph=debug,info"),
            2 => EnvFilter::new("citegraph=trace,debug"),
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

/// Loads the configuration file (if any) and applies command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let mut config = load_config_or_default(cli.config.as_deref())
        .context("could not load configuration")?;

    if let Some(limit) = cli.limit {
        config.crawler.citations_per_publication_limit = limit;
    }
    if let Some(dir) = &cli.authors_dir {
        config.storage.authors_dir = dir.clone();
    }
    if let Some(dir) = &cli.publications_dir {
        config.storage.publications_dir = dir.clone();
    }
    if let Some(path) = &cli.checkpoint {
        config.storage.checkpoint_path = path.clone();
    }

    validate(&config).context("invalid configuration after command-line overrides")?;
    Ok(config)
}

/// Handles the --stats mode: shows statistics from the store
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Authors: {}", config.storage.authors_dir);
    println!("Publications: {}", config.storage.publications_dir);
    println!("Checkpoint: {}\n", config.storage.checkpoint_path);

    let fingerprint = config.fingerprint()?;
    let (store, checkpoint) = open_storage(&config.storage, &fingerprint);

    let stats = load_statistics(&store, &checkpoint).context("could not read the store")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --dump mode: prints stored publications as JSON lines
fn handle_dump(config: &Config) -> anyhow::Result<()> {
    let fingerprint = config.fingerprint()?;
    let (store, _checkpoint) = open_storage(&config.storage, &fingerprint);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let count = dump_publications(&store, &mut out).context("could not dump publications")?;
    tracing::info!("Dumped {} publication records", count);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, author: &str, fresh: bool) -> anyhow::Result<()> {
    let crawler = build_crawler(config).context("could not set up the crawler")?;

    if fresh {
        tracing::info!("Starting fresh crawl (discarding any checkpoint)");
        crawler.checkpoint().clear()?;
    } else if crawler.checkpoint().exists()? {
        tracing::info!(
            "Checkpoint found at {}, resuming",
            crawler.checkpoint().path().display()
        );
    }

    tracing::info!(
        "Crawling from '{}' (citation limit: {})",
        author,
        config.crawler.citations_per_publication_limit
    );

    tokio::select! {
        result = crawler.run(author) => match result {
            Ok(summary) => {
                tracing::info!("Crawl completed successfully: {}", summary);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Crawl failed: {}", e);
                if crawler.checkpoint().exists().unwrap_or(false) {
                    tracing::error!(
                        "Pending work kept in {}; rerun to resume",
                        crawler.checkpoint().path().display()
                    );
                }
                Err(e.into())
            }
        },
        signal = tokio::signal::ctrl_c() => {
            signal.context("could not listen for interrupt")?;
            tracing::warn!(
                "Interrupted; checkpoint preserved at {}",
                crawler.checkpoint().path().display()
            );
            bail!("crawl interrupted")
        }
    }
}
