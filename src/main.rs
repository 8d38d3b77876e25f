//! Sitebound main entry point
//!
//! Command-line front end for the crawl engine: starts one session,
//! streams its events to stdout, and prints a summary when the session
//! reaches a terminal state. Ctrl-C requests a stop and waits for the
//! in-flight fetches to drain.

use clap::Parser;
use sitebound::config::{load_config, EngineConfig};
use sitebound::events::CrawlEvent;
use sitebound::session::{SessionSnapshot, SessionStatus, SessionStore};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitebound: a single-site breadth-first crawler
///
/// Crawls every page of one website reachable from the seed URL, never
/// following links that leave the seed's host.
#[derive(Parser, Debug)]
#[command(name = "sitebound")]
#[command(version)]
#[command(about = "A single-site breadth-first crawler", long_about = None)]
struct Cli {
    /// Seed URL; bare hostnames are completed (e.g. "example.com")
    #[arg(value_name = "SEED")]
    seed: String,

    /// Maximum number of concurrent page fetches
    #[arg(long, value_name = "N")]
    max_concurrent: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Optional TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    if let Some(n) = cli.max_concurrent {
        config.max_concurrent = n;
    }
    if let Some(secs) = cli.timeout {
        config.fetch_timeout_secs = secs;
    }
    config.validate()?;

    let store = SessionStore::new(config)?;
    let id = match store.start_crawl(&cli.seed, None) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!(
                "Please provide a valid URL (e.g. example.com, www.example.com, \
                 or https://example.com)"
            );
            std::process::exit(1);
        }
    };

    println!("Starting crawl of: {}", store.snapshot(id)?.seed);

    let mut events = store.events(id)?;
    let mut stop_requested = false;
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => print_event(&event),
                None => break,
            },
            _ = tokio::signal::ctrl_c(), if !stop_requested => {
                eprintln!("\nStop requested, waiting for in-flight fetches...");
                stop_requested = true;
                let _ = store.stop(id);
            }
        }
    }

    let snapshot = store.snapshot(id)?;
    print_summary(&snapshot);

    if snapshot.status == SessionStatus::Failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitebound=info,warn"),
            1 => EnvFilter::new("sitebound=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_event(event: &CrawlEvent) {
    match event {
        CrawlEvent::PageFetched { url, links } => {
            println!("\nPage: {url}");
            let mut sorted = links.clone();
            sorted.sort();
            for link in sorted {
                println!("  - {link}");
            }
        }
        CrawlEvent::PageError { url, kind, message } => {
            println!("\nError fetching {url}: {kind}: {message}");
        }
        CrawlEvent::SessionStart { .. } | CrawlEvent::SessionEnd { .. } => {}
    }
}

fn print_summary(snapshot: &SessionSnapshot) {
    println!("\nCrawl Summary:");
    println!("Status: {}", snapshot.status);
    println!("Elapsed Time: {:.2} seconds", snapshot.elapsed_secs);
    println!("Pages Crawled: {}", snapshot.pages_crawled);
    println!("Links Found: {}", snapshot.links_found);
    println!("Errors: {}", snapshot.error_count);
}
