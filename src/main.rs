//! Weaver main entry point
//!
//! This is the command-line interface for the Weaver link checker.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use weaver::config::{load_config_with_hash, Config};
use weaver::output::{print_summary, CrawlSummary};
use weaver::{Checker, RunOutcome};

/// Weaver: a site-scoped link checker
///
/// Weaver crawls every page reachable from a URL on the same site, checks
/// each link it finds exactly once, and reports the broken ones. The request
/// rate backs off when a server answers 429 and recovers gradually.
#[derive(Parser, Debug)]
#[command(name = "weaver")]
#[command(version = "1.0.0")]
#[command(about = "A site-scoped link checker", long_about = None)]
struct Cli {
    /// URL of the first page to check
    #[arg(value_name = "URL")]
    url: String,

    /// Print every result and rate change (-v); add debug logs (-vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress log output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Ceiling on requests per second
    #[arg(long, value_name = "R")]
    max_rate: Option<f64>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with status 1 if any link is broken
    #[arg(long)]
    fail_on_error: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = load(&cli)?;

    let mut checker = Checker::new(&config).context("Failed to set up checker")?;
    checker.set_verbose(cli.verbose > 0);

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let started = Instant::now();
    let outcome = checker.check(&cli.url, &cancel).await;
    let elapsed = started.elapsed();

    let cancelled = outcome == RunOutcome::Cancelled;
    if cancelled {
        tracing::warn!("Interrupted; summarizing partial results");
    }

    let summary = CrawlSummary::from_results(checker.results(), elapsed);
    print_summary(&summary, checker.results(), cancelled);

    if cli.fail_on_error && summary.has_errors() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so result lines on stdout stay clean.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 | 1 => EnvFilter::new("weaver=info,warn"),
            2 => EnvFilter::new("weaver=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (if any) and applies command-line overrides
fn load(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(rate) = cli.max_rate {
        config.checker.max_rate = rate;
    }
    if let Some(timeout) = cli.timeout {
        config.checker.request_timeout_secs = timeout;
    }

    Ok(config)
}

/// Cancels the run on Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received Ctrl-C, stopping");
                cancel.cancel();
            }
            Err(e) => tracing::warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });
}
