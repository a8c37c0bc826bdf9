//! Tranco unique-domain collector CLI
//!
//! Downloads every daily Tranco list of the year so far and writes the
//! sorted set of unique domains to `tranco_unique_domains_<YEAR>.txt`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::Log;
use tranco_uniques::{
    error::Result,
    models::{Config, DayKey, FetchResult, RunWindow},
    pipeline::{self, FetchProgress, RunOptions},
    services::{DayFetcher, TrancoClient},
    storage::{ListCache, LocalStorage},
    utils::backoff::RetryPolicy,
};

/// Collect unique domains from daily Tranco Top-1M lists
#[derive(Parser, Debug)]
#[command(name = "tranco-uniques", version, about)]
struct Cli {
    /// Path to the TOML configuration file (missing file = defaults)
    #[arg(short, long, default_value = "tranco.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors, no progress bar
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch every day of the window and write the snapshot
    Run {
        /// Start date YYYY-MM-DD, inclusive (default: January 1 of the end year)
        #[arg(short, long)]
        start: Option<String>,

        /// End date YYYY-MM-DD, inclusive (default: today, UTC)
        #[arg(short, long)]
        end: Option<String>,

        /// Output file (default: tranco_unique_domains_<YEAR>.txt)
        #[arg(short, long)]
        outfile: Option<PathBuf>,

        /// Parallel workers (overrides config and TR_DOWNLOAD_WORKERS)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Do not read or write the local list cache
        #[arg(long)]
        no_cache: bool,

        /// Write a JSON run summary next to the snapshot
        #[arg(long)]
        summary: bool,
    },

    /// Compare a snapshot with the last published one
    Diff {
        /// Published baseline (plain or .gz)
        #[arg(long, default_value = "current.txt.gz")]
        baseline: PathBuf,

        /// Freshly written snapshot
        #[arg(long)]
        snapshot: PathBuf,

        /// Date used in the commit message (default: today, UTC)
        #[arg(long)]
        date: Option<String>,
    },

    /// Validate the configuration file
    Validate,
}

/// Renders coordinator progress as a terminal bar.
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new(multi: &MultiProgress, total: usize, hidden: bool) -> Self {
        if hidden {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} days ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");

        let bar = multi.add(ProgressBar::new(total as u64));
        bar.set_style(style);
        Self { bar }
    }
}

impl FetchProgress for BarProgress {
    fn day_settled(&self, done: usize, _total: usize, result: &FetchResult) {
        self.bar.set_position(done as u64);
        self.bar.set_message(result.day.to_string());
    }
}

/// env_logger output that clears progress bars before each line is written.
struct BarAwareLogger {
    inner: env_logger::Logger,
    multi: MultiProgress,
}

impl Log for BarAwareLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.inner.matches(record) {
            self.multi.suspend(|| self.inner.log(record));
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

fn build_logger(verbose: bool, quiet: bool, configured: &str, multi: MultiProgress) -> BarAwareLogger {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        configured
    };
    let inner = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .build();
    BarAwareLogger { inner, multi }
}

/// Initialize logging based on verbosity flags and the configured level.
///
/// Returns the progress container log lines are interleaved with.
fn init_logging(verbose: bool, quiet: bool, configured: &str) -> MultiProgress {
    let multi = MultiProgress::new();
    let logger = build_logger(verbose, quiet, configured, multi.clone());
    let filter = logger.inner.filter();
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(filter);
    }
    multi
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            init_logging(cli.verbose, cli.quiet, "info");
            log::error!("Failed to load {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let multi = init_logging(cli.verbose, cli.quiet, &config.logging.level);

    match dispatch(cli, config, &multi).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli, mut config: Config, multi: &MultiProgress) -> Result<()> {
    // Read the clock exactly once per invocation.
    let today = Utc::now().date_naive();

    match cli.command {
        Command::Run {
            start,
            end,
            outfile,
            workers,
            no_cache,
            summary,
        } => {
            let start = start.as_deref().map(DayKey::parse).transpose()?;
            let end = end.as_deref().map(DayKey::parse).transpose()?;
            let window = RunWindow::resolve(today, start, end)?;

            config.fetch.workers = config.effective_workers(workers)?;
            if no_cache {
                config.cache.enabled = false;
            }
            config.validate()?;

            let source = Arc::new(TrancoClient::from_config(&config.source)?);
            let mut fetcher = DayFetcher::new(source, RetryPolicy::from(&config.fetch));
            if config.cache.enabled {
                log::info!("Using list cache at {}", config.cache.dir.display());
                fetcher = fetcher.with_cache(ListCache::new(&config.cache.dir));
            }

            let storage = LocalStorage::new(&config.output.dir);
            let mut options = RunOptions::for_window(&window, config.fetch.workers);
            if let Some(path) = outfile {
                options.snapshot_key = path;
            }
            if summary || config.output.write_summary {
                options = options.with_summary_beside_snapshot();
            }

            let progress = BarProgress::new(multi, window.day_count(), cli.quiet);
            let outcome =
                pipeline::run_uniques(&window, &fetcher, &storage, &options, &progress).await;
            progress.bar.finish_and_clear();

            let summary = outcome?;
            println!("Total unique domains: {}", summary.domain_count);
            println!("Saved to: {}", summary.snapshot_path.display());
        }

        Command::Diff {
            baseline,
            snapshot,
            date,
        } => {
            let day = match date {
                Some(raw) => DayKey::parse(&raw)?,
                None => DayKey::new(today),
            };

            let storage = LocalStorage::new(".");
            let diff = pipeline::diff_snapshots(&storage, &baseline, &snapshot).await?;

            log::info!(
                "Diff: {} added, {} removed, {} total",
                diff.added,
                diff.removed,
                diff.total
            );
            println!("added={}", diff.added);
            println!("removed={}", diff.removed);
            println!("total={}", diff.total);
            println!("changed={}", diff.has_changes());
            println!("message={}", diff.commit_message(day));
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK ({} workers)", config.fetch.workers);
        }
    }

    Ok(())
}
