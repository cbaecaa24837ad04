//! fsacct - high-throughput parallel filesystem accounting tool
//!
//! A worker-pool-based replacement for ad-hoc `du`/`find` pipelines on very
//! large directory trees.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use fsacct::config::WalkConfig;
use fsacct::format::parse_size_with_unit;
use fsacct::output::{print_report, OutputConfig};
use fsacct::users::UserTable;
use fsacct::{traverse, EngineOptions};

/// Account for files and bytes across one or more directory trees.
#[derive(Parser, Debug)]
#[command(name = "fsacct")]
#[command(author = "FsAcct Contributors")]
#[command(version)]
#[command(about = "Walk directory trees in parallel and report file/byte counts", long_about = None)]
struct Args {
    /// Directory trees to account for
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Maximum depth of directories to report (unlimited by default)
    #[arg(short = 'd', long = "max-depth", default_value_t = usize::MAX)]
    max_depth: usize,

    /// Suppress directories with fewer than this many files (accepts unit
    /// suffixes, e.g. "2K")
    #[arg(short = 'n', long = "file-limit", default_value = "0")]
    file_limit: String,

    /// Suppress directories with fewer than this many bytes (accepts unit
    /// suffixes, e.g. "10M")
    #[arg(short = 'k', long = "size-limit", default_value = "0")]
    size_limit: String,

    /// Regex of paths to exclude entirely, anchored to the end of the path
    #[arg(long = "exclude")]
    exclude: Option<String>,

    /// Regex of paths to credit; directories that don't match are still
    /// traversed but not themselves counted
    #[arg(long = "include")]
    include: Option<String>,

    /// Report each directory's direct contents only, without rolling
    /// subtree totals up to ancestors
    #[arg(long = "exclude-subdirs")]
    exclude_subdirs: bool,

    /// Suppress the report header
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Break down counts by owning user
    #[arg(short = 'u', long = "user")]
    user: bool,

    /// Render sizes as human-readable (e.g. "4.5 G") instead of raw bytes
    #[arg(long = "human-readable")]
    human_readable: bool,

    /// Print a progress line to stderr every N seconds
    #[arg(short = 's', long = "status")]
    status: Option<u64>,

    /// Number of worker threads
    #[arg(short = 'w', long = "workers", default_value_t = 8)]
    workers: usize,

    /// Enable verbose (info-level) logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Enable debug-level logging
    #[arg(long = "debug")]
    debug: bool,
}

fn main() {
    let exit_code = match run() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    process::exit(exit_code);
}

fn run() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;
    log::debug!("starting fsacct with args: {:?}", args);

    let file_limit = parse_size_with_unit(&args.file_limit)
        .with_context(|| format!("invalid --file-limit value `{}`", args.file_limit))?;
    let size_limit = parse_size_with_unit(&args.size_limit)
        .with_context(|| format!("invalid --size-limit value `{}`", args.size_limit))?;

    let (exclude, include) = WalkConfig::compile(args.exclude.as_deref(), args.include.as_deref())
        .context("failed to compile --exclude/--include pattern")?;

    let config = Arc::new(WalkConfig {
        max_depth: args.max_depth,
        file_limit,
        size_limit,
        exclude,
        include,
        exclude_subdirs: args.exclude_subdirs,
        per_user: args.user,
    });

    let options = EngineOptions {
        num_workers: args.workers.max(1),
        status_interval: args.status.map(Duration::from_secs),
    };

    log::info!("accounting for {} path(s) with {} workers", args.paths.len(), options.num_workers);

    let (mut store, roots) = traverse(&args.paths, Arc::clone(&config), &options)?;

    let users = UserTable::load();
    let rows = store.aggregate(&roots, &config, &users);

    let output_config = OutputConfig {
        human_readable: args.human_readable,
        per_user: args.user,
        quiet: args.quiet,
    };
    print_report(&rows, &output_config);

    log::info!("accounting complete: {} row(s) reported", rows.len());

    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .format_module_path(false)
        .init();

    Ok(())
}
