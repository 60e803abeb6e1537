use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Args;
use log::{LevelFilter, error, info, warn};

use projector::load_config;
use projector::runner::{ConfigRunner, format_duration, resolve_base_dir};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Config file and/or base directory, told apart by what exists on disk
    paths: Vec<PathBuf>,

    /// Path to config file (auto-detected if not specified)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory project paths are resolved against (defaults to the current directory)
    #[arg(short, long)]
    base_dir: Option<PathBuf>,

    /// Print the plan without running anything
    #[arg(long)]
    dry: bool,

    /// Only run these top-level projects, in the given order
    #[arg(short, long = "project", value_name = "NAME")]
    projects: Vec<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Log file path (receives every log record in addition to stdout)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Split bare path arguments into a config file and a base directory.
/// Explicit `--config` / `--base-dir` flags win.
fn classify_paths(args: &RunArgs) -> (Option<PathBuf>, Option<PathBuf>) {
    let mut config = args.config.clone();
    let mut base_dir = args.base_dir.clone();
    for path in &args.paths {
        if path.is_file() {
            config.get_or_insert_with(|| path.clone());
        } else if path.is_dir() {
            base_dir.get_or_insert_with(|| path.clone());
        } else {
            warn!("Ignoring argument {}: no such file or directory", path.display());
        }
    }
    (config, base_dir)
}

/// Plan and execute the workspace config.
///
/// # Errors
///
/// Returns an error if logging, config loading or planning fails.
pub async fn run(args: RunArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let start = Instant::now();

    let log_file = args.log_file.as_ref().map(File::create).transpose()?;
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    projector::logger::init(level, log_file)?;

    info!("PROJECTOR{}", if args.dry { ": DRY RUN" } else { "" });

    let (config_path, base_dir) = classify_paths(&args);
    let (config, config_path) = load_config(config_path.as_deref())?;
    info!("Loaded Config: {}", config_path.display());

    let base_dir = resolve_base_dir(base_dir.as_deref())?;
    info!("Base Directory: {}", base_dir.display());

    let mut runner = ConfigRunner::new(&config, base_dir, args.dry).with_roots(args.projects);
    let report = runner.run().await?;

    if report.succeeded() {
        info!("{}", report.summary());
    } else {
        error!("{}", report.summary());
    }
    info!("Total Runtime: {}", format_duration(start.elapsed()));

    Ok(exit_code(report.exit_code()))
}

fn exit_code(code: i32) -> ExitCode {
    if code == 0 {
        return ExitCode::SUCCESS;
    }
    u8::try_from(code)
        .ok()
        .filter(|c| *c != 0)
        .map_or(ExitCode::FAILURE, ExitCode::from)
}
