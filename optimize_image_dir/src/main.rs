use anyhow::Context;
use clap::{CommandFactory, Parser};
use console::style;
use optimize_image_dir::{BatchSummary, OptimizeOptions, Result, REQUIRED_TOOLS};
use shared_utils::logging::{init_logging, LogConfig};
use shared_utils::{
    check_dangerous_directory, find_missing_tools, print_summary_report, summary_json,
    NestedProgressBar,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn, Level};

const PROGRAM_NAME: &str = "optimize_image_dir";

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "optimize-image-dir")]
#[command(
    version,
    about = "Recursively optimize scanned images for e-readers",
    long_about = "Walks a directory tree and rewrites every PNG/JPEG/GIF in place: \
                  greyscale scans become 17-color quantized PNGs, color images become \
                  quality-80 JPEGs. Requires ImageMagick `convert`, `pngquant` and \
                  `jpegoptim` on PATH."
)]
struct Cli {
    /// Root directory to optimize (modified in place)
    #[arg(value_name = "DIRECTORY")]
    directory: Option<PathBuf>,

    /// Extra contrast/gamma pass on greyscale images
    #[arg(long)]
    lighten: bool,

    /// Keep color images as quantized PNG instead of converting to JPEG
    #[arg(long)]
    color_png: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Log file directory (default: system temp dir)
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Number of log files kept in the log directory
    #[arg(long, value_name = "N", default_value_t = 5)]
    max_log_files: usize,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let root = match resolve_root(cli.directory.as_deref()) {
        Ok(root) => root,
        Err(code) => std::process::exit(code),
    };

    let mut log_config = LogConfig::default().with_max_files(cli.max_log_files);
    if let Some(dir) = &cli.log_dir {
        log_config = log_config.with_log_dir(dir);
    }
    if cli.verbose {
        log_config = log_config.with_level(Level::DEBUG);
    }
    init_logging(PROGRAM_NAME, log_config).context("failed to initialize logging")?;

    let missing = find_missing_tools(REQUIRED_TOOLS);
    if !missing.is_empty() {
        warn!(tools = ?missing, "Required tools not found on PATH");
    }

    let options = OptimizeOptions {
        lighten: cli.lighten,
        color_png: cli.color_png,
    };
    info!(root = %root.display(), ?options, "Starting optimization");

    let progress = if cli.no_progress || cli.json {
        NestedProgressBar::hidden()
    } else {
        NestedProgressBar::new()
    };

    let start = Instant::now();
    let result = optimize_image_dir::walk(&root, options, &progress);
    progress.finish();

    let code = report_walk(result, &root, start.elapsed(), cli.json);
    if code != EXIT_SUCCESS {
        std::process::exit(code);
    }
    Ok(())
}

/// Absolute root to walk, or the exit code to stop with.
fn resolve_root(directory: Option<&Path>) -> std::result::Result<PathBuf, i32> {
    let Some(directory) = directory else {
        eprintln!("{}", style("No directory path provided; aborting.").red());
        eprintln!();
        eprintln!("{}", Cli::command().render_usage());
        return Err(EXIT_FAILURE);
    };

    let root = match std::path::absolute(directory) {
        Ok(root) => root,
        Err(e) => {
            eprintln!(
                "{}",
                style(format!("❌ Cannot resolve {}: {}", directory.display(), e)).red()
            );
            return Err(EXIT_FAILURE);
        }
    };

    if let Err(e) = check_dangerous_directory(&root) {
        eprintln!("{}", style(e.user_message()).red());
        return Err(EXIT_FAILURE);
    }

    Ok(root)
}

/// Print the result of a walk and pick the exit code. A failure is printed
/// once here; the log file gets it at info level so it does not reach stderr twice.
fn report_walk(result: Result<BatchSummary>, root: &Path, duration: Duration, json: bool) -> i32 {
    match result {
        Ok(summary) => {
            if !json {
                print_summary_report(&summary, duration);
                return EXIT_SUCCESS;
            }
            match summary_json(&summary, root, duration) {
                Ok(report) => {
                    println!("{}", report);
                    EXIT_SUCCESS
                }
                Err(e) => {
                    eprintln!("{}", style(format!("❌ Failed to render summary: {}", e)).red());
                    EXIT_FAILURE
                }
            }
        }
        Err(e) => {
            info!(error = %e, "Optimization aborted");
            eprintln!("{}", style(e.user_message()).red());
            EXIT_FAILURE
        }
    }
}
