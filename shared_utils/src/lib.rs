//! Shared Utilities for optimize-image-dir
//!
//! - Unified error type
//! - Logging (tracing, rolling log file)
//! - External process execution
//! - Progress event contract and nested terminal progress bar
//! - Extension/path helpers
//! - Safety checks (dangerous directory detection)
//! - Batch summary and reporting

pub mod app_error;
pub mod batch;
pub mod common_utils;
pub mod logging;
pub mod process;
pub mod progress;
pub mod report;
pub mod safety;

pub use app_error::{AppError, Result};
pub use batch::BatchSummary;
pub use common_utils::{
    get_extension_lowercase, has_extension, replace_extension, IMAGE_EXTENSIONS,
};
pub use process::{find_missing_tools, format_command_line, CommandRunner, SystemRunner};
pub use progress::{
    render_child_bar, NestedProgressBar, NoopProgress, ProgressFrame, ProgressSink,
};
pub use report::{format_bytes, format_duration, print_summary_report, summary_json};
pub use safety::check_dangerous_directory;
