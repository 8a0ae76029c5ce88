pub mod artifacts;
pub mod classifier;
pub mod conversion;
pub mod tools;
pub mod walker;

#[cfg(test)]
mod test_support;

pub use artifacts::{is_image_candidate, ArtifactChain};
pub use classifier::{classify, is_greyscale, parse_saturation, ImageKind, SATURATION_THRESHOLD};
pub use conversion::{ImageOptimizer, OptimizeOptions, OptimizeOutcome, Workflow};
pub use tools::REQUIRED_TOOLS;
pub use walker::DirectoryWalker;

pub use shared_utils::{AppError, BatchSummary, Result};

use shared_utils::{ProgressSink, SystemRunner};
use std::path::Path;

/// Walk `dir` with the system tools, reporting to `progress`.
pub fn walk(dir: &Path, options: OptimizeOptions, progress: &dyn ProgressSink) -> Result<BatchSummary> {
    DirectoryWalker::new(SystemRunner::new(), options)
        .with_progress(progress)
        .walk(dir)
}
