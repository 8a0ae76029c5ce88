//! Directory walker
//!
//! Depth-first, strictly sequential, in the order the directory listing
//! returns entries (no sorting). Per level:
//!
//! 1. list entries and announce the count (`on_start`)
//! 2. for each entry: recurse into directories, optimize image candidates,
//!    skip everything else
//! 3. tick once per entry (`on_tick`), whatever the entry was
//!
//! The first error stops the walk: no later sibling or ancestor entry is
//! touched.

use crate::artifacts::is_image_candidate;
use crate::conversion::{ImageOptimizer, OptimizeOptions};
use shared_utils::{
    AppError, BatchSummary, CommandRunner, NoopProgress, ProgressFrame, ProgressSink, Result,
};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

static NOOP_PROGRESS: NoopProgress = NoopProgress;

/// Written by a child level on every tick, read by its parent on the parent's tick.
type ChildStatus = Cell<Option<ProgressFrame>>;

pub struct DirectoryWalker<'p, R: CommandRunner> {
    optimizer: ImageOptimizer<R>,
    progress: &'p dyn ProgressSink,
}

impl<R: CommandRunner> DirectoryWalker<'static, R> {
    /// Walker that reports no progress.
    pub fn new(runner: R, options: OptimizeOptions) -> Self {
        Self {
            optimizer: ImageOptimizer::new(runner, options),
            progress: &NOOP_PROGRESS,
        }
    }
}

impl<'p, R: CommandRunner> DirectoryWalker<'p, R> {
    pub fn with_progress<'q>(self, progress: &'q dyn ProgressSink) -> DirectoryWalker<'q, R> {
        DirectoryWalker {
            optimizer: self.optimizer,
            progress,
        }
    }

    pub fn walk(&self, root: &Path) -> Result<BatchSummary> {
        info!(root = %root.display(), "Walking directory tree");
        let summary = self.walk_level(root, 0, None)?;
        info!(
            root = %root.display(),
            entries = summary.entries,
            optimized = summary.optimized,
            skipped = summary.skipped,
            "Walk complete"
        );
        Ok(summary)
    }

    fn walk_level(
        &self,
        dir: &Path,
        depth: usize,
        parent_status: Option<&ChildStatus>,
    ) -> Result<BatchSummary> {
        let entries = list_entries(dir)?;
        let total = entries.len();
        debug!(dir = %dir.display(), depth, total, "Listed directory");
        self.progress.on_start(depth, total);

        let child_status: ChildStatus = Cell::new(None);
        let mut summary = BatchSummary::new();

        for (index, path) in entries.iter().enumerate() {
            if path.is_dir() {
                child_status.set(None);
                let child = self.walk_level(path, depth + 1, Some(&child_status))?;
                summary.record_directory();
                summary.merge(&child);
            } else if is_image_candidate(path) {
                let outcome = self.optimizer.optimize(path).map_err(|e| {
                    debug!(path = %path.display(), error = %e, "Image failed; aborting walk");
                    e.at_path(path)
                })?;
                summary.record_image(
                    outcome.kind.is_greyscale(),
                    outcome.input_bytes,
                    outcome.output_bytes,
                );
            } else {
                debug!(path = %path.display(), "Skipping non-image file");
                summary.record_skip();
            }

            let frame = ProgressFrame::new(index, total);
            if let Some(status) = parent_status {
                status.set(Some(frame));
            }
            self.progress.on_tick(depth, frame, child_status.get());
        }

        Ok(summary)
    }
}

/// Immediate children of `dir`, in listing order.
fn list_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .map(|entry| {
            entry
                .map(|e| e.into_path())
                .map_err(|e| AppError::filesystem(dir, "list", e.into()))
        })
        .collect()
}
