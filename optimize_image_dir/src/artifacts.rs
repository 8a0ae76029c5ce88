//! Temp artifact chain
//!
//! Every path a conversion touches is derived from the source path by
//! extension substitution, so a job's intermediates are predictable and a
//! re-run lands on the same names.
//!
//! ```text
//! scan.gif ─convert─▶ scan.tmp.png ─pngquant─▶ scan.tmp.opt.png ─rename─▶ scan.png
//! scan.gif ─convert─▶ scan.tmp.jpg ─jpegoptim (in place)─────────rename─▶ scan.jpg
//! ```

use shared_utils::{has_extension, replace_extension, IMAGE_EXTENSIONS};
use std::path::{Path, PathBuf};

/// Whether `path` should be handed to the optimizer (`png`, `jpg`, `jpeg`, `gif`, any case).
pub fn is_image_candidate(path: &Path) -> bool {
    has_extension(path, IMAGE_EXTENSIONS)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactChain {
    pub source: PathBuf,
    /// `<base>.tmp.png`, written by `convert`
    pub working_png: PathBuf,
    /// `<base>.tmp.opt.png`, written by `pngquant --ext .opt.png`
    pub optimized_png: PathBuf,
    pub png_target: PathBuf,
    /// `<base>.tmp.jpg`, written by `convert` and optimized in place
    pub working_jpg: PathBuf,
    pub jpg_target: PathBuf,
}

impl ArtifactChain {
    pub fn for_source(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            working_png: replace_extension(source, "tmp.png"),
            optimized_png: replace_extension(source, "tmp.opt.png"),
            png_target: replace_extension(source, "png"),
            working_jpg: replace_extension(source, "tmp.jpg"),
            jpg_target: replace_extension(source, "jpg"),
        }
    }

    /// The source survives only when it already is the final target,
    /// i.e. the final rename replaces it.
    pub fn source_is(&self, target: &Path) -> bool {
        self.source == target
    }
}
