//! Conversion pipeline
//!
//! Classifies one image and runs the matching workflow:
//!
//! | classification | `color_png` | workflow   | final file   |
//! |----------------|-------------|------------|--------------|
//! | greyscale      | any         | Greyscale  | `<base>.png` |
//! | color          | false       | ColorJpeg  | `<base>.jpg` |
//! | color          | true        | ColorPng   | `<base>.png` |
//!
//! Any failing step aborts the job and is returned unchanged. Intermediates
//! from a failed job stay on disk under their `.tmp.*` names.

use crate::artifacts::ArtifactChain;
use crate::classifier::{classify, ImageKind};
use crate::tools::{CONVERT, JPEGOPTIM, PNGQUANT};
use shared_utils::{AppError, CommandRunner, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Palette size for greyscale output: 16 grey levels plus one
pub const GREYSCALE_COLORS: u32 = 17;
pub const WHITE_THRESHOLD: &str = "95%";
pub const BLACK_THRESHOLD: &str = "10%";
/// Contrast and gamma applied with `lighten`, tuned for low-glare e-ink panels
pub const LIGHTEN_SIGMOIDAL_CONTRAST: &str = "3x10%";
pub const LIGHTEN_GAMMA: &str = "1.1";
pub const JPEG_QUALITY: u32 = 80;
pub const PNGQUANT_SPEED: u32 = 1;
/// pngquant turns `x.tmp.png` into `x.tmp.opt.png`
pub const PNGQUANT_EXT: &str = ".opt.png";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeOptions {
    /// Extra contrast/gamma pass on greyscale output
    pub lighten: bool,
    /// Keep color images as quantized PNG instead of JPEG
    pub color_png: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    Greyscale,
    ColorJpeg,
    ColorPng,
}

impl Workflow {
    pub fn select(kind: ImageKind, options: &OptimizeOptions) -> Self {
        match kind {
            ImageKind::Greyscale => Workflow::Greyscale,
            ImageKind::Color if options.color_png => Workflow::ColorPng,
            ImageKind::Color => Workflow::ColorJpeg,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Workflow::Greyscale => "greyscale-png",
            Workflow::ColorJpeg => "color-jpeg",
            Workflow::ColorPng => "color-png",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeOutcome {
    pub source: PathBuf,
    pub target: PathBuf,
    pub kind: ImageKind,
    pub workflow: Workflow,
    pub input_bytes: u64,
    pub output_bytes: u64,
}

pub struct ImageOptimizer<R: CommandRunner> {
    runner: R,
    options: OptimizeOptions,
}

impl<R: CommandRunner> ImageOptimizer<R> {
    pub fn new(runner: R, options: OptimizeOptions) -> Self {
        Self { runner, options }
    }

    pub fn optimize(&self, source: &Path) -> Result<OptimizeOutcome> {
        let input_bytes = file_size(source)?;
        let kind = classify(&self.runner, source)?;
        let workflow = Workflow::select(kind, &self.options);
        let chain = ArtifactChain::for_source(source);

        debug!(
            path = %source.display(),
            workflow = workflow.as_str(),
            "Starting conversion"
        );

        let target = match workflow {
            Workflow::Greyscale => {
                self.run(CONVERT, greyscale_convert_args(&chain, self.options.lighten))?;
                self.quantize_and_finish(&chain)?
            }
            Workflow::ColorPng => {
                self.run(CONVERT, color_png_convert_args(&chain))?;
                self.quantize_and_finish(&chain)?
            }
            Workflow::ColorJpeg => {
                self.run(CONVERT, color_jpeg_convert_args(&chain))?;
                self.run(JPEGOPTIM, jpegoptim_args(&chain))?;

                if !chain.source_is(&chain.jpg_target) {
                    remove_file(&chain.source)?;
                }
                rename(&chain.working_jpg, &chain.jpg_target)?;
                chain.jpg_target.clone()
            }
        };

        let output_bytes = file_size(&target)?;
        info!(
            source = %source.display(),
            target = %target.display(),
            workflow = workflow.as_str(),
            input_bytes,
            output_bytes,
            "Optimized image"
        );

        Ok(OptimizeOutcome {
            source: source.to_path_buf(),
            target,
            kind,
            workflow,
            input_bytes,
            output_bytes,
        })
    }

    /// Shared tail of the PNG workflows: quantize, then clean up.
    ///
    /// Known gap: a non-PNG source is deleted before the optimized file is
    /// renamed into place. A crash between the two leaves only
    /// `<base>.tmp.opt.png` behind.
    fn quantize_and_finish(&self, chain: &ArtifactChain) -> Result<PathBuf> {
        self.run(PNGQUANT, pngquant_args(chain))?;

        if !chain.source_is(&chain.png_target) {
            remove_file(&chain.source)?;
        }
        remove_file(&chain.working_png)?;
        rename(&chain.optimized_png, &chain.png_target)?;
        Ok(chain.png_target.clone())
    }

    fn run(&self, program: &str, args: Vec<OsString>) -> Result<String> {
        self.runner.run(program, &args)
    }
}

pub fn greyscale_convert_args(chain: &ArtifactChain, lighten: bool) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        chain.source.as_path().into(),
        "-alpha".into(),
        "off".into(),
        "-interlace".into(),
        "none".into(),
        "-colors".into(),
        GREYSCALE_COLORS.to_string().into(),
        "-white-threshold".into(),
        WHITE_THRESHOLD.into(),
        "-black-threshold".into(),
        BLACK_THRESHOLD.into(),
    ];
    if lighten {
        args.extend([
            OsString::from("-sigmoidal-contrast"),
            OsString::from(LIGHTEN_SIGMOIDAL_CONTRAST),
            OsString::from("-gamma"),
            OsString::from(LIGHTEN_GAMMA),
        ]);
    }
    args.push(chain.working_png.as_path().into());
    args
}

pub fn color_png_convert_args(chain: &ArtifactChain) -> Vec<OsString> {
    vec![
        chain.source.as_path().into(),
        "-alpha".into(),
        "off".into(),
        "-interlace".into(),
        "none".into(),
        chain.working_png.as_path().into(),
    ]
}

pub fn color_jpeg_convert_args(chain: &ArtifactChain) -> Vec<OsString> {
    vec![
        chain.source.as_path().into(),
        "-interlace".into(),
        "none".into(),
        "-quality".into(),
        JPEG_QUALITY.to_string().into(),
        // drop ICC and other profiles
        "-strip".into(),
        chain.working_jpg.as_path().into(),
    ]
}

/// `--force` lets a re-run overwrite a `.tmp.opt.png` left by an interrupted job.
pub fn pngquant_args(chain: &ArtifactChain) -> Vec<OsString> {
    vec![
        "--ext".into(),
        PNGQUANT_EXT.into(),
        "--speed".into(),
        PNGQUANT_SPEED.to_string().into(),
        "--force".into(),
        chain.working_png.as_path().into(),
    ]
}

pub fn jpegoptim_args(chain: &ArtifactChain) -> Vec<OsString> {
    vec![
        chain.working_jpg.as_path().into(),
        "-m".into(),
        JPEG_QUALITY.to_string().into(),
        "--strip-icc".into(),
        "--strip-exif".into(),
        "--all-normal".into(),
    ]
}

fn file_size(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| AppError::filesystem(path, "stat", e))
}

fn remove_file(path: &Path) -> Result<()> {
    debug!(path = %path.display(), "Removing file");
    fs::remove_file(path).map_err(|e| AppError::filesystem(path, "remove", e))
}

fn rename(from: &Path, to: &Path) -> Result<()> {
    debug!(from = %from.display(), to = %to.display(), "Renaming file");
    fs::rename(from, to).map_err(|e| AppError::filesystem(from, "rename", e))
}
