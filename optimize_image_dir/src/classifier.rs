//! Greyscale detection
//!
//! An image counts as greyscale when the mean of its HSL saturation channel
//! is below [`SATURATION_THRESHOLD`]. ImageMagick computes the mean; we only
//! parse the number it prints.

use crate::tools::CONVERT;
use shared_utils::{AppError, CommandRunner, Result};
use std::ffi::OsString;
use std::path::Path;
use tracing::debug;

/// Strictly below this mean saturation the image is greyscale.
pub const SATURATION_THRESHOLD: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Greyscale,
    Color,
}

impl ImageKind {
    pub fn is_greyscale(self) -> bool {
        matches!(self, ImageKind::Greyscale)
    }

    pub fn from_saturation(saturation: f64) -> Self {
        if saturation < SATURATION_THRESHOLD {
            ImageKind::Greyscale
        } else {
            ImageKind::Color
        }
    }
}

/// `convert <img> -colorspace HSL -channel g -separate +channel -format "%[fx:mean]" info:`
pub fn saturation_args(path: &Path) -> Vec<OsString> {
    vec![
        path.into(),
        "-colorspace".into(),
        "HSL".into(),
        "-channel".into(),
        "g".into(),
        "-separate".into(),
        "+channel".into(),
        "-format".into(),
        "\"%[fx:mean]\"".into(),
        "info:".into(),
    ]
}

/// Parse the saturation printed by `convert`.
///
/// The output is wrapped in literal quotes and may carry whitespace. A plain
/// float (including exponent notation such as `5e-05`) is taken as is;
/// otherwise every character other than ASCII digits and `.` is stripped
/// before parsing. Returns `None` when nothing numeric remains.
pub fn parse_saturation(raw: &str) -> Option<f64> {
    let trimmed = raw.trim().trim_matches('"').trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        if value.is_finite() {
            return Some(value);
        }
    }

    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn classify<R: CommandRunner>(runner: &R, path: &Path) -> Result<ImageKind> {
    let raw = runner.run(CONVERT, &saturation_args(path))?;
    let saturation = parse_saturation(&raw).ok_or_else(|| AppError::Classification {
        path: path.to_path_buf(),
        raw: raw.clone(),
    })?;

    let kind = ImageKind::from_saturation(saturation);
    debug!(
        path = %path.display(),
        saturation,
        kind = ?kind,
        "Classified image"
    );
    Ok(kind)
}

pub fn is_greyscale<R: CommandRunner>(runner: &R, path: &Path) -> Result<bool> {
    classify(runner, path).map(ImageKind::is_greyscale)
}
