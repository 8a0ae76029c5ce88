//! Common Utilities Module
//!
//! Path and extension helpers shared by the walker and the conversion pipeline.

use std::path::{Path, PathBuf};

/// Extensions the optimizer treats as images, lowercase, without the dot.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Lowercase extension of `path`, empty when there is none.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use shared_utils::common_utils::get_extension_lowercase;
///
/// assert_eq!(get_extension_lowercase(Path::new("test.JPG")), "jpg");
/// assert_eq!(get_extension_lowercase(Path::new("noext")), "");
/// ```
pub fn get_extension_lowercase(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Case-insensitive extension check. `extensions` are given without the dot.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use shared_utils::common_utils::has_extension;
///
/// let extensions = &["jpg", "png", "gif"];
/// assert!(has_extension(Path::new("photo.JPG"), extensions));
/// assert!(!has_extension(Path::new("video.mp4"), extensions));
/// ```
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    let ext = get_extension_lowercase(path);
    !ext.is_empty() && extensions.contains(&ext.as_str())
}

/// Swap the last extension of `path` for `new_ext` (no leading dot).
/// `new_ext` may itself contain dots, e.g. `tmp.opt.png`.
///
/// # Examples
/// ```
/// use std::path::{Path, PathBuf};
/// use shared_utils::common_utils::replace_extension;
///
/// assert_eq!(replace_extension(Path::new("/a/scan.JPG"), "tmp.png"), PathBuf::from("/a/scan.tmp.png"));
/// assert_eq!(replace_extension(Path::new("/a/scan"), "png"), PathBuf::from("/a/scan.png"));
/// ```
pub fn replace_extension(path: &Path, new_ext: &str) -> PathBuf {
    path.with_extension(new_ext)
}
