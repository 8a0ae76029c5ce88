//! Safety Module
//!
//! Refuses to rewrite images under system roots or a bare home directory.
//! The optimizer deletes and replaces files in place, so a wrong root argument
//! would otherwise be destructive.

use crate::app_error::{AppError, Result};
use std::path::Path;

const DANGEROUS_DIRS: &[&str] = &[
    "/",
    "/System",
    "/usr",
    "/bin",
    "/sbin",
    "/etc",
    "/var",
    "/private",
    "/Library",
    "/Applications",
    "/Users",
    "/home",
    "/root",
    "/boot",
    "/dev",
    "/proc",
    "/sys",
    "/tmp",
    "/opt",
];

pub fn check_dangerous_directory(path: &Path) -> Result<()> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

    for candidate in [path, canonical.as_path()] {
        let path_str = candidate.to_string_lossy();
        let trimmed = if path_str.len() > 1 {
            path_str.trim_end_matches('/')
        } else {
            &path_str[..]
        };
        if DANGEROUS_DIRS.contains(&trimmed) {
            return Err(AppError::DangerousDirectory {
                path: path.to_path_buf(),
            });
        }
    }

    // /Users/<name> or /home/<name> itself
    let path_str = canonical.to_string_lossy();
    if (path_str.starts_with("/Users/") || path_str.starts_with("/home/"))
        && canonical.components().count() <= 3
    {
        return Err(AppError::DangerousDirectory {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_system_roots_blocked() {
        for dir in ["/", "/usr", "/etc/", "/home"] {
            let err = check_dangerous_directory(Path::new(dir)).unwrap_err();
            assert!(
                matches!(err, AppError::DangerousDirectory { .. }),
                "{} should be blocked",
                dir
            );
        }
    }

    #[test]
    fn test_home_root_blocked() {
        assert!(check_dangerous_directory(Path::new("/home/reader")).is_err());
        assert!(check_dangerous_directory(Path::new("/Users/reader")).is_err());
    }

    #[test]
    fn test_subdirectory_allowed() {
        assert!(check_dangerous_directory(Path::new("/home/reader/comics")).is_ok());
    }

    #[test]
    fn test_temp_subdirectory_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let nested: PathBuf = dir.path().join("scans");
        std::fs::create_dir(&nested).unwrap();
        assert!(check_dangerous_directory(&nested).is_ok());
    }
}
