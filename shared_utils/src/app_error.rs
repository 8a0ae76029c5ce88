//! AppError - unified error type for the optimizer
//!
//! Every layer propagates these unchanged; nothing is retried or swallowed.
//! The walker wraps the first failure with the path it was working on.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The external tool could not be launched at all (missing binary, permissions).
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The external tool ran and exited non-zero or was killed by a signal.
    #[error("`{command}` failed (exit code: {exit_code:?}, signal: {signal:?})")]
    ExternalTool {
        command: String,
        exit_code: Option<i32>,
        signal: Option<i32>,
        stderr: String,
    },

    #[error("could not parse saturation for {}: {raw:?}", .path.display())]
    Classification { path: PathBuf, raw: String },

    #[error("failed to {operation} {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("refusing to process protected directory {}", .path.display())]
    DangerousDirectory { path: PathBuf },

    #[error("error processing {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    pub fn filesystem(path: impl Into<PathBuf>, operation: &'static str, source: std::io::Error) -> Self {
        AppError::Filesystem {
            path: path.into(),
            operation,
            source,
        }
    }

    /// Attach the path being processed. Already-wrapped errors keep their innermost path.
    pub fn at_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            AppError::Walk { .. } => self,
            other => AppError::Walk {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    /// The error beneath any `Walk` context.
    pub fn root_cause(&self) -> &AppError {
        match self {
            AppError::Walk { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn is_external_tool_failure(&self) -> bool {
        matches!(self.root_cause(), AppError::ExternalTool { .. })
    }

    pub fn user_message(&self) -> String {
        match self {
            AppError::Spawn { command, source } => {
                let tool = command.split_whitespace().next().unwrap_or(command.as_str());
                format!(
                    "❌ Could not launch: {}\n   Reason: {}\n💡 Please ensure {} is installed and in PATH",
                    command, source, tool
                )
            }
            AppError::ExternalTool {
                command,
                exit_code,
                signal,
                stderr,
            } => {
                let mut msg = String::from("❌ External tool failed");
                if let Some(code) = exit_code {
                    msg.push_str(&format!(" (exit code: {})", code));
                }
                if let Some(sig) = signal {
                    msg.push_str(&format!(" (signal: {})", sig));
                }
                msg.push_str(&format!("\n   Command: {}", command));
                if !stderr.trim().is_empty() {
                    msg.push_str(&format!("\n   Error output: {}", stderr.trim()));
                }
                msg
            }
            AppError::Classification { path, raw } => format!(
                "❌ Could not classify image: {}\n   Saturation output: {:?}",
                path.display(),
                raw
            ),
            AppError::Filesystem {
                path,
                operation,
                source,
            } => format!("❌ Failed to {} {}: {}", operation, path.display(), source),
            AppError::DangerousDirectory { path } => format!(
                "🚨 DANGEROUS OPERATION BLOCKED!\n\
                 ❌ Target directory '{}' is a protected system directory.\n\
                 💡 Please specify a safe subdirectory instead.",
                path.display()
            ),
            AppError::Walk { path, source } => {
                format!("❌ Error processing {}\n{}", path.display(), source.user_message())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn tool_failure() -> AppError {
        AppError::ExternalTool {
            command: "convert a.png a.tmp.png".to_string(),
            exit_code: Some(2),
            signal: None,
            stderr: "convert: no decode delegate".to_string(),
        }
    }

    #[test]
    fn test_at_path_wraps_once() {
        let err = tool_failure().at_path("/photos/a.png").at_path("/photos");
        match &err {
            AppError::Walk { path, .. } => assert_eq!(path, &PathBuf::from("/photos/a.png")),
            other => panic!("expected Walk, got {:?}", other),
        }
        assert!(err.is_external_tool_failure());
    }

    #[test]
    fn test_root_cause_unwraps_context() {
        let err = AppError::Classification {
            path: PathBuf::from("x.gif"),
            raw: "abc".to_string(),
        }
        .at_path("x.gif");
        assert!(matches!(err.root_cause(), AppError::Classification { .. }));
        assert!(!err.is_external_tool_failure());
    }

    #[test]
    fn test_user_message_includes_exit_code_and_stderr() {
        let msg = tool_failure().user_message();
        assert!(msg.contains("exit code: 2"));
        assert!(msg.contains("no decode delegate"));
        assert!(msg.contains("convert a.png"));
    }

    #[test]
    fn test_user_message_walk_names_path() {
        let msg = tool_failure().at_path("/photos/a.png").user_message();
        assert!(msg.contains("/photos/a.png"));
        assert!(msg.contains("External tool failed"));
    }

    #[test]
    fn test_spawn_message_suggests_install() {
        let err = AppError::Spawn {
            command: "pngquant --speed 1 x.tmp.png".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.user_message();
        assert!(msg.contains("ensure pngquant is installed"));
    }

    #[test]
    fn test_display_filesystem() {
        let err = AppError::filesystem(
            "/photos/a.tmp.png",
            "remove",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "failed to remove /photos/a.tmp.png: denied");
    }
}
