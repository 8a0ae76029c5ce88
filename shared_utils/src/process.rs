//! Process executor - runs one external tool and collects its stdout
//!
//! stdin is closed, stdout is collected in full, and stderr is drained on its
//! own thread so a tool that writes a lot of diagnostics cannot block on a
//! full pipe while we wait for stdout.

use crate::app_error::{AppError, Result};
use crate::logging::log_external_tool;
use std::ffi::OsString;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Instant;
use tracing::debug;

/// Runs an external command and returns its standard output.
///
/// Implementations resolve with stdout on exit status 0, fail with
/// [`AppError::ExternalTool`] on any other exit, and with [`AppError::Spawn`]
/// when the program cannot be started.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<String>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &str, args: &[OsString]) -> Result<String> {
        (**self).run(program, args)
    }
}

/// Spawns real processes, resolving `program` through `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<String> {
        let command_line = format_command_line(program, args);
        debug!(command = %command_line, "Executing external command");

        let start = Instant::now();
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| AppError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        let stderr_thread = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                // raw bytes: a non-UTF-8 line must not stop the drain
                let mut buf = Vec::new();
                let _ = stderr.read_to_end(&mut buf);
                buf
            })
        });

        let mut raw_stdout = Vec::new();
        let read_result = match child.stdout.take() {
            Some(mut stdout) => stdout.read_to_end(&mut raw_stdout).map(|_| ()),
            None => Ok(()),
        };
        let status = reap(&mut child, &read_result).map_err(|source| AppError::Spawn {
            command: command_line.clone(),
            source,
        })?;
        let stderr = stderr_thread
            .and_then(|t| t.join().ok())
            .map(|raw| String::from_utf8_lossy(&raw).into_owned())
            .unwrap_or_default();
        read_result.map_err(|source| AppError::Spawn {
            command: command_line.clone(),
            source,
        })?;
        let stdout = String::from_utf8_lossy(&raw_stdout).into_owned();

        let exit_code = status.code();
        let log_output = if stderr.is_empty() { &stdout } else { &stderr };
        log_external_tool(program, &command_line, log_output, exit_code, start.elapsed());

        if status.success() {
            Ok(stdout)
        } else {
            Err(AppError::ExternalTool {
                command: command_line,
                exit_code,
                signal: exit_signal(&status),
                stderr,
            })
        }
    }
}

/// Wait for `child`, killing it first when its output could not be read.
/// The child is always reaped.
fn reap(child: &mut Child, read_result: &std::io::Result<()>) -> std::io::Result<ExitStatus> {
    if read_result.is_err() {
        let _ = child.kill();
    }
    child.wait()
}

/// Render a command for logs and error messages.
pub fn format_command_line(program: &str, args: &[OsString]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

/// Tools from `tools` that cannot be found on `PATH`.
pub fn find_missing_tools(tools: &[&str]) -> Vec<String> {
    tools
        .iter()
        .filter(|tool| which::which(tool).is_err())
        .map(|tool| tool.to_string())
        .collect()
}
