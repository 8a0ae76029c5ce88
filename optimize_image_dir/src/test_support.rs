//! Test doubles: a scripted `CommandRunner` that mimics the side effects of
//! convert/pngquant/jpegoptim on disk, and a progress sink that records events.

use shared_utils::{AppError, CommandRunner, ProgressFrame, ProgressSink, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::Level;

pub const GREY: &str = "\"0.005\"";
pub const COLOR: &str = "\"0.5\"";

pub fn lossy(args: &[OsString]) -> Vec<String> {
    args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

struct Failure {
    program: String,
    arg_suffix: String,
    exit_code: i32,
}

#[derive(Default)]
pub struct ScriptedRunner {
    saturation: HashMap<String, String>,
    failures: Vec<Failure>,
    calls: RefCell<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw `info:` output for the file named `file_name`; unlisted files are color.
    pub fn with_saturation(mut self, file_name: &str, raw: &str) -> Self {
        self.saturation.insert(file_name.to_string(), raw.to_string());
        self
    }

    /// Exit with `exit_code` when `program` gets an argument ending in `arg_suffix`.
    pub fn fail_on(mut self, program: &str, arg_suffix: &str, exit_code: i32) -> Self {
        self.failures.push(Failure {
            program: program.to_string(),
            arg_suffix: arg_suffix.to_string(),
            exit_code,
        });
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|i| i.program.clone()).collect()
    }

    /// File names passed as the image argument of saturation probes, in call order.
    pub fn classified(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|i| i.args.last().map(|a| a == "info:").unwrap_or(false))
            .map(|i| file_name(&i.args[0]))
            .collect()
    }

    fn fail(&self, program: &str, args: &[String], exit_code: i32) -> AppError {
        AppError::ExternalTool {
            command: format!("{} {}", program, args.join(" ")),
            exit_code: Some(exit_code),
            signal: None,
            stderr: format!("{}: scripted failure", program),
        }
    }

    fn write(&self, path: &str, bytes: &[u8]) -> Result<()> {
        fs::write(path, bytes).map_err(|e| AppError::filesystem(path, "write", e))
    }
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<String> {
        let args = lossy(args);
        self.calls.borrow_mut().push(Invocation {
            program: program.to_string(),
            args: args.clone(),
        });

        for failure in &self.failures {
            if failure.program == program && args.iter().any(|a| a.ends_with(&failure.arg_suffix)) {
                return Err(self.fail(program, &args, failure.exit_code));
            }
        }

        match program {
            "convert" => {
                let input = &args[0];
                if !Path::new(input).exists() {
                    return Err(self.fail(program, &args, 1));
                }
                let output = &args[args.len() - 1];
                if output == "info:" {
                    let raw = self
                        .saturation
                        .get(&file_name(input))
                        .cloned()
                        .unwrap_or_else(|| COLOR.to_string());
                    return Ok(raw);
                }
                self.write(output, b"converted-image-data")?;
                Ok(String::new())
            }
            "pngquant" => {
                let input = &args[args.len() - 1];
                let base = input.strip_suffix(".png").unwrap_or(input);
                let output = PathBuf::from(format!("{}{}", base, ".opt.png"));
                if !Path::new(input).exists() {
                    return Err(self.fail(program, &args, 2));
                }
                fs::write(&output, b"quantized").map_err(|e| AppError::filesystem(&output, "write", e))?;
                Ok(String::new())
            }
            "jpegoptim" => {
                let input = &args[0];
                if !Path::new(input).exists() {
                    return Err(self.fail(program, &args, 1));
                }
                self.write(input, b"optimized-jpeg")?;
                Ok(String::new())
            }
            _ => Err(AppError::Spawn {
                command: program.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not scripted"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Start {
        depth: usize,
        total: usize,
    },
    Tick {
        depth: usize,
        frame: ProgressFrame,
        child: Option<ProgressFrame>,
    },
}

#[derive(Default)]
pub struct RecordingProgress {
    events: RefCell<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.borrow().clone()
    }

    pub fn ticks_at(&self, depth: usize) -> Vec<(ProgressFrame, Option<ProgressFrame>)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Tick { depth: d, frame, child } if *d == depth => Some((*frame, *child)),
                _ => None,
            })
            .collect()
    }

    pub fn starts_at(&self, depth: usize) -> Vec<usize> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Start { depth: d, total } if *d == depth => Some(*total),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn on_start(&self, depth: usize, total: usize) {
        self.events.borrow_mut().push(ProgressEvent::Start { depth, total });
    }

    fn on_tick(&self, depth: usize, frame: ProgressFrame, child: Option<ProgressFrame>) {
        self.events
            .borrow_mut()
            .push(ProgressEvent::Tick { depth, frame, child });
    }
}

/// Collects formatted tracing output produced inside [`CapturedLogs::capture`].
#[derive(Clone, Default)]
pub struct CapturedLogs {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capture<T>(&self, level: Level, f: impl FnOnce() -> T) -> T {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
