//! Progress Module
//!
//! Event contract between the directory walker and whatever renders progress:
//! - `on_start(depth, total)` once per directory level, before its first entry
//! - `on_tick(depth, frame, child)` once per processed entry of that level
//!
//! `child` is the latest frame of the subdirectory walked most recently at this
//! level, so a renderer can draw the child's state inside the parent's line.
//! Both callbacks default to no-ops.
//!
//! Visual style: `(3/12) ▕████████▓░░░░░▏ [(7/40) ████░░░░] 2m`

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;
use std::cell::OnceCell;

pub mod progress_style {
    /// indicatif needs 3 chars: (filled, current, empty)
    pub const PROGRESS_CHARS: &str = "█▓░";

    pub const BAR_WIDTH: usize = 35;

    pub const CHILD_BAR_WIDTH: usize = 25;

    pub const NESTED_TEMPLATE: &str =
        "({pos}/{len}) ▕{bar:35.green/black}▏ {msg} {eta}";
}

/// Position within one directory level. `index` is the 0-based entry just processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressFrame {
    pub index: usize,
    pub total: usize,
}

impl ProgressFrame {
    pub fn new(index: usize, total: usize) -> Self {
        Self { index, total }
    }

    pub fn completed(&self) -> usize {
        self.index + 1
    }
}

pub trait ProgressSink {
    fn on_start(&self, _depth: usize, _total: usize) {}

    fn on_tick(&self, _depth: usize, _frame: ProgressFrame, _child: Option<ProgressFrame>) {}
}

impl<S: ProgressSink + ?Sized> ProgressSink for &S {
    fn on_start(&self, depth: usize, total: usize) {
        (**self).on_start(depth, total)
    }

    fn on_tick(&self, depth: usize, frame: ProgressFrame, child: Option<ProgressFrame>) {
        (**self).on_tick(depth, frame, child)
    }
}

/// Ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {}

/// `[(7/40) ████░░░░]`
pub fn render_child_bar(frame: ProgressFrame, width: usize) -> String {
    let completed = frame.completed().min(frame.total);
    let filled = if frame.total == 0 {
        width
    } else {
        completed * width / frame.total
    };
    format!(
        "[({}/{}) {}{}]",
        completed,
        frame.total,
        "█".repeat(filled),
        "░".repeat(width.saturating_sub(filled))
    )
}

/// Terminal renderer: one bar for the root level, the current subdirectory as
/// an inline sub-bar in its message. Deeper levels are not drawn.
pub struct NestedProgressBar {
    bar: OnceCell<ProgressBar>,
    visible: bool,
}

impl NestedProgressBar {
    pub fn new() -> Self {
        Self {
            bar: OnceCell::new(),
            visible: true,
        }
    }

    /// Tracks state without drawing anything.
    pub fn hidden() -> Self {
        Self {
            bar: OnceCell::new(),
            visible: false,
        }
    }

    pub fn bar(&self) -> Option<&ProgressBar> {
        self.bar.get()
    }

    pub fn finish(&self) {
        if let Some(bar) = self.bar.get() {
            bar.finish();
        }
    }

    fn root_bar(&self, total: usize) -> &ProgressBar {
        self.bar.get_or_init(|| {
            let bar = ProgressBar::new(total as u64);
            if self.visible {
                // the template is a constant; a bad one falls back to the default style
                if let Ok(style) = ProgressStyle::default_bar()
                    .template(progress_style::NESTED_TEMPLATE)
                    .map(|s| s.progress_chars(progress_style::PROGRESS_CHARS))
                {
                    bar.set_style(style);
                }
                bar.set_draw_target(ProgressDrawTarget::stderr());
            } else {
                bar.set_draw_target(ProgressDrawTarget::hidden());
            }
            bar
        })
    }
}

impl Default for NestedProgressBar {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for NestedProgressBar {
    fn on_start(&self, depth: usize, total: usize) {
        if depth == 0 {
            self.root_bar(total);
        }
    }

    fn on_tick(&self, depth: usize, frame: ProgressFrame, child: Option<ProgressFrame>) {
        match depth {
            0 => {
                let bar = self.root_bar(frame.total);
                bar.set_position(frame.completed() as u64);
                let sub = child
                    .map(|c| render_child_bar(c, progress_style::CHILD_BAR_WIDTH))
                    .unwrap_or_default();
                bar.set_message(sub);
            }
            1 => {
                if let Some(bar) = self.bar.get() {
                    bar.set_message(render_child_bar(frame, progress_style::CHILD_BAR_WIDTH));
                }
            }
            _ => {}
        }
    }
}
