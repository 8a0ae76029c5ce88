//! Batch Processing Module
//!
//! Counters accumulated over one directory walk. A subdirectory's summary is
//! merged into its parent's once the subdirectory is drained.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Every listed entry, images or not
    pub entries: usize,
    pub directories: usize,
    pub optimized: usize,
    pub skipped: usize,
    pub greyscale: usize,
    pub color: usize,
    pub input_bytes: u64,
    pub output_bytes: u64,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_directory(&mut self) {
        self.entries += 1;
        self.directories += 1;
    }

    pub fn record_skip(&mut self) {
        self.entries += 1;
        self.skipped += 1;
    }

    pub fn record_image(&mut self, greyscale: bool, input_bytes: u64, output_bytes: u64) {
        self.entries += 1;
        self.optimized += 1;
        if greyscale {
            self.greyscale += 1;
        } else {
            self.color += 1;
        }
        self.input_bytes += input_bytes;
        self.output_bytes += output_bytes;
    }

    pub fn merge(&mut self, other: &BatchSummary) {
        self.entries += other.entries;
        self.directories += other.directories;
        self.optimized += other.optimized;
        self.skipped += other.skipped;
        self.greyscale += other.greyscale;
        self.color += other.color;
        self.input_bytes += other.input_bytes;
        self.output_bytes += other.output_bytes;
    }

    /// Percentage saved across optimized images; 0 when nothing was read.
    pub fn reduction_percent(&self) -> f64 {
        if self.input_bytes == 0 {
            0.0
        } else {
            (1.0 - self.output_bytes as f64 / self.input_bytes as f64) * 100.0
        }
    }
}
