//! Report Module
//!
//! End-of-run summary, as a boxed table or as JSON.

use crate::batch::BatchSummary;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    root: &'a Path,
    duration_secs: f64,
    reduction_percent: f64,
    #[serde(flatten)]
    summary: &'a BatchSummary,
}

pub fn summary_json(summary: &BatchSummary, root: &Path, duration: Duration) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        root,
        duration_secs: duration.as_secs_f64(),
        reduction_percent: summary.reduction_percent(),
        summary,
    })
}

pub fn print_summary_report(summary: &BatchSummary, duration: Duration) {
    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║                📊 Image Optimization Summary             ║");
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║  📁 Entries Visited:    {:>10}                       ║", summary.entries);
    println!("║  📂 Directories:        {:>10}                       ║", summary.directories);
    println!("║  ✅ Images Optimized:   {:>10}                       ║", summary.optimized);
    println!("║     ⬜ Greyscale:       {:>10}                       ║", summary.greyscale);
    println!("║     🎨 Color:           {:>10}                       ║", summary.color);
    println!("║  ⏭️  Skipped:            {:>10}                       ║", summary.skipped);
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║  💾 Input Size:         {:>10}                       ║", format_bytes(summary.input_bytes));
    println!("║  💾 Output Size:        {:>10}                       ║", format_bytes(summary.output_bytes));
    println!("║  📉 Size Reduction:     {:>9.1}%                       ║", summary.reduction_percent());
    println!("║  ⏱️  Total Time:         {:>10}                       ║", format_duration(duration));
    println!("╚══════════════════════════════════════════════════════════╝");
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}
