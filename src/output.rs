//! CLI output formatting for sync runs.
//!
//! # Output Format
//!
//! ## Sync
//!
//! ```text
//! Synced 4 items (3 photos, 1 video) → public/data/gallery.json
//!     2 added, 2 preserved, 1 removed
//! ```
//!
//! ## Check (dry run)
//!
//! Each entry leads with its positional index and filename, with the
//! editable fields as indented context lines:
//!
//! ```text
//! 001 beach.jpg (photo, landscape)
//!     Caption: Hello
//!     Date: May 2024
//! 002 clip.mp4 (video, landscape)
//!
//! Would write 2 items (1 photo, 1 video) → public/data/gallery.json
//!     1 added, 1 preserved, 0 removed
//! ```
//!
//! ## Early exits
//!
//! ```text
//! Source directory not found: photo (nothing to sync)
//! No media files in photo, manifest left unchanged
//! ```
//!
//! # Architecture
//!
//! [`format_sync_output`] returns `Vec<String>` for testability and
//! [`print_sync_output`] writes it to stdout. Format functions are pure.

use crate::merge::MergeStats;
use crate::sync::{SyncOutcome, SyncReport};
use crate::types::{MediaEntry, MediaKind};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// `4 items (3 photos, 1 video)`
fn item_summary(entries: &[MediaEntry]) -> String {
    let photos = entries
        .iter()
        .filter(|e| e.kind == MediaKind::Photo)
        .count();
    let videos = entries.len() - photos;
    format!(
        "{} ({}, {})",
        plural(entries.len(), "item"),
        plural(photos, "photo"),
        plural(videos, "video")
    )
}

fn stats_line(stats: &MergeStats) -> String {
    format!(
        "{}{} added, {} preserved, {} removed",
        indent(1),
        stats.added,
        stats.preserved,
        stats.removed
    )
}

/// Entry header plus non-empty editable fields.
///
/// ```text
/// 001 beach.jpg (photo, landscape)
///     Caption: Hello
/// ```
fn entry_lines(index: usize, entry: &MediaEntry) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} ({}, {})",
        format_index(index),
        entry.filename(),
        entry.kind.as_str(),
        entry.aspect.as_str()
    )];
    if !entry.caption.is_empty() {
        lines.push(format!("{}Caption: {}", indent(1), entry.caption));
    }
    if !entry.date.is_empty() {
        lines.push(format!("{}Date: {}", indent(1), entry.date));
    }
    if let Some(poster) = entry.poster_path.as_deref().filter(|p| !p.is_empty()) {
        lines.push(format!("{}Poster: {}", indent(1), poster));
    }
    lines
}

// ============================================================================
// Sync / check output
// ============================================================================

/// Format the entry listing and summary of a dry run.
pub fn format_plan_output(report: &SyncReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .manifest
        .photos
        .iter()
        .enumerate()
        .flat_map(|(i, entry)| entry_lines(i + 1, entry))
        .collect();

    lines.push(String::new());
    lines.push(format!(
        "Would write {} → {}",
        item_summary(&report.manifest.photos),
        report.manifest_path.display()
    ));
    lines.push(stats_line(&report.stats));
    lines
}

/// Format the result of a sync or check run.
pub fn format_sync_output(outcome: &SyncOutcome) -> Vec<String> {
    match outcome {
        SyncOutcome::SourceMissing(source) => vec![format!(
            "Source directory not found: {} (nothing to sync)",
            source.display()
        )],
        SyncOutcome::SourceEmpty(source) => vec![format!(
            "No media files in {}, manifest left unchanged",
            source.display()
        )],
        SyncOutcome::Written(report) => vec![
            format!(
                "Synced {} → {}",
                item_summary(&report.manifest.photos),
                report.manifest_path.display()
            ),
            stats_line(&report.stats),
        ],
        SyncOutcome::Planned(report) => format_plan_output(report),
    }
}

/// Print sync or check output to stdout.
pub fn print_sync_output(outcome: &SyncOutcome) {
    for line in format_sync_output(outcome) {
        println!("{}", line);
    }
}
