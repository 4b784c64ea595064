//! Source-to-manifest synchronization.
//!
//! One run:
//!
//! 1. List the direct children of the source directory (regular files only,
//!    dotfiles skipped) and classify them by extension.
//! 2. Copy every eligible file into the destination directory, unchanged.
//! 3. For photos, read a bounded prefix and sniff the dimensions.
//! 4. Merge with the previous manifest and write the result atomically.
//!
//! Steps 2 and 3 run in parallel on the global rayon pool. Results are
//! collected in listing order and the shuffle happens afterwards, so the
//! output depends only on the RNG.
//!
//! A missing source directory or a source with no eligible files is not an
//! error: the run stops early and the existing manifest is left alone. A copy
//! failure aborts the run before anything is written.

use crate::classify;
use crate::config::SyncConfig;
use crate::header::{self, HeaderFormat};
use crate::merge::{self, MergeOptions, MergeStats, Observed, PreviousState};
use crate::types::{Manifest, MediaKind, StoredManifest};
use rand::Rng;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to read source directory {path}: {source}")]
    ReadSource { path: PathBuf, source: io::Error },
    #[error("Failed to create destination directory {path}: {source}")]
    CreateDest { path: PathBuf, source: io::Error },
    #[error("Failed to copy {file}: {source}")]
    Copy { file: PathBuf, source: io::Error },
    #[error("Failed to write manifest {path}: {source}")]
    WriteManifest { path: PathBuf, source: io::Error },
    #[error("Source and destination are the same directory: {0}")]
    SameDirectory(PathBuf),
}

/// Everything one run needs, resolved from config and CLI flags.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub manifest: PathBuf,
    /// Bytes read from each photo for header sniffing.
    pub prefix_bytes: usize,
    pub comment: String,
    pub merge: MergeOptions,
}

impl SyncOptions {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            source: config.source.clone(),
            dest: config.dest.clone(),
            manifest: config.manifest.clone(),
            prefix_bytes: config.header.prefix_bytes,
            comment: config.comment.clone(),
            merge: MergeOptions::from_config(config),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Source directory does not exist; nothing was touched.
    SourceMissing(PathBuf),
    /// Source has no eligible files; the manifest was left as is.
    SourceEmpty(PathBuf),
    /// Files copied and manifest written.
    Written(SyncReport),
    /// Dry run: the manifest that would have been written.
    Planned(SyncReport),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
    pub stats: MergeStats,
}

/// An eligible file in the source directory.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub filename: String,
    pub kind: MediaKind,
}

// =============================================================================
// Steps
// =============================================================================

/// List eligible files in `dir`, sorted by filename.
///
/// Returns `Ok(None)` when the directory does not exist. Subdirectories,
/// hidden files and unsupported extensions are skipped.
pub fn scan_source(dir: &Path) -> Result<Option<Vec<SourceFile>>, SyncError> {
    let read_err = |source| SyncError::ReadSource {
        path: dir.to_path_buf(),
        source,
    };
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(read_err(err)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(read_err)?.path();
        if !path.is_file() {
            continue;
        }
        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            warn!(path = %path.display(), "skipping file with non-UTF-8 name");
            continue;
        };
        if filename.starts_with('.') {
            continue;
        }
        match classify::classify(filename).kind() {
            Some(kind) => files.push(SourceFile {
                filename: filename.to_string(),
                kind,
                path: path.clone(),
            }),
            None => debug!(file = filename, "unsupported extension"),
        }
    }

    files.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(Some(files))
}

/// Read the previous manifest, falling back to an empty state.
///
/// A missing file is the normal first-run case. An unreadable or malformed
/// file is logged and treated as empty.
pub fn load_previous(path: &Path) -> PreviousState {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no previous manifest");
            return PreviousState::empty();
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "previous manifest unreadable, starting fresh");
            return PreviousState::empty();
        }
    };
    match StoredManifest::parse(&text) {
        Ok(stored) => PreviousState::from_manifest(&stored),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "previous manifest is not valid JSON, starting fresh");
            PreviousState::empty()
        }
    }
}

/// Serialize `manifest` as pretty JSON and atomically replace `path`.
///
/// Writes to a `.tmp` sibling first, then renames over the target. Creates
/// the parent directory if needed. On failure the `.tmp` file is removed.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<(), SyncError> {
    let write_err = |source| SyncError::WriteManifest {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut json = serde_json::to_string_pretty(manifest)?;
    json.push('\n');

    let file_name = path
        .file_name()
        .ok_or_else(|| write_err(io::Error::other("manifest path has no file name")))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    if let Err(err) = fs::write(&tmp, json).and_then(|()| fs::rename(&tmp, path)) {
        // Best effort; the target is untouched either way.
        let _ = fs::remove_file(&tmp);
        return Err(write_err(err));
    }
    Ok(())
}

fn probe(file: &SourceFile, prefix_bytes: usize) -> Observed {
    let dimensions = match file.kind {
        MediaKind::Video => None,
        MediaKind::Photo => HeaderFormat::from_path(&file.path)
            .and_then(|format| header::probe_file(&file.path, format, prefix_bytes)),
    };
    if file.kind == MediaKind::Photo && dimensions.is_none() {
        info!(file = %file.filename, "dimensions unknown, aspect will be random");
    }
    Observed {
        filename: file.filename.clone(),
        kind: file.kind,
        dimensions,
    }
}

fn copy_and_probe(file: &SourceFile, dest: &Path, prefix_bytes: usize) -> Result<Observed, SyncError> {
    let target = dest.join(&file.filename);
    let bytes = fs::copy(&file.path, &target).map_err(|source| SyncError::Copy {
        file: file.path.clone(),
        source,
    })?;
    debug!(file = %file.filename, bytes, "copied");
    Ok(probe(file, prefix_bytes))
}

fn ensure_distinct(source: &Path, dest: &Path) -> Result<(), SyncError> {
    match (fs::canonicalize(source), fs::canonicalize(dest)) {
        (Ok(a), Ok(b)) if a == b => Err(SyncError::SameDirectory(a)),
        _ => Ok(()),
    }
}

// =============================================================================
// Entry points
// =============================================================================

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    Write,
    DryRun,
}

/// Copy media and rewrite the manifest.
pub fn sync<R: Rng + ?Sized>(options: &SyncOptions, rng: &mut R) -> Result<SyncOutcome, SyncError> {
    run(options, rng, Mode::Write)
}

/// Compute the manifest a [`sync`] would write, without copying or writing.
pub fn plan<R: Rng + ?Sized>(options: &SyncOptions, rng: &mut R) -> Result<SyncOutcome, SyncError> {
    run(options, rng, Mode::DryRun)
}

fn run<R: Rng + ?Sized>(options: &SyncOptions, rng: &mut R, mode: Mode) -> Result<SyncOutcome, SyncError> {
    let Some(files) = scan_source(&options.source)? else {
        warn!(source = %options.source.display(), "source directory not found");
        return Ok(SyncOutcome::SourceMissing(options.source.clone()));
    };
    if files.is_empty() {
        info!(source = %options.source.display(), "no media files, manifest left unchanged");
        return Ok(SyncOutcome::SourceEmpty(options.source.clone()));
    }
    info!(count = files.len(), source = %options.source.display(), "found media files");

    let observed: Vec<Observed> = match mode {
        Mode::Write => {
            ensure_distinct(&options.source, &options.dest)?;
            fs::create_dir_all(&options.dest).map_err(|source| SyncError::CreateDest {
                path: options.dest.clone(),
                source,
            })?;
            files
                .par_iter()
                .map(|file| copy_and_probe(file, &options.dest, options.prefix_bytes))
                .collect::<Result<Vec<_>, _>>()?
        }
        Mode::DryRun => files
            .par_iter()
            .map(|file| probe(file, options.prefix_bytes))
            .collect(),
    };

    let previous = load_previous(&options.manifest);
    let merged = merge::merge(&previous, observed, &options.merge, rng);
    let manifest = Manifest {
        comment: options.comment.clone(),
        photos: merged.entries,
    };

    let report = SyncReport {
        manifest_path: options.manifest.clone(),
        manifest,
        stats: merged.stats,
    };

    match mode {
        Mode::Write => {
            write_manifest(&options.manifest, &report.manifest)?;
            info!(
                path = %options.manifest.display(),
                added = report.stats.added,
                preserved = report.stats.preserved,
                removed = report.stats.removed,
                "manifest written"
            );
            Ok(SyncOutcome::Written(report))
        }
        Mode::DryRun => Ok(SyncOutcome::Planned(report)),
    }
}
