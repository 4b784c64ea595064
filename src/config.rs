//! Sync configuration.
//!
//! Loads `gallery-sync.toml`, layering user values over stock defaults. Every
//! key is optional; a missing file means "all defaults". CLI flags are applied
//! on top by the binary.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! source = "photo"                         # Directory scanned for media
//! dest = "public/assets/gallery"           # Where media files are copied
//! manifest = "public/data/gallery.json"    # Manifest read and rewritten per run
//! serving_prefix = "/assets/gallery"       # URL prefix written into `src`
//! comment = "..."                          # `_comment` written at the top
//!
//! [header]
//! prefix_bytes = 65536      # Bytes read from each photo for dimensions
//!
//! [styling]
//! max_rotation = 3.0        # New entries get a rotation in [-max, max]
//! palette = ["#B8C5D6", ...] # Placeholder colors for new entries
//!
//! [processing]
//! max_processes = 4         # Max parallel copy workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want.
//!
//! ```toml
//! source = "/mnt/camera/export"
//!
//! [styling]
//! max_rotation = 1.5
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const CONFIG_FILENAME: &str = "gallery-sync.toml";

/// Rotations are decorative; anything past this reads as a mistake.
pub const ROTATION_LIMIT: f64 = 3.0;

const MIN_PREFIX_BYTES: usize = 64;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Sync configuration loaded from `gallery-sync.toml`.
///
/// All fields have defaults matching the conventional project layout
/// (`photo/` → `public/assets/gallery/` + `public/data/gallery.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Directory whose direct children are candidate media files.
    pub source: PathBuf,
    /// Directory receiving byte-identical copies.
    pub dest: PathBuf,
    /// Manifest file, read at the start of a run and rewritten at the end.
    pub manifest: PathBuf,
    /// Prefix joined with the filename to form each entry's `src`.
    pub serving_prefix: String,
    /// Text written to the manifest's `_comment` key.
    pub comment: String,
    pub header: HeaderConfig,
    pub styling: StylingConfig,
    pub processing: ProcessingConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("photo"),
            dest: PathBuf::from("public/assets/gallery"),
            manifest: PathBuf::from("public/data/gallery.json"),
            serving_prefix: "/assets/gallery".to_string(),
            comment: default_comment(),
            header: HeaderConfig::default(),
            styling: StylingConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

fn default_comment() -> String {
    "Generated from the photo/ folder. caption and date can be edited by hand; \
     they are kept on the next sync."
        .to_string()
}

impl SyncConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.header.prefix_bytes < MIN_PREFIX_BYTES {
            return Err(ConfigError::Validation(format!(
                "header.prefix_bytes must be at least {MIN_PREFIX_BYTES}"
            )));
        }
        if self.styling.palette.is_empty() {
            return Err(ConfigError::Validation(
                "styling.palette must not be empty".into(),
            ));
        }
        if self.styling.palette.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "styling.palette entries must not be blank".into(),
            ));
        }
        let max = self.styling.max_rotation;
        if !max.is_finite() || !(0.0..=ROTATION_LIMIT).contains(&max) {
            return Err(ConfigError::Validation(format!(
                "styling.max_rotation must be between 0 and {ROTATION_LIMIT}"
            )));
        }
        if !self.serving_prefix.starts_with('/') {
            return Err(ConfigError::Validation(
                "serving_prefix must start with '/'".into(),
            ));
        }
        Ok(())
    }
}

/// Header sniffing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeaderConfig {
    /// Bytes read from the start of each photo.
    pub prefix_bytes: usize,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            prefix_bytes: crate::header::DEFAULT_PREFIX_BYTES,
        }
    }
}

/// Defaults given to entries seen for the first time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylingConfig {
    /// New rotations are drawn from `[-max_rotation, max_rotation]`.
    pub max_rotation: f64,
    /// Placeholder colors, picked uniformly.
    pub palette: Vec<String>,
}

pub const DEFAULT_PALETTE: &[&str] = &[
    "#B8C5D6", "#C4B5A5", "#A8B4C4", "#D4C4A0", "#C8B8C8", "#B8A8A0", "#C4A898", "#B5C4B5",
    "#D4B8A0", "#A0B4C8", "#C8C4A8", "#B4A8C8",
];

impl Default for StylingConfig {
    fn default() -> Self {
        Self {
            max_rotation: ROTATION_LIMIT,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel copy/sniff workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SyncConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SyncConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SyncConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, or stock defaults if it does not exist.
pub fn load_config(path: &Path) -> Result<SyncConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Load config from a path the user named explicitly; it must exist.
pub fn load_required_config(path: &Path) -> Result<SyncConfig, ConfigError> {
    match load_raw_config(path)? {
        Some(value) => resolve_config(Some(value)),
        None => Err(ConfigError::NotFound(path.to_path_buf())),
    }
}

/// Returns a fully-commented stock `gallery-sync.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# gallery-sync configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.
# Relative paths are resolved against the working directory.

# Directory scanned for media. Only its direct children are considered;
# subdirectories and hidden files are ignored.
source = "photo"

# Every eligible file is copied here unchanged, under the same filename.
dest = "public/assets/gallery"

# Manifest read at the start of a run (to keep hand edits) and rewritten
# at the end. Missing or unreadable manifests start from scratch.
manifest = "public/data/gallery.json"

# Prefix for each entry's `src` field: "<serving_prefix>/<filename>".
serving_prefix = "/assets/gallery"

# Note written to the manifest's `_comment` key.
comment = "Generated from the photo/ folder. caption and date can be edited by hand; they are kept on the next sync."

# ---------------------------------------------------------------------------
# Header sniffing
# ---------------------------------------------------------------------------
[header]
# Bytes read from the start of each PNG/JPEG/WebP file to find its size.
# Dimensions sit near the start in all three formats.
prefix_bytes = 65536

# ---------------------------------------------------------------------------
# Defaults for new entries
# ---------------------------------------------------------------------------
[styling]
# New entries get a random tilt in [-max_rotation, max_rotation] degrees,
# rounded to one decimal. Must be between 0 and 3.
max_rotation = 3.0

# Placeholder color shown while an item loads, picked at random once.
palette = [
    "#B8C5D6", "#C4B5A5", "#A8B4C4", "#D4C4A0",
    "#C8B8C8", "#B8A8A0", "#C4A898", "#B5C4B5",
    "#D4B8A0", "#A0B4C8", "#C8C4A8", "#B4A8C8",
]

# ---------------------------------------------------------------------------
# Parallel processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of parallel copy workers. Omit to use all CPU cores.
# max_processes = 4
"##
}
