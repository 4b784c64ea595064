//! Manifest merging.
//!
//! Combines the previous manifest (possibly hand-edited) with the files
//! observed in the current run. The filename is the join key; `id` is
//! re-sequenced every run and never used for matching.
//!
//! For each observed file, in shuffled order:
//!
//! - [`Prior::Found`]: caption, date, rotation and placeholder color are
//!   copied verbatim. A stored record missing rotation or color gets a fresh
//!   default for that field only.
//! - [`Prior::New`]: empty caption and date, a random rotation in
//!   `[-max_rotation, max_rotation]` rounded to one decimal, and a random
//!   palette color.
//!
//! Aspect is always recomputed. Previous entries whose file is gone are
//! dropped.
//!
//! All randomness comes from the caller's RNG, so a seeded RNG gives an
//! exact, repeatable manifest.

use crate::aspect;
use crate::config::{DEFAULT_PALETTE, ROTATION_LIMIT, SyncConfig};
use crate::header::Dimensions;
use crate::types::{MediaEntry, MediaKind, StoredManifest, round_tenth};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use std::collections::{HashMap, HashSet};

/// Fallback color should the palette be empty.
const FALLBACK_COLOR: &str = "#B8C5D6";

/// Inputs the merger needs beyond the two manifests.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOptions {
    /// Joined with the filename to form `src`.
    pub serving_prefix: String,
    pub palette: Vec<String>,
    pub max_rotation: f64,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            serving_prefix: "/assets/gallery".to_string(),
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            max_rotation: ROTATION_LIMIT,
        }
    }
}

impl MergeOptions {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            serving_prefix: config.serving_prefix.clone(),
            palette: config.styling.palette.clone(),
            max_rotation: config.styling.max_rotation,
        }
    }

    fn serving_path(&self, filename: &str) -> String {
        format!("{}/{}", self.serving_prefix.trim_end_matches('/'), filename)
    }

    /// Out-of-range or non-finite limits fall back to [`ROTATION_LIMIT`].
    fn random_rotation<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let max = if self.max_rotation.is_finite() {
            self.max_rotation.abs().min(ROTATION_LIMIT)
        } else {
            ROTATION_LIMIT
        };
        if max == 0.0 {
            return 0.0;
        }
        round_tenth(rng.random_range(-max..=max))
    }

    fn random_color<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        self.palette
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| FALLBACK_COLOR.to_string())
    }
}

// =============================================================================
// Previous state
// =============================================================================

/// Editable fields carried forward for one filename.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredFields {
    pub caption: String,
    pub date: String,
    pub rotation: Option<f64>,
    pub placeholder_color: Option<String>,
    pub poster: Option<String>,
}

/// What the previous manifest knows about a filename.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prior<'a> {
    Found(&'a StoredFields),
    New,
}

/// Filename → stored fields, built from the previous manifest.
#[derive(Debug, Clone, Default)]
pub struct PreviousState {
    by_filename: HashMap<String, StoredFields>,
}

impl PreviousState {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Index a stored manifest by `src` basename.
    ///
    /// Entries without a usable `src` are ignored. When two entries share a
    /// filename the first one wins.
    pub fn from_manifest(manifest: &StoredManifest) -> Self {
        let mut by_filename = HashMap::new();
        for entry in &manifest.photos {
            let Some(name) = entry.filename() else {
                continue;
            };
            by_filename
                .entry(name.to_string())
                .or_insert_with(|| StoredFields {
                    caption: entry.caption.clone().unwrap_or_default(),
                    date: entry.date.clone().unwrap_or_default(),
                    rotation: entry.rotation.filter(|r| r.is_finite()),
                    placeholder_color: entry.placeholder_color.clone(),
                    poster: entry.poster.clone(),
                });
        }
        Self { by_filename }
    }

    pub fn lookup(&self, filename: &str) -> Prior<'_> {
        match self.by_filename.get(filename) {
            Some(fields) => Prior::Found(fields),
            None => Prior::New,
        }
    }

    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.by_filename.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_filename.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_filename.is_empty()
    }
}

// =============================================================================
// Merge
// =============================================================================

/// A file seen in the current run.
#[derive(Debug, Clone, PartialEq)]
pub struct Observed {
    pub filename: String,
    pub kind: MediaKind,
    /// Header dimensions; `None` when unreadable or for videos.
    pub dimensions: Option<Dimensions>,
}

/// Counts reported after a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Files with no previous record.
    pub added: usize,
    /// Files whose editable fields were carried forward.
    pub preserved: usize,
    /// Previous filenames no longer present.
    pub removed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    pub entries: Vec<MediaEntry>,
    pub stats: MergeStats,
}

struct EditableFields {
    caption: String,
    date: String,
    rotation: f64,
    placeholder_color: String,
    poster: Option<String>,
}

impl EditableFields {
    fn resolve<R: Rng + ?Sized>(
        prior: Prior<'_>,
        kind: MediaKind,
        options: &MergeOptions,
        rng: &mut R,
    ) -> Self {
        let (caption, date, rotation, color, poster) = match prior {
            Prior::Found(stored) => (
                stored.caption.clone(),
                stored.date.clone(),
                stored.rotation,
                stored.placeholder_color.clone(),
                stored.poster.clone(),
            ),
            Prior::New => (String::new(), String::new(), None, None, None),
        };

        let rotation = rotation.unwrap_or_else(|| options.random_rotation(rng));
        let placeholder_color = color.unwrap_or_else(|| options.random_color(rng));
        let poster = match kind {
            MediaKind::Video => Some(poster.unwrap_or_default()),
            MediaKind::Photo => None,
        };

        Self {
            caption,
            date,
            rotation,
            placeholder_color,
            poster,
        }
    }
}

/// Merge the current listing with the previous state.
///
/// The listing is shuffled with `rng` before sequence numbers are assigned,
/// so entry order (and `id`) changes from run to run.
pub fn merge<R: Rng + ?Sized>(
    previous: &PreviousState,
    mut current: Vec<Observed>,
    options: &MergeOptions,
    rng: &mut R,
) -> MergeResult {
    let present: HashSet<&str> = current.iter().map(|f| f.filename.as_str()).collect();
    let removed = previous
        .filenames()
        .filter(|name| !present.contains(name))
        .count();

    current.shuffle(rng);

    let mut stats = MergeStats {
        removed,
        ..MergeStats::default()
    };
    let mut entries = Vec::with_capacity(current.len());

    for (position, file) in current.into_iter().enumerate() {
        let prior = previous.lookup(&file.filename);
        match prior {
            Prior::Found(_) => stats.preserved += 1,
            Prior::New => stats.added += 1,
        }

        let aspect = aspect::for_media(file.kind, file.dimensions, rng);
        let fields = EditableFields::resolve(prior, file.kind, options, rng);

        entries.push(MediaEntry {
            id: format!("{}-{:03}", file.kind.as_str(), position + 1),
            kind: file.kind,
            path: options.serving_path(&file.filename),
            caption: fields.caption,
            date: fields.date,
            placeholder_color: fields.placeholder_color,
            rotation: fields.rotation,
            aspect,
            poster_path: fields.poster,
        });
    }

    MergeResult { entries, stats }
}
