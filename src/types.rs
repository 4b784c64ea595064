//! Manifest types shared by the merger, the synchronizer and the CLI.
//!
//! Two views of the manifest file exist:
//!
//! - [`Manifest`] / [`MediaEntry`]: what a run writes. Strict, every field
//!   present, keys in a fixed order.
//! - [`StoredManifest`] / [`StoredEntry`]: what a run reads back. The file is
//!   edited by hand between runs, so every field is optional, unknown keys are
//!   ignored, and a malformed entry is skipped rather than failing the file.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

/// Photo or video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
        }
    }
}

/// Layout category used by the gallery grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aspect {
    Square,
    Portrait,
    Landscape,
}

impl Aspect {
    pub const ALL: [Aspect; 3] = [Aspect::Square, Aspect::Portrait, Aspect::Landscape];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }
}

/// The manifest file as written by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Free-text note for whoever edits the file by hand.
    #[serde(rename = "_comment")]
    pub comment: String,
    pub photos: Vec<MediaEntry>,
}

/// One media item.
///
/// `caption`, `date`, `placeholder_color`, `rotation` (and a video's
/// `poster_path`) are editable: they are set once and then carried forward
/// from the previous manifest. `id` and `aspect` are recomputed every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaEntry {
    /// `"{kind}-{sequence:03}"`, unique within one manifest only.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Serving path, e.g. `/assets/gallery/beach.jpg`.
    #[serde(rename = "src")]
    pub path: String,
    pub caption: String,
    pub date: String,
    pub placeholder_color: String,
    #[serde(serialize_with = "serialize_rotation")]
    pub rotation: f64,
    pub aspect: Aspect,
    /// Video poster image; always `Some` for videos, `None` for photos.
    #[serde(
        rename = "poster",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub poster_path: Option<String>,
}

impl MediaEntry {
    /// Source filename, the key that joins entries across runs.
    pub fn filename(&self) -> &str {
        basename(&self.path)
    }
}

/// Last path segment of a serving path.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Round to one decimal place, normalizing `-0.0` to `0.0`.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0 + 0.0
}

fn serialize_rotation<S: Serializer>(rotation: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_tenth(*rotation))
}

// =============================================================================
// Previous-manifest view
// =============================================================================

/// A previously written manifest, read leniently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredManifest {
    pub photos: Vec<StoredEntry>,
}

/// The fields of a previous entry that a merge can carry forward.
///
/// Each field is read on its own: a value of the wrong JSON type becomes
/// `None` without affecting its neighbours.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoredEntry {
    #[serde(deserialize_with = "lenient")]
    pub src: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub caption: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub rotation: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub placeholder_color: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub poster: Option<String>,
}

/// Any JSON value; `None` unless it has the expected type.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

impl StoredManifest {
    /// Parse manifest JSON.
    ///
    /// Fails only when the text is not JSON at all. A missing or non-array
    /// `photos` key gives an empty manifest. Entries that are not objects are
    /// skipped with a warning; a mistyped field drops only that field.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let Some(entries) = value.get("photos").and_then(|p| p.as_array()) else {
            return Ok(Self::default());
        };

        let photos = entries
            .iter()
            .enumerate()
            .filter_map(
                |(index, entry)| match StoredEntry::deserialize(entry) {
                    Ok(stored) => Some(stored),
                    Err(err) => {
                        warn!(index, error = %err, "skipping malformed manifest entry");
                        None
                    }
                },
            )
            .collect();

        Ok(Self { photos })
    }
}

impl StoredEntry {
    /// Filename this entry was written for, if it has a usable `src`.
    pub fn filename(&self) -> Option<&str> {
        self.src
            .as_deref()
            .map(basename)
            .filter(|name| !name.is_empty())
    }
}
