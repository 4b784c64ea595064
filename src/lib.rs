//! # Gallery Sync
//!
//! Keeps a web gallery's media folder and its JSON manifest in step with a
//! source folder of photos and videos. The manifest is also edited by hand
//! (captions, dates), so a sync never clobbers those edits: it merges.
//!
//! # Pipeline
//!
//! ```text
//! photo/            →  public/assets/gallery/     (byte-identical copies)
//!   ├─ classify by extension
//!   ├─ sniff PNG / JPEG / WebP headers for dimensions
//!   └─ merge with public/data/gallery.json  →  public/data/gallery.json
//! ```
//!
//! A run is one bounded batch: list, copy, sniff, merge, write. Nothing is
//! cached between runs except the manifest itself.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`sync`] | Drives a run: scan the source, copy, sniff, merge, atomic write |
//! | [`merge`] | Carries editable fields forward by filename, assigns ids and defaults |
//! | [`header`] | Reads width/height from the first bytes of PNG, JPEG and WebP files |
//! | [`aspect`] | Maps dimensions to `square` / `portrait` / `landscape` |
//! | [`classify`] | Extension allow-lists for photos and videos |
//! | [`config`] | `gallery-sync.toml` loading, layering over stock defaults, validation |
//! | [`types`] | Manifest types, strict for writing and lenient for reading back |
//! | [`output`] | CLI output formatting for sync and check runs |
//!
//! # Design Decisions
//!
//! ## Filename Is the Join Key
//!
//! Entry order is reshuffled on every run so the gallery shows a fresh
//! arrangement, which means `id` (`photo-001`, ...) changes too. The only
//! stable identity is the source filename, taken from the basename of `src`.
//! Renaming a file therefore starts it over with empty caption and date.
//!
//! ## Header Sniffing, Not Decoding
//!
//! Only the first [`header::DEFAULT_PREFIX_BYTES`] of each photo are read and
//! no pixel data is touched. When a header cannot be read the file still
//! syncs with a random aspect; one odd file never blocks the run.
//!
//! ## Injected Randomness
//!
//! Shuffling and default styling draw from a caller-supplied [`rand::Rng`].
//! The CLI seeds it from the OS unless `--seed` is given, and tests use
//! `StdRng::seed_from_u64` to assert exact manifests.

pub mod aspect;
pub mod classify;
pub mod config;
pub mod header;
pub mod merge;
pub mod output;
pub mod sync;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
