//! Shared test utilities for the gallery-sync test suite.
//!
//! Provides byte builders for minimal image headers, fixture writers for
//! source directories, and lookup helpers over merged manifests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_media(tmp.path(), "beach.png", &png_header(1600, 900));
//!
//! let entry = find_entry(&manifest, "beach.png");
//! assert_eq!(entry.aspect, Aspect::Landscape);
//! ```

use std::path::Path;

use crate::types::{Manifest, MediaEntry};

// =========================================================================
// Header builders
// =========================================================================

/// Signature plus a complete `IHDR` chunk (CRC left zeroed).
pub fn png_header(width: u32, height: u32) -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    // bit depth, color type, compression, filter, interlace
    data.extend_from_slice(&[8, 2, 0, 0, 0]);
    data.extend_from_slice(&[0, 0, 0, 0]);
    data
}

/// SOI, a JFIF APP0 segment, then a frame segment with the given SOF code.
pub fn jpeg_with_sof(sof: u8, width: u16, height: u16) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    // APP0 "JFIF\0" v1.1, no thumbnail
    data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    data.extend_from_slice(b"JFIF\0");
    data.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
    // SOF, one component: length 11
    data.extend_from_slice(&[0xFF, sof, 0x00, 0x0B, 0x08]);
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&[0x01, 0x01, 0x11, 0x00]);
    data
}

/// Baseline (SOF0) JPEG header.
pub fn jpeg_header(width: u16, height: u16) -> Vec<u8> {
    jpeg_with_sof(0xC0, width, height)
}

/// RIFF/WEBP container with a single chunk.
pub fn riff_webp(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut data = b"RIFF".to_vec();
    data.extend_from_slice(&((payload.len() + 12) as u32).to_le_bytes());
    data.extend_from_slice(b"WEBP");
    data.extend_from_slice(tag);
    data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    data.extend_from_slice(payload);
    data
}

/// `VP8 ` chunk: frame tag, start code, then 14-bit width/height.
pub fn webp_lossy(width: u32, height: u32) -> Vec<u8> {
    let mut payload = vec![0x00, 0x00, 0x00, 0x9D, 0x01, 0x2A];
    payload.extend_from_slice(&(((width - 1) & 0x3FFF) as u16).to_le_bytes());
    payload.extend_from_slice(&(((height - 1) & 0x3FFF) as u16).to_le_bytes());
    riff_webp(b"VP8 ", &payload)
}

/// `VP8L` chunk: signature byte, then the packed size word.
pub fn webp_lossless(width: u32, height: u32) -> Vec<u8> {
    let bits = ((width - 1) & 0x3FFF) | (((height - 1) & 0x3FFF) << 14);
    let mut payload = vec![0x2F];
    payload.extend_from_slice(&bits.to_le_bytes());
    payload.extend_from_slice(&[0x00; 5]);
    riff_webp(b"VP8L", &payload)
}

/// `VP8X` chunk: flags, reserved, then 24-bit canvas width/height.
pub fn webp_extended(width: u32, height: u32) -> Vec<u8> {
    let mut payload = vec![0x10, 0x00, 0x00, 0x00];
    payload.extend_from_slice(&(width - 1).to_le_bytes()[..3]);
    payload.extend_from_slice(&(height - 1).to_le_bytes()[..3]);
    riff_webp(b"VP8X", &payload)
}

// =========================================================================
// Fixture writers
// =========================================================================

/// Write a media file into `dir`, creating the directory if needed.
pub fn write_media(dir: &Path, name: &str, bytes: &[u8]) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(name), bytes).unwrap();
}

// =========================================================================
// Manifest lookups (panic with the available names on a miss)
// =========================================================================

/// Find an entry by source filename. Panics if not found.
pub fn find_entry<'a>(manifest: &'a Manifest, filename: &str) -> &'a MediaEntry {
    find_in(&manifest.photos, filename)
}

/// Find an entry in a slice by source filename. Panics if not found.
pub fn find_in<'a>(entries: &'a [MediaEntry], filename: &str) -> &'a MediaEntry {
    entries
        .iter()
        .find(|e| e.filename() == filename)
        .unwrap_or_else(|| {
            let names: Vec<&str> = entries.iter().map(|e| e.filename()).collect();
            panic!("entry '{filename}' not found. Available: {names:?}")
        })
}

/// Source filenames, sorted, for order-independent comparisons.
pub fn sorted_filenames(entries: &[MediaEntry]) -> Vec<String> {
    let mut names: Vec<String> = entries.iter().map(|e| e.filename().to_string()).collect();
    names.sort();
    names
}
