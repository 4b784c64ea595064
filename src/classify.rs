//! Extension-based media classification.
//!
//! A file is eligible when its extension (any case) is on one of two fixed
//! allow-lists. Everything else is silently left out of the manifest and the
//! copy step.

use crate::types::MediaKind;
use std::path::Path;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "avif"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "m4v"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Photo,
    Video,
    Unsupported,
}

impl FileClass {
    /// Media kind for eligible files.
    pub fn kind(self) -> Option<MediaKind> {
        match self {
            Self::Photo => Some(MediaKind::Photo),
            Self::Video => Some(MediaKind::Video),
            Self::Unsupported => None,
        }
    }
}

pub fn classify(filename: &str) -> FileClass {
    let ext = Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        FileClass::Photo
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        FileClass::Video
    } else {
        FileClass::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extensions_are_photos() {
        for name in ["a.jpg", "a.jpeg", "a.png", "a.webp", "a.gif", "a.avif"] {
            assert_eq!(classify(name), FileClass::Photo, "{name}");
        }
    }

    #[test]
    fn video_extensions_are_videos() {
        for name in ["a.mp4", "a.mov", "a.webm", "a.m4v"] {
            assert_eq!(classify(name), FileClass::Video, "{name}");
        }
    }

    #[test]
    fn extension_match_ignores_case() {
        assert_eq!(classify("IMG_0001.JPG"), FileClass::Photo);
        assert_eq!(classify("Clip.MoV"), FileClass::Video);
    }

    #[test]
    fn other_files_are_unsupported() {
        for name in ["notes.txt", "raw.cr2", "README", "archive.jpg.zip", ".png", ""] {
            assert_eq!(classify(name), FileClass::Unsupported, "{name}");
        }
    }

    #[test]
    fn only_last_extension_counts() {
        assert_eq!(classify("holiday.final.png"), FileClass::Photo);
    }

    #[test]
    fn kind_of_each_class() {
        assert_eq!(FileClass::Photo.kind(), Some(MediaKind::Photo));
        assert_eq!(FileClass::Video.kind(), Some(MediaKind::Video));
        assert_eq!(FileClass::Unsupported.kind(), None);
    }
}
