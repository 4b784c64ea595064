//! Image dimension sniffing from container headers.
//!
//! Reads pixel dimensions from the first bytes of a file without decoding any
//! pixel data. Three containers are understood:
//!
//! | Format | Where the dimensions live | Byte order |
//! |---|---|---|
//! | PNG | `IHDR` chunk at offsets 16 / 20 | big-endian u32 |
//! | JPEG | first SOF0/SOF1/SOF2 segment, height before width | big-endian u16 |
//! | WebP `VP8 ` | frame header at offsets 26 / 28, 14 bits each | little-endian |
//! | WebP `VP8L` | one u32 at offset 21, two 14-bit fields | little-endian |
//! | WebP `VP8X` | canvas size at offsets 24 / 27, 24 bits each | little-endian |
//!
//! The extension only tells us the container ([`HeaderFormat`]). The concrete
//! layout ([`HeaderLayout`]) is chosen from the bytes themselves, which for
//! WebP means the chunk tag at offset 12.
//!
//! Every parser works on a borrowed prefix and never indexes past its end:
//! truncated, malformed or unrecognized input yields `None`. Callers fall back
//! to a random aspect in that case (see [`crate::aspect`]).

mod jpeg;
mod png;
mod webp;

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// Bytes read from the start of a file before sniffing.
///
/// All three formats put their dimensions well inside this window.
pub const DEFAULT_PREFIX_BYTES: usize = 64 * 1024;

/// Pixel dimensions read from a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Container format, as declared by the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFormat {
    Png,
    Jpeg,
    Webp,
}

impl HeaderFormat {
    /// Map a file extension (without the dot, any case) to a sniffable format.
    ///
    /// Photo formats without a sniffer (`gif`, `avif`) return `None`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Concrete byte layout of a header, one parser per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLayout {
    Png,
    Jpeg,
    WebpLossy,
    WebpLossless,
    WebpExtended,
}

impl HeaderLayout {
    /// Pick the layout for a buffer declared to be `format`.
    pub fn detect(format: HeaderFormat, data: &[u8]) -> Option<Self> {
        match format {
            HeaderFormat::Png => Some(Self::Png),
            HeaderFormat::Jpeg => Some(Self::Jpeg),
            HeaderFormat::Webp => webp::layout(data),
        }
    }

    /// Read dimensions assuming this layout.
    pub fn parse(self, data: &[u8]) -> Option<Dimensions> {
        match self {
            Self::Png => png::dimensions(data),
            Self::Jpeg => jpeg::dimensions(data),
            Self::WebpLossy => webp::lossy_dimensions(data),
            Self::WebpLossless => webp::lossless_dimensions(data),
            Self::WebpExtended => webp::extended_dimensions(data),
        }
    }
}

/// Sniff dimensions from the leading bytes of a file.
///
/// A zero width or height is treated as unreadable.
pub fn sniff(data: &[u8], format: HeaderFormat) -> Option<Dimensions> {
    HeaderLayout::detect(format, data)?
        .parse(data)
        // No valid PNG/JPEG/WebP has a zero side; such a file gets a random aspect
        .filter(|d| d.width > 0 && d.height > 0)
}

/// Read at most `limit` bytes from the start of `path`.
pub fn read_prefix(path: &Path, limit: usize) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut buf = Vec::with_capacity(limit.min(DEFAULT_PREFIX_BYTES));
    file.take(limit as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Read a bounded prefix of `path` and sniff it.
///
/// I/O errors are absorbed the same way parse failures are.
pub fn probe_file(path: &Path, format: HeaderFormat, limit: usize) -> Option<Dimensions> {
    let data = match read_prefix(path, limit) {
        Ok(data) => data,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "header read failed");
            return None;
        }
    };
    let dims = sniff(&data, format);
    if dims.is_none() {
        debug!(path = %path.display(), ?format, bytes = data.len(), "header not recognized");
    }
    dims
}

// ---------------------------------------------------------------------------
// Bounds-checked integer reads
// ---------------------------------------------------------------------------

fn bytes<const N: usize>(data: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    data.get(offset..end)?.try_into().ok()
}

pub(crate) fn be_u16(data: &[u8], offset: usize) -> Option<u16> {
    bytes::<2>(data, offset).map(u16::from_be_bytes)
}

pub(crate) fn be_u32(data: &[u8], offset: usize) -> Option<u32> {
    bytes::<4>(data, offset).map(u32::from_be_bytes)
}

pub(crate) fn le_u16(data: &[u8], offset: usize) -> Option<u16> {
    bytes::<2>(data, offset).map(u16::from_le_bytes)
}

pub(crate) fn le_u24(data: &[u8], offset: usize) -> Option<u32> {
    bytes::<3>(data, offset).map(|[a, b, c]| u32::from_le_bytes([a, b, c, 0]))
}

pub(crate) fn le_u32(data: &[u8], offset: usize) -> Option<u32> {
    bytes::<4>(data, offset).map(u32::from_le_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::fs;
    use tempfile::TempDir;

    // =========================================================================
    // Format hints
    // =========================================================================

    #[test]
    fn format_from_extension_is_case_insensitive() {
        assert_eq!(HeaderFormat::from_extension("PNG"), Some(HeaderFormat::Png));
        assert_eq!(HeaderFormat::from_extension("Jpeg"), Some(HeaderFormat::Jpeg));
        assert_eq!(HeaderFormat::from_extension("jpg"), Some(HeaderFormat::Jpeg));
        assert_eq!(HeaderFormat::from_extension("webp"), Some(HeaderFormat::Webp));
    }

    #[test]
    fn formats_without_sniffer_have_no_hint() {
        assert_eq!(HeaderFormat::from_extension("gif"), None);
        assert_eq!(HeaderFormat::from_extension("avif"), None);
        assert_eq!(HeaderFormat::from_path(Path::new("clip")), None);
    }

    #[test]
    fn layout_detection_follows_webp_tag() {
        assert_eq!(
            HeaderLayout::detect(HeaderFormat::Webp, &webp_lossy(10, 10)),
            Some(HeaderLayout::WebpLossy)
        );
        assert_eq!(
            HeaderLayout::detect(HeaderFormat::Webp, &webp_lossless(10, 10)),
            Some(HeaderLayout::WebpLossless)
        );
        assert_eq!(
            HeaderLayout::detect(HeaderFormat::Webp, &webp_extended(10, 10)),
            Some(HeaderLayout::WebpExtended)
        );
        assert_eq!(
            HeaderLayout::detect(HeaderFormat::Png, &[]),
            Some(HeaderLayout::Png)
        );
    }

    // =========================================================================
    // sniff
    // =========================================================================

    #[test]
    fn sniff_dispatches_each_format() {
        let expected = Some(Dimensions {
            width: 640,
            height: 480,
        });
        assert_eq!(sniff(&png_header(640, 480), HeaderFormat::Png), expected);
        assert_eq!(sniff(&jpeg_header(640, 480), HeaderFormat::Jpeg), expected);
        assert_eq!(sniff(&webp_lossy(640, 480), HeaderFormat::Webp), expected);
        assert_eq!(sniff(&webp_lossless(640, 480), HeaderFormat::Webp), expected);
        assert_eq!(sniff(&webp_extended(640, 480), HeaderFormat::Webp), expected);
    }

    #[test]
    fn sniff_rejects_zero_dimensions() {
        assert_eq!(sniff(&png_header(0, 480), HeaderFormat::Png), None);
        assert_eq!(sniff(&jpeg_header(640, 0), HeaderFormat::Jpeg), None);
    }

    #[test]
    fn sniff_with_mismatched_hint_is_unknown() {
        // A PNG declared as WebP has no recognizable chunk tag.
        assert_eq!(sniff(&png_header(640, 480), HeaderFormat::Webp), None);
        // A WebP declared as JPEG hits no SOF marker.
        assert_eq!(sniff(&webp_lossy(640, 480), HeaderFormat::Jpeg), None);
    }

    #[test]
    fn empty_buffer_is_unknown_for_every_format() {
        for format in [HeaderFormat::Png, HeaderFormat::Jpeg, HeaderFormat::Webp] {
            assert_eq!(sniff(&[], format), None, "{format:?}");
        }
    }

    #[test]
    fn every_truncation_is_unknown_or_exact() {
        let full = [
            (png_header(300, 200), HeaderFormat::Png),
            (jpeg_header(300, 200), HeaderFormat::Jpeg),
            (webp_lossy(300, 200), HeaderFormat::Webp),
            (webp_lossless(300, 200), HeaderFormat::Webp),
            (webp_extended(300, 200), HeaderFormat::Webp),
        ];
        for (data, format) in &full {
            for len in 0..data.len() {
                let result = sniff(&data[..len], *format);
                assert!(
                    result.is_none()
                        || result
                            == Some(Dimensions {
                                width: 300,
                                height: 200
                            }),
                    "{format:?} truncated at {len} gave {result:?}"
                );
            }
        }
    }

    // =========================================================================
    // File probing
    // =========================================================================

    #[test]
    fn probe_reads_dimensions_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("shot.png");
        let mut data = png_header(1920, 1080);
        data.extend(std::iter::repeat_n(0u8, 4096));
        fs::write(&path, &data).unwrap();

        assert_eq!(
            probe_file(&path, HeaderFormat::Png, DEFAULT_PREFIX_BYTES),
            Some(Dimensions {
                width: 1920,
                height: 1080
            })
        );
    }

    #[test]
    fn probe_respects_prefix_limit() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("shot.png");
        fs::write(&path, png_header(1920, 1080)).unwrap();

        assert_eq!(probe_file(&path, HeaderFormat::Png, 20), None);
        assert_eq!(read_prefix(&path, 20).unwrap().len(), 20);
    }

    #[test]
    fn probe_missing_file_is_unknown() {
        assert_eq!(
            probe_file(
                Path::new("/nonexistent/shot.jpg"),
                HeaderFormat::Jpeg,
                DEFAULT_PREFIX_BYTES
            ),
            None
        );
    }

    // =========================================================================
    // Integer readers
    // =========================================================================

    #[test]
    fn readers_stop_at_buffer_end() {
        let data = [0x01, 0x02, 0x03];
        assert_eq!(be_u16(&data, 1), Some(0x0203));
        assert_eq!(be_u16(&data, 2), None);
        assert_eq!(le_u24(&data, 0), Some(0x030201));
        assert_eq!(le_u32(&data, 0), None);
        assert_eq!(be_u32(&data, usize::MAX), None);
    }
}
