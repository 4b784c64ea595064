//! JPEG: walk the marker stream until the first start-of-frame segment.
//!
//! Every marker is `0xFF` followed by a code byte. Segments that carry a
//! payload declare a big-endian u16 length counting itself but not the marker.
//! The SOF payload layout is:
//!
//! ```text
//! +0  FF Cn      marker
//! +2  length     u16 BE
//! +4  precision  u8
//! +5  height     u16 BE
//! +7  width      u16 BE
//! ```

use super::{Dimensions, be_u16};

const SOF0: u8 = 0xC0; // baseline
const SOF1: u8 = 0xC1; // extended sequential
const SOF2: u8 = 0xC2; // progressive
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;

/// The stream starts with SOI (`FF D8`).
const SCAN_START: usize = 2;

pub(super) fn dimensions(data: &[u8]) -> Option<Dimensions> {
    let mut pos = SCAN_START;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        match data[pos + 1] {
            SOF0 | SOF1 | SOF2 => {
                let height = be_u16(data, pos + 5)?;
                let width = be_u16(data, pos + 7)?;
                return Some(Dimensions {
                    width: u32::from(width),
                    height: u32::from(height),
                });
            }
            // Image data begins before any frame header: nothing to read.
            EOI | SOS => return None,
            // Fill byte before the real marker
            0xFF => pos += 1,
            // Standalone markers carry no length
            0x01 | 0xD0..=0xD8 => pos += 2,
            _ => {
                let len = usize::from(be_u16(data, pos + 2)?);
                pos += 2 + len;
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{jpeg_header, jpeg_with_sof};

    fn dims(width: u32, height: u32) -> Option<Dimensions> {
        Some(Dimensions { width, height })
    }

    #[test]
    fn reads_baseline_frame() {
        assert_eq!(dimensions(&jpeg_header(1024, 768)), dims(1024, 768));
    }

    #[test]
    fn height_precedes_width_in_stream() {
        let data = jpeg_header(0x0102, 0x0304);
        let sof = data
            .windows(2)
            .position(|w| w == [0xFF, SOF0])
            .expect("SOF0 present");
        assert_eq!(&data[sof + 5..sof + 9], &[0x03, 0x04, 0x01, 0x02]);
        assert_eq!(dimensions(&data), dims(0x0102, 0x0304));
    }

    #[test]
    fn reads_extended_and_progressive_frames() {
        assert_eq!(dimensions(&jpeg_with_sof(SOF1, 300, 200)), dims(300, 200));
        assert_eq!(dimensions(&jpeg_with_sof(SOF2, 300, 200)), dims(300, 200));
    }

    #[test]
    fn other_sof_variants_are_skipped() {
        // SOF3 (lossless) is not one of the frames we read; its segment is
        // skipped and the scan runs off the end.
        assert_eq!(dimensions(&jpeg_with_sof(0xC3, 300, 200)), None);
    }

    #[test]
    fn skips_segments_by_declared_length() {
        // APP1 whose payload contains a decoy SOF0 marker.
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x0B];
        data.extend_from_slice(&[0xFF, SOF0, 0x00, 0x11, 0x08, 0x00, 0x01, 0x00, 0x01]);
        data.extend_from_slice(&jpeg_header(640, 480)[2..]);
        assert_eq!(dimensions(&data), dims(640, 480));
    }

    #[test]
    fn fill_bytes_and_standalone_markers_are_stepped_over() {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xFF, 0xFF, 0xD0];
        data.extend_from_slice(&jpeg_header(50, 40)[2..]);
        assert_eq!(dimensions(&data), dims(50, 40));
    }

    #[test]
    fn stray_bytes_between_segments_are_stepped_over() {
        let mut data = vec![0xFF, 0xD8, 0x00, 0x00];
        data.extend_from_slice(&jpeg_header(50, 40)[2..]);
        assert_eq!(dimensions(&data), dims(50, 40));
    }

    #[test]
    fn start_of_scan_before_frame_is_unknown() {
        let mut data = vec![0xFF, 0xD8, 0xFF, SOS, 0x00, 0x02];
        data.extend_from_slice(&jpeg_header(640, 480)[2..]);
        assert_eq!(dimensions(&data), None);
    }

    #[test]
    fn end_of_image_before_frame_is_unknown() {
        let mut data = vec![0xFF, 0xD8, 0xFF, EOI];
        data.extend_from_slice(&jpeg_header(640, 480)[2..]);
        assert_eq!(dimensions(&data), None);
    }

    #[test]
    fn truncated_frame_payload_is_unknown() {
        let data = jpeg_header(640, 480);
        let sof = data.windows(2).position(|w| w == [0xFF, SOF0]).unwrap();
        assert_eq!(dimensions(&data[..sof + 8]), None);
        assert_eq!(dimensions(&data[..sof + 9]), dims(640, 480));
    }

    #[test]
    fn segment_length_past_buffer_end_is_unknown() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0xFF, 0xFF, 0x00];
        assert_eq!(dimensions(&data), None);
    }

    #[test]
    fn bare_soi_is_unknown() {
        assert_eq!(dimensions(&[0xFF, 0xD8]), None);
        assert_eq!(dimensions(&[0xFF]), None);
    }
}
