//! WebP: a RIFF container whose first chunk tag (offset 12) names the encoding.
//!
//! | Tag | Fields | Encoding |
//! |---|---|---|
//! | `VP8 ` | u16 LE @26, u16 LE @28 | low 14 bits, `value - 1` |
//! | `VP8L` | u32 LE @21 | bits 0..14 width, 14..28 height, `value - 1` |
//! | `VP8X` | u24 LE @24, u24 LE @27 | `value - 1` |

use super::{Dimensions, HeaderLayout, le_u16, le_u24, le_u32};

/// Shortest buffer that can hold any of the three layouts.
const MIN_LEN: usize = 30;
const TAG_OFFSET: usize = 12;

const FOURTEEN_BITS: u32 = 0x3FFF;

pub(super) fn layout(data: &[u8]) -> Option<HeaderLayout> {
    if data.len() < MIN_LEN {
        return None;
    }
    match data.get(TAG_OFFSET..TAG_OFFSET + 4)? {
        b"VP8 " => Some(HeaderLayout::WebpLossy),
        b"VP8L" => Some(HeaderLayout::WebpLossless),
        b"VP8X" => Some(HeaderLayout::WebpExtended),
        _ => None,
    }
}

pub(super) fn lossy_dimensions(data: &[u8]) -> Option<Dimensions> {
    let width = u32::from(le_u16(data, 26)?) & FOURTEEN_BITS;
    let height = u32::from(le_u16(data, 28)?) & FOURTEEN_BITS;
    Some(Dimensions {
        width: width + 1,
        height: height + 1,
    })
}

pub(super) fn lossless_dimensions(data: &[u8]) -> Option<Dimensions> {
    let bits = le_u32(data, 21)?;
    Some(Dimensions {
        width: (bits & FOURTEEN_BITS) + 1,
        height: ((bits >> 14) & FOURTEEN_BITS) + 1,
    })
}

pub(super) fn extended_dimensions(data: &[u8]) -> Option<Dimensions> {
    Some(Dimensions {
        width: le_u24(data, 24)? + 1,
        height: le_u24(data, 27)? + 1,
    })
}
