//! PNG: `IHDR` is mandatory and always the first chunk.
//!
//! ```text
//! 0..8    signature
//! 8..12   chunk length
//! 12..16  "IHDR"
//! 16..20  width  (u32 BE)
//! 20..24  height (u32 BE)
//! ```

use super::{Dimensions, be_u32};

const WIDTH_OFFSET: usize = 16;
const HEIGHT_OFFSET: usize = 20;

pub(super) fn dimensions(data: &[u8]) -> Option<Dimensions> {
    Some(Dimensions {
        width: be_u32(data, WIDTH_OFFSET)?,
        height: be_u32(data, HEIGHT_OFFSET)?,
    })
}
