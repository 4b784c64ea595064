//! Aspect classification from pixel dimensions.
//!
//! `width / height` above 1.25 is landscape, below 0.80 is portrait, and
//! anything in between (both bounds included) is square. When the header
//! could not be read the category is drawn uniformly at random, so one
//! unreadable file never blocks a sync. Videos are always landscape.

use crate::header::Dimensions;
use crate::types::{Aspect, MediaKind};
use rand::Rng;

pub const LANDSCAPE_ABOVE: f64 = 1.25;
pub const PORTRAIT_BELOW: f64 = 0.80;

/// Classify known dimensions. Expects a non-zero height.
pub fn from_dimensions(dims: Dimensions) -> Aspect {
    let ratio = f64::from(dims.width) / f64::from(dims.height);
    if ratio > LANDSCAPE_ABOVE {
        Aspect::Landscape
    } else if ratio < PORTRAIT_BELOW {
        Aspect::Portrait
    } else {
        Aspect::Square
    }
}

/// Uniform pick among the three categories.
pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Aspect {
    Aspect::ALL[rng.random_range(0..Aspect::ALL.len())]
}

/// Classify a photo, falling back to [`random`] for unknown or degenerate
/// dimensions.
pub fn classify<R: Rng + ?Sized>(dims: Option<Dimensions>, rng: &mut R) -> Aspect {
    match dims {
        Some(d) if d.width > 0 && d.height > 0 => from_dimensions(d),
        _ => random(rng),
    }
}

/// Aspect for a media item of any kind.
pub fn for_media<R: Rng + ?Sized>(kind: MediaKind, dims: Option<Dimensions>, rng: &mut R) -> Aspect {
    match kind {
        MediaKind::Video => Aspect::Landscape,
        MediaKind::Photo => classify(dims, rng),
    }
}
