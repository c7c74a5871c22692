// ============================================================================
// CHROMA KEY: zero alpha on pixels close to any of 1–3 target colours
// ============================================================================
//
// Distance is Euclidean in RGB, compared squared against `threshold²` in
// integers. RGB bytes are never written.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TranspalentorError};
use crate::raster::{CHANNELS, RasterImage};

/// Most colours a single keying call accepts.
pub const MAX_TARGET_COLORS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl TargetColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for TargetColor {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<(u8, u8, u8)> for TargetColor {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

/// Ordered, non-empty list of 1–3 key colours.
///
/// Single-colour and multi-colour requests both end up here, so the hot loop
/// only ever sees one shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetColorSet(Vec<TargetColor>);

impl TargetColorSet {
    pub fn new(colors: Vec<TargetColor>) -> Result<Self> {
        if colors.is_empty() {
            return Err(TranspalentorError::ColorNotSpecified);
        }
        if colors.len() > MAX_TARGET_COLORS {
            return Err(TranspalentorError::InvalidParameter(format!(
                "at most {} target colors allowed, got {}",
                MAX_TARGET_COLORS,
                colors.len()
            )));
        }
        Ok(Self(colors))
    }

    pub fn single(color: TargetColor) -> Self {
        Self(vec![color])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetColor> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[TargetColor] {
        &self.0
    }
}

/// Maximum Euclidean RGB distance still counted as a match. 0 = exact match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Threshold(pub u8);

impl Threshold {
    #[inline]
    fn squared(self) -> u32 {
        let t = self.0 as u32;
        t * t
    }
}

/// Squared Euclidean distance in RGB space.
#[inline]
fn color_dist_sq(r: u8, g: u8, b: u8, target: &TargetColor) -> u32 {
    let dr = r as i32 - target.r as i32;
    let dg = g as i32 - target.g as i32;
    let db = b as i32 - target.b as i32;
    (dr * dr + dg * dg + db * db) as u32
}

/// `true` when the pixel is within `threshold` of any target.
///
/// `sqrt(d²) <= t` and `d² <= t²` agree for every integer input, so the
/// comparison stays in integers.
#[inline]
fn matches_any(r: u8, g: u8, b: u8, targets: &[TargetColor], threshold_sq: u32) -> bool {
    targets
        .iter()
        .any(|t| color_dist_sq(r, g, b, t) <= threshold_sq)
}

/// Chroma key: zero the alpha of every pixel within `threshold` of any target.
///
/// * Works on a private RGBA copy; `image` is never modified.
/// * RGB is never touched, matched or not.
/// * Unmatched pixels keep whatever alpha they came in with.
pub fn make_transparent(
    image: &RasterImage,
    targets: &TargetColorSet,
    threshold: Threshold,
) -> RasterImage {
    let mut out = image.normalized();
    let targets = targets.as_slice();
    let threshold_sq = threshold.squared();

    let matched = out
        .as_raw_mut()
        .par_chunks_exact_mut(CHANNELS)
        .map(|px| {
            let hit = matches_any(px[0], px[1], px[2], targets, threshold_sq);
            if hit {
                px[3] = 0;
            }
            hit
        })
        .filter(|&hit| hit)
        .count();

    log::debug!(
        "color key: {}x{} px, {} target(s), threshold {}, {} matched",
        out.width(),
        out.height(),
        targets.len(),
        threshold.0,
        matched
    );
    out
}

/// The set of pixels `make_transparent` would key out, in row-major order.
pub fn matched_mask(
    image: &RasterImage,
    targets: &TargetColorSet,
    threshold: Threshold,
) -> Vec<bool> {
    let targets = targets.as_slice();
    let threshold_sq = threshold.squared();
    image
        .as_raw()
        .par_chunks_exact(CHANNELS)
        .map(|px| matches_any(px[0], px[1], px[2], targets, threshold_sq))
        .collect()
}
