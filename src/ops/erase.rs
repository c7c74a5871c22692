// ============================================================================
// STROKE ERASER: zero alpha under a circular brush at each stroke point
// ============================================================================
//
// Brush shape is the integer disk `dx² + dy² <= r²` with `r = diameter / 2`.
// Each stamp walks only the part of the disk's bounding box that lies on the
// raster, so the brush size never drives the amount of work past the image.

use crate::error::{Result, TranspalentorError};
use crate::raster::{CHANNELS, RasterImage};

/// One raw stroke sample as received from the caller.
///
/// Well-formed samples are exactly `[x, y]`; anything else is skipped by the
/// eraser without aborting the batch.
pub type Stroke = Vec<i64>;

/// Brush diameter in pixels, always >= 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct BrushDiameter(u32);

impl BrushDiameter {
    pub fn new(diameter: i64) -> Result<Self> {
        if diameter < 1 || diameter > u32::MAX as i64 {
            return Err(TranspalentorError::InvalidParameter(format!(
                "brush diameter must be >= 1, got {}",
                diameter
            )));
        }
        Ok(Self(diameter as u32))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// `floor(diameter / 2)`. A diameter of 1 gives radius 0 (single pixel).
    pub fn radius(self) -> i64 {
        (self.0 / 2) as i64
    }
}

impl Default for BrushDiameter {
    fn default() -> Self {
        Self(10)
    }
}

/// Outcome counts for one erase call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EraseReport {
    /// Strokes that were stamped (even if their disk fell entirely off-canvas).
    pub applied: usize,
    /// Malformed strokes that were ignored.
    pub skipped: usize,
}

/// All integer offsets `(dx, dy)` with `dx² + dy² <= r²`.
///
/// The inclusive integer test is kept as-is, including the small "nubs" it
/// produces on the axes at the brush edge.
pub fn brush_disk(radius: i64) -> Vec<(i64, i64)> {
    let r2 = radius * radius;
    let mut offsets = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

/// Stamp a circular brush at every stroke point, zeroing alpha under it.
pub fn erase_at_coordinates<S: AsRef<[i64]>>(
    image: &RasterImage,
    strokes: &[S],
    brush: BrushDiameter,
) -> RasterImage {
    erase_with_report(image, strokes, brush).0
}

/// [`erase_at_coordinates`] plus a count of applied and skipped strokes.
///
/// * Works on a private RGBA copy; `image` is never modified.
/// * Disk pixels outside the raster are clipped silently.
/// * Overlapping disks are harmless: alpha 0 stays 0.
pub fn erase_with_report<S: AsRef<[i64]>>(
    image: &RasterImage,
    strokes: &[S],
    brush: BrushDiameter,
) -> (RasterImage, EraseReport) {
    let mut out = image.normalized();
    let mut report = EraseReport::default();
    if strokes.is_empty() {
        return (out, report);
    }

    let radius = brush.radius();
    for stroke in strokes {
        let &[cx, cy] = stroke.as_ref() else {
            report.skipped += 1;
            continue;
        };
        stamp(&mut out, cx, cy, radius);
        report.applied += 1;
    }

    if report.skipped > 0 {
        log::debug!("erase: skipped {} malformed stroke(s)", report.skipped);
    }
    log::debug!(
        "erase: {}x{} px, brush {} (r={}), {} stroke(s) applied",
        out.width(),
        out.height(),
        brush.get(),
        brush.radius(),
        report.applied
    );
    (out, report)
}

#[inline]
fn stamp(raster: &mut RasterImage, cx: i64, cy: i64, radius: i64) {
    let (w, h) = (raster.width() as i64, raster.height() as i64);
    let x0 = cx.saturating_sub(radius).max(0);
    let x1 = cx.saturating_add(radius).min(w - 1);
    let y0 = cy.saturating_sub(radius).max(0);
    let y1 = cy.saturating_add(radius).min(h - 1);
    if x0 > x1 || y0 > y1 {
        return;
    }

    // Inside the clipped box |dx|, |dy| <= radius, so none of this overflows.
    let r2 = radius * radius;
    let stride = raster.stride();
    let pixels = raster.as_raw_mut();
    for y in y0..=y1 {
        let dy = y - cy;
        let row = y as usize * stride;
        for x in x0..=x1 {
            let dx = x - cx;
            if dx * dx + dy * dy <= r2 {
                pixels[row + x as usize * CHANNELS + 3] = 0;
            }
        }
    }
}
