// ============================================================================
// PIXEL OPERATIONS: stateless transforms over a `RasterImage`
// ============================================================================
//
// Each operation takes the source raster by shared reference and returns a
// new one. Neither engine calls the other.

pub mod color_key;
pub mod erase;

pub use color_key::{TargetColor, TargetColorSet, Threshold, make_transparent, matched_mask};
pub use erase::{BrushDiameter, EraseReport, Stroke, brush_disk, erase_at_coordinates, erase_with_report};
