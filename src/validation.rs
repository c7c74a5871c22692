// ============================================================================
// BOUNDARY VALIDATION: everything the engines assume is already sane
// ============================================================================
//
// Range checks for colours, threshold, brush size and stroke coordinates,
// plus upload checks (size cap, PNG/JPEG/BMP only). The engines never repeat
// any of these.

use image::ImageFormat;
use serde_json::Value;

use crate::config::Config;
use crate::error::{Result, TranspalentorError};
use crate::ops::{BrushDiameter, Stroke, TargetColor, TargetColorSet, Threshold};

pub const SUPPORTED_FORMATS: [ImageFormat; 3] = [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Bmp];

fn invalid(msg: impl Into<String>) -> TranspalentorError {
    TranspalentorError::InvalidParameter(msg.into())
}

/// One colour channel, 0–255.
pub fn channel(value: i64) -> Result<u8> {
    u8::try_from(value).map_err(|_| invalid(format!("color channel out of range 0-255: {}", value)))
}

pub fn threshold(value: i64) -> Result<Threshold> {
    u8::try_from(value)
        .map(Threshold)
        .map_err(|_| invalid(format!("threshold out of range 0-255: {}", value)))
}

/// Brush diameter within `1..=config.max_brush_diameter`.
pub fn brush_diameter(value: i64, config: &Config) -> Result<BrushDiameter> {
    if value > config.max_brush_diameter as i64 {
        return Err(invalid(format!(
            "brush diameter {} exceeds maximum of {}",
            value, config.max_brush_diameter
        )));
    }
    BrushDiameter::new(value)
}

/// Reject well-formed strokes with negative coordinates when configured to.
/// Malformed entries pass through untouched; the eraser skips them.
pub fn strokes(strokes: &[Stroke], config: &Config) -> Result<()> {
    if !config.reject_negative_strokes {
        return Ok(());
    }
    for s in strokes {
        if let &[x, y] = s.as_slice()
            && (x < 0 || y < 0)
        {
            return Err(invalid(format!("negative stroke coordinate: [{}, {}]", x, y)));
        }
    }
    Ok(())
}

// ----------------------------------------------------------------------------
// Parsing
// ----------------------------------------------------------------------------

/// Parse target colours from either text form:
///
/// * `"255,0,0"` or `"255,0,0;0,0,255"`
/// * JSON `[255,0,0]` (one colour) or `[[255,0,0],[0,0,255]]`
pub fn parse_target_colors(src: &str) -> Result<TargetColorSet> {
    let src = src.trim();
    if src.is_empty() {
        return Err(TranspalentorError::ColorNotSpecified);
    }
    if src.starts_with('[') {
        return parse_target_colors_json(&serde_json::from_str(src)?);
    }
    let colors = src
        .split(';')
        .filter(|part| !part.trim().is_empty())
        .map(parse_rgb_triple)
        .collect::<Result<Vec<_>>>()?;
    TargetColorSet::new(colors)
}

/// Single `r,g,b` triple.
pub fn parse_rgb_triple(src: &str) -> Result<TargetColor> {
    let parts: Vec<&str> = src.split(',').map(str::trim).collect();
    let &[r, g, b] = parts.as_slice() else {
        return Err(invalid(format!("expected r,g,b but got '{}'", src.trim())));
    };
    let num = |s: &str| -> Result<u8> {
        let v: i64 = s
            .parse()
            .map_err(|_| invalid(format!("not an integer: '{}'", s)))?;
        channel(v)
    };
    Ok(TargetColor::new(num(r)?, num(g)?, num(b)?))
}

fn parse_target_colors_json(value: &Value) -> Result<TargetColorSet> {
    let Value::Array(items) = value else {
        return Err(invalid("colors must be a JSON array"));
    };
    // A flat triple of numbers is one colour; anything else is a list.
    if items.len() == 3 && items.iter().all(Value::is_number) {
        return Ok(TargetColorSet::single(json_triple(value)?));
    }
    let colors = items.iter().map(json_triple).collect::<Result<Vec<_>>>()?;
    TargetColorSet::new(colors)
}

fn json_triple(value: &Value) -> Result<TargetColor> {
    let Some([r, g, b]) = value.as_array().map(Vec::as_slice) else {
        return Err(invalid(format!("expected [r,g,b] but got {}", value)));
    };
    let num = |v: &Value| -> Result<u8> {
        let n = v
            .as_i64()
            .ok_or_else(|| invalid(format!("color channel is not an integer: {}", v)))?;
        channel(n)
    };
    Ok(TargetColor::new(num(r)?, num(g)?, num(b)?))
}

/// Parse a JSON stroke list such as `[[10,20],[11,21]]`.
///
/// The list itself must be an array. Individual entries are kept even when
/// malformed (wrong arity, non-integer parts) so the eraser can skip them;
/// entries with non-integer parts become empty strokes.
pub fn parse_strokes(src: &str) -> Result<Vec<Stroke>> {
    let value: Value = serde_json::from_str(src)?;
    let Value::Array(items) = value else {
        return Err(invalid("strokes must be a JSON array"));
    };
    Ok(items.iter().map(json_stroke).collect())
}

fn json_stroke(value: &Value) -> Stroke {
    let Some(parts) = value.as_array() else {
        return Vec::new();
    };
    parts
        .iter()
        .map(Value::as_i64)
        .collect::<Option<Vec<i64>>>()
        .unwrap_or_default()
}

// ----------------------------------------------------------------------------
// Uploads
// ----------------------------------------------------------------------------

/// Check size and sniff the format of an uploaded blob.
pub fn upload(bytes: &[u8], config: &Config) -> Result<ImageFormat> {
    let size = bytes.len() as u64;
    if size > config.max_file_size {
        return Err(TranspalentorError::FileTooLarge {
            size,
            max: config.max_file_size,
        });
    }
    let format = image::guess_format(bytes)
        .map_err(|_| TranspalentorError::UnsupportedFormat("corrupted or invalid".to_string()))?;
    if !SUPPORTED_FORMATS.contains(&format) {
        return Err(TranspalentorError::UnsupportedFormat(format!("{:?}", format)));
    }
    Ok(format)
}

/// File extension (without dot) used when storing an upload of `format`.
pub fn extension_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpg",
        ImageFormat::Bmp => "bmp",
        _ => "png",
    }
}
