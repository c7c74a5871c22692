// ============================================================================
// DECODE / ENCODE: thin wrappers over the `image` crate
// ============================================================================
//
// Everything here happens before or after an engine call. Rasters always
// leave this module normalized to RGBA8, and are always written back as PNG
// so the alpha channel survives.

use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ImageEncoder, ImageFormat};

use crate::error::{Result, TranspalentorError};
use crate::raster::{RasterImage, normalize};

/// Decode an image file from disk and normalize it to RGBA.
///
/// The format is taken from the file's leading bytes, not its extension:
/// edited session files keep their upload name but hold PNG data.
pub fn load_raster(path: &Path) -> Result<RasterImage> {
    let img = image::io::Reader::open(path)?.with_guessed_format()?.decode()?;
    let raster = normalize(&img);
    log::debug!("decoded {} ({}x{})", path.display(), raster.width(), raster.height());
    Ok(raster)
}

/// Decode an in-memory blob and normalize it to RGBA.
pub fn decode_raster(bytes: &[u8]) -> Result<RasterImage> {
    let img = image::load_from_memory(bytes)?;
    Ok(normalize(&img))
}

/// Encode as PNG into any writer.
pub fn encode_png<W: Write>(raster: &RasterImage, writer: W) -> Result<()> {
    PngEncoder::new(writer).write_image(
        raster.as_raw(),
        raster.width(),
        raster.height(),
        image::ColorType::Rgba8,
    )?;
    Ok(())
}

/// Encode as PNG and return the bytes.
pub fn png_bytes(raster: &RasterImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    encode_png(raster, &mut out)?;
    Ok(out.into_inner())
}

/// Write a raster to `path` as PNG, regardless of the path's extension.
pub fn save_png(raster: &RasterImage, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    encode_png(raster, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Format of a file on disk, judged by its leading bytes.
pub fn sniff_format(path: &Path) -> Result<ImageFormat> {
    let reader = image::io::Reader::open(path)?.with_guessed_format()?;
    reader
        .format()
        .ok_or_else(|| TranspalentorError::UnsupportedFormat("unknown".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_round_trip_keeps_alpha() {
        let mut r = RasterImage::new(3, 2, [9, 8, 7, 255]).unwrap();
        r.set_alpha(1, 1, 0);
        let bytes = png_bytes(&r).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
        let back = decode_raster(&bytes).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(decode_raster(b"definitely not an image").is_err());
    }

    #[test]
    fn save_and_load_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.png");
        let r = RasterImage::new(4, 4, [0, 128, 255, 200]).unwrap();
        save_png(&r, &path).unwrap();
        assert_eq!(sniff_format(&path).unwrap(), ImageFormat::Png);
        assert_eq!(load_raster(&path).unwrap(), r);
    }

    #[test]
    fn png_data_under_jpeg_name_still_loads() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("photo.jpg");
        let mut r = RasterImage::new(2, 2, [1, 2, 3, 255]).unwrap();
        r.set_alpha(0, 1, 0);
        save_png(&r, &path).unwrap();
        assert_eq!(load_raster(&path).unwrap(), r);
    }
}
