// ============================================================================
// RASTER BUFFER: owned, flat RGBA8 pixel grid
// ============================================================================
//
// Pixels are stored row-major in a single contiguous `Vec<u8>`, four bytes per
// pixel, `stride = width * 4`. Engines never hold on to a caller's buffer:
// every entry point goes through `normalize` / `normalized`, which allocate a
// private working copy.

use image::{DynamicImage, RgbaImage};

pub const CHANNELS: usize = 4;
pub const OPAQUE: u8 = 255;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Solid-colour raster. Returns `None` for a zero-sized grid.
    pub fn new(width: u32, height: u32, fill: [u8; 4]) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            pixels.extend_from_slice(&fill);
        }
        Some(Self { width, height, pixels })
    }

    /// Wrap raw RGBA8 bytes. The length must be exactly `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        if pixels.len() != width as usize * height as usize * CHANNELS {
            return None;
        }
        Some(Self { width, height, pixels })
    }

    /// Expand raw RGB8 bytes to RGBA8 with full opacity.
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let count = width as usize * height as usize;
        if rgb.len() != count * 3 {
            return None;
        }
        let mut pixels = Vec::with_capacity(count * CHANNELS);
        for px in rgb.chunks_exact(3) {
            pixels.extend_from_slice(&[px[0], px[1], px[2], OPAQUE]);
        }
        Some(Self { width, height, pixels })
    }

    pub fn from_rgba_image(img: &RgbaImage) -> Option<Self> {
        Self::from_rgba(img.width(), img.height(), img.as_raw().clone())
    }

    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    pub fn into_rgba_image(self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    /// Private RGBA copy of an already-normalized raster.
    pub fn normalized(&self) -> Self {
        self.clone()
    }

    /// Byte offset of pixel `(x, y)`, or `None` when outside the grid.
    #[inline]
    pub fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.stride() + x as usize * CHANNELS)
    }

    /// Signed variant of [`index_of`](Self::index_of). Negative or oversized
    /// coordinates are rejected, never wrapped or clamped.
    #[inline]
    pub fn index_of_signed(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        self.index_of(x as u32, y as u32)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let i = self.index_of(x, y)?;
        let p = &self.pixels[i..i + CHANNELS];
        Some([p[0], p[1], p[2], p[3]])
    }

    pub fn alpha(&self, x: u32, y: u32) -> Option<u8> {
        self.index_of(x, y).map(|i| self.pixels[i + 3])
    }

    /// Overwrite alpha at `(x, y)`. Returns `false` when out of bounds.
    pub fn set_alpha(&mut self, x: u32, y: u32, a: u8) -> bool {
        match self.index_of(x, y) {
            Some(i) => {
                self.pixels[i + 3] = a;
                true
            }
            None => false,
        }
    }
}

/// Convert any decoded image to a fresh RGBA8 raster.
///
/// Layouts without an alpha channel get alpha = 255 for every pixel. Layouts
/// that already carry alpha are still copied, so the caller's image is never
/// aliased by the result.
pub fn normalize(image: &DynamicImage) -> RasterImage {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    RasterImage {
        width,
        height,
        pixels: rgba.into_raw(),
    }
}
