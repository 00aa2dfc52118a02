//! Upscaling of small glyph bitmaps.

use image::imageops::{self, FilterType};

use crate::raster::GlyphBitmap;

/// Default minimum dimension in pixels.
pub const DEFAULT_MIN_SIZE: u32 = 512;

/// Upscales `bitmap` so that its shorter side reaches `min_size`.
///
/// Bitmaps with at least one side of `min_size` or more are returned
/// unchanged. The aspect ratio is preserved, so the longer side may end up
/// well above `min_size`.
pub fn normalize(bitmap: GlyphBitmap, min_size: u32) -> GlyphBitmap {
    let (width, height) = (bitmap.width(), bitmap.height());
    let shorter = width.min(height);
    if width.max(height) >= min_size || shorter == 0 {
        return bitmap;
    }
    let scaled = |len: u32| (len as u64 * min_size as u64 / shorter as u64) as u32;
    let (new_width, new_height) = (scaled(width), scaled(height));
    log::trace!("resizing {width}x{height} to {new_width}x{new_height}");
    GlyphBitmap::from_image(imageops::resize(
        bitmap.image(),
        new_width,
        new_height,
        FilterType::Lanczos3,
    ))
}
