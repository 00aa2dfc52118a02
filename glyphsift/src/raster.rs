//! Rendering of glyph outlines to tightly cropped RGBA images.

use image::{Rgba, RgbaImage};
use skrifa::{
    charmap::Charmap,
    outline::{DrawError, DrawSettings},
    prelude::{LocationRef, Size},
    raw::FontRef,
    MetadataProvider, OutlineGlyphCollection,
};
use zeno::{Format, Mask, Origin};

use crate::{error::GlyphError, pen::PathPen};

/// Default rasterization size in pixels per em.
pub const DEFAULT_RENDER_SIZE: u32 = 1024;

/// Coverage bitmap of a single glyph.
///
/// Every pixel is white with the glyph coverage stored in the alpha
/// channel. The image spans exactly the pixel bounds of the rendered
/// outline.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphBitmap {
    image: RgbaImage,
}

impl GlyphBitmap {
    /// Builds a bitmap from an 8-bit coverage mask in row major order.
    ///
    /// Returns `None` if the mask does not hold `width * height` values.
    pub fn from_coverage(width: u32, height: u32, coverage: &[u8]) -> Option<Self> {
        if coverage.len() != width as usize * height as usize {
            return None;
        }
        let image = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([255, 255, 255, coverage[(y * width + x) as usize]])
        });
        Some(Self { image })
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Result of rasterizing a glyph.
#[derive(Clone, Debug, PartialEq)]
pub enum Rendered {
    Bitmap(GlyphBitmap),
    /// The glyph covers no pixels.
    Empty,
}

/// Renders glyphs of a single font at a fixed size.
pub struct GlyphRasterizer<'a> {
    charmap: Charmap<'a>,
    outlines: OutlineGlyphCollection<'a>,
    size: Size,
}

impl<'a> GlyphRasterizer<'a> {
    pub fn new(font: &FontRef<'a>, render_size: u32) -> Self {
        Self {
            charmap: font.charmap(),
            outlines: font.outline_glyphs(),
            size: Size::new(render_size as f32),
        }
    }

    /// Renders the glyph mapped to `codepoint` without hinting.
    pub fn rasterize(&self, codepoint: u32) -> Result<Rendered, GlyphError> {
        let glyph_id = self
            .charmap
            .map(codepoint)
            .ok_or(GlyphError::Unmapped(codepoint))?;
        let outline = self
            .outlines
            .get(glyph_id)
            .ok_or(DrawError::GlyphNotFound(glyph_id))?;
        let mut pen = PathPen::new();
        outline.draw(
            DrawSettings::unhinted(self.size, LocationRef::default()),
            &mut pen,
        )?;
        if pen.is_empty() {
            return Ok(Rendered::Empty);
        }
        let (coverage, placement) = Mask::new(pen.commands())
            .format(Format::Alpha)
            .origin(Origin::BottomLeft)
            .render();
        if placement.width == 0 || placement.height == 0 {
            return Ok(Rendered::Empty);
        }
        Ok(
            GlyphBitmap::from_coverage(placement.width, placement.height, &coverage)
                .map_or(Rendered::Empty, Rendered::Bitmap),
        )
    }
}
