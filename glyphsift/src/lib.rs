//! Extraction of one raster image per visually unique glyph outline.
//!
//! For each font, codepoints whose glyphs share an outline are collapsed
//! (see [`DedupStrategy`]), the remaining glyphs are rendered at a high
//! resolution, cropped to their ink, upscaled to a minimum size when
//! needed and written as PNG files.

mod batch;
mod dedup;
mod error;
mod font;
mod normalize;
mod outline;
mod pen;
mod raster;

#[cfg(test)]
mod test_helpers;

pub use batch::{
    discover_fonts, glyph_file_stem, process_batch, process_font, BatchOptions, BatchReport,
    FontReport,
};
pub use dedup::{duplicates_of, select, select_grouped, select_pairwise, DedupStrategy, ShapeIndex};
pub use error::{CffError, FontError, GlyphError, OutlineError, ReadError};
pub use font::{CodepointEntry, CodepointMap, Font};
pub use normalize::{normalize, DEFAULT_MIN_SIZE};
pub use outline::{OutlineExtractor, OutlineKey};
pub use raster::{GlyphBitmap, GlyphRasterizer, Rendered, DEFAULT_RENDER_SIZE};
