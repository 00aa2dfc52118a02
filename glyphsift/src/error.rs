//! Error types for loading fonts, extracting outlines and rendering glyphs.
//!
//! Errors are scoped to the smallest unit of work they abort: a
//! [`FontError`] skips a whole font, a [`GlyphError`] skips a single glyph
//! and an [`OutlineError`] only removes a codepoint from duplicate
//! detection.

use std::io;

use skrifa::{outline::DrawError, GlyphId};
use thiserror::Error;

pub use skrifa::raw::{tables::postscript::Error as CffError, ReadError};

use crate::outline::COMPOSITE_RECURSION_LIMIT;

/// Errors that prevent a font from being processed at all.
#[derive(Debug, Error)]
pub enum FontError {
    /// The font file could not be opened or mapped.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The data is not a valid OpenType font.
    #[error("invalid font data: {0}")]
    Read(#[from] ReadError),
    /// The file is a font collection rather than a single font.
    #[error("font collections are not supported")]
    Collection,
    /// The font has no usable Unicode character map.
    #[error("no valid character map found")]
    MissingCharmap,
}

/// Errors that occur when computing the comparable outline of a glyph.
#[derive(Clone, Debug, Error)]
pub enum OutlineError {
    /// The codepoint is not present in the character map.
    #[error("U+{0:04X} is not present in the character map")]
    NotFound(u32),
    /// The font has neither TrueType nor PostScript outlines.
    #[error("no glyf, CFF or CFF2 table")]
    UnsupportedFormat,
    /// Error occurred when reading font data.
    #[error(transparent)]
    Read(#[from] ReadError),
    /// Error occurred when reading the CFF or CFF2 table.
    #[error("{0}")]
    PostScript(CffError),
    /// Composite glyphs were nested too deeply.
    #[error(
        "Recursion limit ({limit}) exceeded when loading composite component {0}",
        limit = COMPOSITE_RECURSION_LIMIT
    )]
    RecursionLimitExceeded(GlyphId),
    /// An anchor point had an invalid index.
    #[error("Invalid anchor point index ({1}) for composite glyph {0}")]
    InvalidAnchorPoint(GlyphId, u16),
}

// The PostScript error does not implement `std::error::Error`, so it can't
// be a `#[from]` source.
impl From<CffError> for OutlineError {
    fn from(e: CffError) -> Self {
        Self::PostScript(e)
    }
}

/// Errors that cause a single glyph to be skipped.
#[derive(Debug, Error)]
pub enum GlyphError {
    /// The codepoint does not map to a glyph.
    #[error("U+{0:04X} does not map to a glyph")]
    Unmapped(u32),
    /// The outline could not be loaded.
    #[error("{0}")]
    Draw(DrawError),
    /// The image could not be encoded or written.
    #[error(transparent)]
    Image(#[from] image::ImageError),
    /// The output file could not be created.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<DrawError> for GlyphError {
    fn from(e: DrawError) -> Self {
        Self::Draw(e)
    }
}
