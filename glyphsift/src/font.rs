//! Font loading and the codepoint to glyph mapping.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use skrifa::{
    raw::{FileRef, FontRef},
    GlyphId, GlyphNames, MetadataProvider,
};

use crate::error::FontError;

/// A memory mapped font file.
pub struct Font {
    path: PathBuf,
    data: SharedFontData,
}

impl Font {
    /// Maps the file at `path` and checks that it contains a single font.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let path = path.as_ref().to_owned();
        let file = std::fs::File::open(&path)?;
        // Safety: the mapping is read only and fonts are not expected to be
        // modified while they are being processed.
        let data = SharedFontData(Arc::new(unsafe { memmap2::Mmap::map(&file)? }));
        match FileRef::new(data.0.as_ref())? {
            FileRef::Font(_) => Ok(Self { path, data }),
            FileRef::Collection(_) => Err(FontError::Collection),
        }
    }

    /// Returns the file name without extension.
    ///
    /// This names the output directory for the font.
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn data(&self) -> &[u8] {
        self.data.0.as_ref()
    }

    pub fn font_ref(&self) -> Result<FontRef<'_>, FontError> {
        Ok(FontRef::new(self.data())?)
    }

    pub fn codepoint_map(&self) -> Result<CodepointMap, FontError> {
        CodepointMap::new(&self.font_ref()?)
    }
}

struct SharedFontData(Arc<memmap2::Mmap>);

/// A single character map entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodepointEntry {
    pub codepoint: u32,
    pub glyph_id: GlyphId,
    pub glyph_name: String,
}

/// Mapping of codepoints to glyphs taken from the best Unicode character
/// map of a font.
///
/// Entries are ordered by codepoint. Glyph identity is decided by glyph id:
/// two codepoints reach the same glyph exactly when their ids match, which
/// is also when their (unique) glyph names match.
#[derive(Clone, Debug, Default)]
pub struct CodepointMap {
    entries: Vec<CodepointEntry>,
}

impl CodepointMap {
    pub fn new(font: &FontRef) -> Result<Self, FontError> {
        let charmap = font.charmap();
        if !charmap.has_map() {
            return Err(FontError::MissingCharmap);
        }
        let names = GlyphNames::new(font);
        let mut entries: Vec<_> = charmap
            .mappings()
            .map(|(codepoint, glyph_id)| CodepointEntry {
                codepoint,
                glyph_id,
                glyph_name: names
                    .get(glyph_id)
                    .map(|name| name.as_str().to_owned())
                    .unwrap_or_else(|| format!("gid{}", glyph_id.to_u32())),
            })
            .collect();
        entries.sort_by_key(|entry| entry.codepoint);
        entries.dedup_by_key(|entry| entry.codepoint);
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, codepoint: u32) -> Option<&CodepointEntry> {
        self.entries
            .binary_search_by_key(&codepoint, |entry| entry.codepoint)
            .ok()
            .map(|ix| &self.entries[ix])
    }

    pub fn glyph_id(&self, codepoint: u32) -> Option<GlyphId> {
        self.get(codepoint).map(|entry| entry.glyph_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CodepointEntry> + '_ {
        self.entries.iter()
    }

    pub fn codepoints(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(|entry| entry.codepoint)
    }
}
