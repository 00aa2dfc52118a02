//! Selection of representative codepoints by glyph shape.
//!
//! Two strategies are available. [`DedupStrategy::Pairwise`] scans the
//! character map once per codepoint and drops every codepoint that takes
//! part in a collision, so a shape drawn by two different glyphs produces no
//! output at all. [`DedupStrategy::Grouped`] groups codepoints by outline in
//! a single pass and keeps the first codepoint of each group.

use std::collections::{hash_map::Entry, BTreeSet, HashMap, HashSet};

use skrifa::GlyphId;

use crate::{
    font::CodepointMap,
    outline::{OutlineExtractor, OutlineKey},
};

/// Policy for collapsing codepoints that share a glyph outline.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub enum DedupStrategy {
    /// Exclude all codepoints whose outline is also drawn by a different
    /// glyph.
    #[default]
    Pairwise,
    /// Keep exactly one codepoint, the first in map order, per outline.
    Grouped,
}

/// Character map entries paired with their outline keys.
///
/// Keys are computed once per codepoint. Codepoints without a key (missing
/// glyph data, unsupported outline format or malformed outlines) never
/// compare equal to anything.
pub struct ShapeIndex<'a> {
    entries: Vec<ShapeEntry<'a>>,
}

struct ShapeEntry<'a> {
    codepoint: u32,
    glyph_id: GlyphId,
    key: Option<OutlineKey<'a>>,
}

impl<'a> ShapeIndex<'a> {
    pub fn new(extractor: &OutlineExtractor<'a>, cmap: &CodepointMap) -> Self {
        let entries = cmap
            .iter()
            .map(|entry| {
                let key = match extractor.extract(cmap, entry.codepoint) {
                    Ok(key) => Some(key),
                    Err(e) => {
                        if extractor.is_supported() {
                            log::debug!(
                                "U+{:04X} ({}) excluded from comparison: {e}",
                                entry.codepoint,
                                entry.glyph_name
                            );
                        }
                        None
                    }
                };
                ShapeEntry {
                    codepoint: entry.codepoint,
                    glyph_id: entry.glyph_id,
                    key,
                }
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn codepoints(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(|entry| entry.codepoint)
    }

    fn get(&self, codepoint: u32) -> Option<&ShapeEntry<'a>> {
        self.entries
            .binary_search_by_key(&codepoint, |entry| entry.codepoint)
            .ok()
            .map(|ix| &self.entries[ix])
    }
}

/// Returns the codepoints found to collide with `codepoint`.
///
/// A collision is a pair of codepoints mapped to different glyphs with equal
/// outlines. Both members of every such pair are recorded. Callers should
/// only use the result to mark codepoints as covered and must not rely on
/// `codepoint` itself being present.
pub fn duplicates_of(index: &ShapeIndex, codepoint: u32) -> BTreeSet<u32> {
    let mut duplicates = BTreeSet::new();
    let Some(ShapeEntry {
        glyph_id,
        key: Some(key),
        ..
    }) = index.get(codepoint)
    else {
        return duplicates;
    };
    for other in &index.entries {
        if other.codepoint == codepoint || other.glyph_id == *glyph_id {
            continue;
        }
        if other.key.as_ref() == Some(key) {
            duplicates.insert(codepoint);
            duplicates.insert(other.codepoint);
        }
    }
    duplicates
}

/// Selects representatives by repeated pairwise scans.
///
/// A codepoint is emitted only when it has no duplicates. Otherwise the whole
/// set of duplicates is marked as processed and none of them is emitted.
pub fn select_pairwise(index: &ShapeIndex) -> Vec<u32> {
    let mut processed = HashSet::new();
    let mut representatives = Vec::new();
    for codepoint in index.codepoints() {
        if processed.contains(&codepoint) {
            continue;
        }
        let duplicates = duplicates_of(index, codepoint);
        if duplicates.is_empty() {
            representatives.push(codepoint);
            processed.insert(codepoint);
        } else {
            log::debug!(
                "U+{codepoint:04X} shares its outline with {} codepoint(s)",
                duplicates.len().saturating_sub(1)
            );
            processed.extend(duplicates);
        }
    }
    representatives
}

/// Selects the first codepoint, in map order, of each group of codepoints
/// with equal outlines.
pub fn select_grouped(index: &ShapeIndex) -> Vec<u32> {
    let mut seen: HashMap<&OutlineKey, u32> = HashMap::new();
    let mut representatives = Vec::new();
    for entry in &index.entries {
        let Some(key) = &entry.key else {
            representatives.push(entry.codepoint);
            continue;
        };
        match seen.entry(key) {
            Entry::Vacant(vacant) => {
                vacant.insert(entry.codepoint);
                representatives.push(entry.codepoint);
            }
            Entry::Occupied(first) => log::debug!(
                "U+{:04X} collapsed into U+{:04X}",
                entry.codepoint,
                first.get()
            ),
        }
    }
    representatives
}

/// Returns one codepoint per glyph shape according to `strategy`.
pub fn select(
    extractor: &OutlineExtractor,
    cmap: &CodepointMap,
    strategy: DedupStrategy,
) -> Vec<u32> {
    let index = ShapeIndex::new(extractor, cmap);
    match strategy {
        DedupStrategy::Pairwise => select_pairwise(&index),
        DedupStrategy::Grouped => select_grouped(&index),
    }
}
