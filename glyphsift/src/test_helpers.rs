//! Assembly of small synthetic fonts for tests.
//!
//! Fonts are written directly as big-endian bytes so that every outline,
//! charstring and character map entry is under the control of the test.

use std::collections::BTreeMap;

const UNITS_PER_EM: u16 = 1000;

/// A convenience type for generating a buffer of big-endian bytes.
#[derive(Debug, Clone, Default)]
pub struct BeBuffer(Vec<u8>);

pub trait BeBytes: Copy {
    fn write_be(self, buf: &mut Vec<u8>);
}

macro_rules! be_bytes {
    ($($ty:ty),*) => {
        $(impl BeBytes for $ty {
            fn write_be(self, buf: &mut Vec<u8>) {
                buf.extend_from_slice(&self.to_be_bytes());
            }
        })*
    };
}

be_bytes!(u8, u16, i16, u32, i32);

impl BeBuffer {
    pub fn new() -> Self {
        Default::default()
    }

    /// Write any scalar to this buffer.
    pub fn push(&mut self, item: impl BeBytes) -> &mut Self {
        item.write_be(&mut self.0);
        self
    }

    /// Write multiple scalars into the buffer
    pub fn extend<T: BeBytes>(&mut self, iter: impl IntoIterator<Item = T>) -> &mut Self {
        for item in iter {
            item.write_be(&mut self.0);
        }
        self
    }

    pub fn extend_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.0.extend_from_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

/// Placement of a composite component.
#[derive(Clone, Copy, Debug)]
pub enum TestAnchor {
    Offset(i16, i16),
    /// Align point `.0` of the composite so far with point `.1` of the
    /// component.
    Point(u16, u16),
}

#[derive(Clone, Copy, Debug)]
pub struct TestComponent {
    pub glyph: u16,
    pub anchor: TestAnchor,
    /// Uniform scale in 2.14 fixed point.
    pub scale: Option<i16>,
    /// Extra component flags, e.g. SCALED_COMPONENT_OFFSET.
    pub flags: u16,
}

impl TestComponent {
    pub fn offset(glyph: u16, x: i16, y: i16) -> Self {
        Self {
            glyph,
            anchor: TestAnchor::Offset(x, y),
            scale: None,
            flags: 0,
        }
    }
}

/// A TrueType glyph.
#[derive(Clone, Debug)]
pub enum TestGlyph {
    Empty,
    /// Contours of `(x, y, on_curve)` points.
    Simple(Vec<Vec<(i16, i16, bool)>>),
    Composite(Vec<TestComponent>),
}

impl TestGlyph {
    /// A simple glyph made of on-curve points only.
    pub fn contours(contours: &[&[(i16, i16)]]) -> Self {
        Self::Simple(
            contours
                .iter()
                .map(|contour| contour.iter().map(|&(x, y)| (x, y, true)).collect())
                .collect(),
        )
    }

    pub fn rect(x0: i16, y0: i16, x1: i16, y1: i16) -> Self {
        Self::contours(&[&[(x0, y0), (x0, y1), (x1, y1), (x1, y0)]])
    }

    pub fn square(x: i16, y: i16, size: i16) -> Self {
        Self::rect(x, y, x + size, y + size)
    }

    fn write(&self, buf: &mut BeBuffer) {
        match self {
            Self::Empty => {}
            Self::Simple(contours) => {
                let points: Vec<_> = contours.iter().flatten().copied().collect();
                let x_min = points.iter().map(|p| p.0).min().unwrap_or_default();
                let y_min = points.iter().map(|p| p.1).min().unwrap_or_default();
                let x_max = points.iter().map(|p| p.0).max().unwrap_or_default();
                let y_max = points.iter().map(|p| p.1).max().unwrap_or_default();
                buf.push(contours.len() as i16)
                    .extend([x_min, y_min, x_max, y_max]);
                let mut end = 0u16;
                for contour in contours {
                    end += contour.len() as u16;
                    buf.push(end - 1);
                }
                // no instructions, then one flag per point with long
                // coordinate deltas
                buf.push(0u16)
                    .extend(points.iter().map(|p| p.2 as u8));
                let mut last = (0i16, 0i16);
                for point in &points {
                    buf.push(point.0 - last.0);
                    last.0 = point.0;
                }
                for point in &points {
                    buf.push(point.1 - last.1);
                    last.1 = point.1;
                }
            }
            Self::Composite(components) => {
                const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
                const ARGS_ARE_XY_VALUES: u16 = 0x0002;
                const WE_HAVE_A_SCALE: u16 = 0x0008;
                const MORE_COMPONENTS: u16 = 0x0020;
                buf.push(-1i16).extend([0i16; 4]);
                for (ix, component) in components.iter().enumerate() {
                    let mut flags = ARG_1_AND_2_ARE_WORDS | component.flags;
                    if matches!(component.anchor, TestAnchor::Offset(..)) {
                        flags |= ARGS_ARE_XY_VALUES;
                    }
                    if component.scale.is_some() {
                        flags |= WE_HAVE_A_SCALE;
                    }
                    if ix + 1 != components.len() {
                        flags |= MORE_COMPONENTS;
                    }
                    buf.push(flags).push(component.glyph);
                    match component.anchor {
                        TestAnchor::Offset(x, y) => buf.extend([x, y]),
                        TestAnchor::Point(base, comp) => buf.extend([base, comp]),
                    };
                    if let Some(scale) = component.scale {
                        buf.push(scale);
                    }
                }
            }
        }
        if buf.len() % 2 != 0 {
            buf.push(0u8);
        }
    }
}

/// Builds a TrueType font with the given glyphs and character mappings.
///
/// Glyph identifiers are indices into `glyphs`.
pub fn glyf_font(glyphs: &[TestGlyph], mappings: &[(char, u16)]) -> Vec<u8> {
    let mut font = TestFontBuilder::new(0x00010000);
    font.add_glyf(glyphs);
    font.add_common(glyphs.len() as u16, mappings);
    font.build()
}

pub fn glyf_font_without_cmap(glyphs: &[TestGlyph]) -> Vec<u8> {
    let mut font = TestFontBuilder::new(0x00010000);
    font.add_glyf(glyphs);
    font.add_common(glyphs.len() as u16, &[]);
    font.tables.remove(b"cmap");
    font.build()
}

/// Builds a CFF flavored font with the given charstrings and character
/// mappings.
pub fn cff_font(charstrings: &[&[u8]], mappings: &[(char, u16)]) -> Vec<u8> {
    let mut font = TestFontBuilder::new(0x4F54544F);
    font.tables.insert(*b"CFF ", cff_table(charstrings));
    font.add_common(charstrings.len() as u16, mappings);
    font.build()
}

/// Builds a font with a `CFF2` table holding the given charstrings.
pub fn cff2_font(charstrings: &[&[u8]], mappings: &[(char, u16)]) -> Vec<u8> {
    let mut font = TestFontBuilder::new(0x4F54544F);
    font.tables.insert(*b"CFF2", cff2_table(charstrings));
    font.add_common(charstrings.len() as u16, mappings);
    font.build()
}

/// Builds a font with a character map but no outline tables.
pub fn bare_font(num_glyphs: u16, mappings: &[(char, u16)]) -> Vec<u8> {
    let mut font = TestFontBuilder::new(0x00010000);
    font.add_common(num_glyphs, mappings);
    font.build()
}

/// Type 2 charstring for a closed rectangle.
pub fn rect_charstring(x: i16, y: i16, width: i16, height: i16) -> Vec<u8> {
    let mut buf = BeBuffer::new();
    push_cff_number(&mut buf, x);
    push_cff_number(&mut buf, y);
    // rmoveto
    buf.push(21u8);
    push_cff_number(&mut buf, width);
    // hlineto alternates horizontal and vertical lines
    push_cff_number(&mut buf, height);
    push_cff_number(&mut buf, -width);
    buf.push(6u8);
    // endchar
    buf.push(14u8);
    buf.into_inner()
}

/// Rectangle charstring for a `CFF2` table, which has no endchar.
pub fn cff2_rect_charstring(x: i16, y: i16, width: i16, height: i16) -> Vec<u8> {
    let mut charstring = rect_charstring(x, y, width, height);
    charstring.pop();
    charstring
}

fn push_cff_number(buf: &mut BeBuffer, value: i16) {
    if (-107..=107).contains(&value) {
        buf.push((value + 139) as u8);
    } else {
        buf.push(28u8).push(value);
    }
}

fn cff_table(charstrings: &[&[u8]]) -> Vec<u8> {
    const NAME: &[u8] = b"Test";
    // header (4) + name index (5 + name) + top dict index (5 + 6) + empty
    // string and global subr indices (2 each)
    let charstrings_offset = 4 + 5 + NAME.len() + 5 + 6 + 2 + 2;
    let mut buf = BeBuffer::new();
    buf.extend([1u8, 0, 4, 1]);
    // name index
    buf.push(1u16)
        .push(1u8)
        .extend([1u8, 1 + NAME.len() as u8])
        .extend_bytes(NAME);
    // top dict index with a single CharStrings entry
    buf.push(1u16).push(1u8).extend([1u8, 7]);
    buf.push(29u8).push(charstrings_offset as i32).push(17u8);
    // string and global subr indices
    buf.push(0u16).push(0u16);
    assert_eq!(buf.len(), charstrings_offset);
    buf.push(charstrings.len() as u16);
    push_index_data(&mut buf, charstrings);
    buf.into_inner()
}

fn cff2_table(charstrings: &[&[u8]]) -> Vec<u8> {
    const TOP_DICT_LEN: u16 = 6;
    // header (5) + top dict + empty global subr index (4)
    let charstrings_offset = 5 + TOP_DICT_LEN as usize + 4;
    let mut buf = BeBuffer::new();
    buf.extend([2u8, 0, 5]).push(TOP_DICT_LEN);
    buf.push(29u8).push(charstrings_offset as i32).push(17u8);
    buf.push(0u32);
    assert_eq!(buf.len(), charstrings_offset);
    buf.push(charstrings.len() as u32);
    push_index_data(&mut buf, charstrings);
    buf.into_inner()
}

/// Writes the offset size, offsets and objects of a non-empty INDEX.
fn push_index_data(buf: &mut BeBuffer, objects: &[&[u8]]) {
    buf.push(2u8);
    let mut offset = 1u16;
    buf.push(offset);
    for object in objects {
        offset += object.len() as u16;
        buf.push(offset);
    }
    for object in objects {
        buf.extend_bytes(object);
    }
}

struct TestFontBuilder {
    sfnt_version: u32,
    tables: BTreeMap<[u8; 4], Vec<u8>>,
}

impl TestFontBuilder {
    fn new(sfnt_version: u32) -> Self {
        Self {
            sfnt_version,
            tables: BTreeMap::new(),
        }
    }

    fn add_glyf(&mut self, glyphs: &[TestGlyph]) {
        let mut glyf = BeBuffer::new();
        let mut loca = BeBuffer::new();
        loca.push(0u32);
        for glyph in glyphs {
            glyph.write(&mut glyf);
            loca.push(glyf.len() as u32);
        }
        self.tables.insert(*b"glyf", glyf.into_inner());
        self.tables.insert(*b"loca", loca.into_inner());
    }

    fn add_common(&mut self, num_glyphs: u16, mappings: &[(char, u16)]) {
        self.tables.insert(*b"cmap", cmap_table(mappings));
        self.tables.insert(*b"head", head_table());
        self.tables.insert(*b"maxp", maxp_table(num_glyphs));
        self.tables.insert(*b"hhea", hhea_table(num_glyphs));
        self.tables.insert(*b"hmtx", hmtx_table(num_glyphs));
    }

    fn build(&self) -> Vec<u8> {
        let num_tables = self.tables.len() as u16;
        let search_range = 16 * (1u16 << num_tables.ilog2());
        let mut buf = BeBuffer::new();
        buf.push(self.sfnt_version)
            .push(num_tables)
            .push(search_range)
            .push(num_tables.ilog2() as u16)
            .push(num_tables * 16 - search_range);
        let mut offset = 12 + 16 * self.tables.len();
        for (tag, data) in &self.tables {
            buf.extend_bytes(tag)
                .push(checksum(data))
                .push(offset as u32)
                .push(data.len() as u32);
            offset += padded_len(data);
        }
        for data in self.tables.values() {
            buf.extend_bytes(data);
            buf.extend(std::iter::repeat_n(0u8, padded_len(data) - data.len()));
        }
        buf.into_inner()
    }
}

fn padded_len(data: &[u8]) -> usize {
    (data.len() + 3) & !3
}

fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

fn cmap_table(mappings: &[(char, u16)]) -> Vec<u8> {
    let mut mappings: Vec<_> = mappings
        .iter()
        .map(|(ch, gid)| (*ch as u32 as u16, *gid))
        .collect();
    mappings.sort();
    // one segment per mapping plus the required 0xFFFF terminator
    let seg_count = mappings.len() as u16 + 1;
    let search_range = 2 * (1u16 << seg_count.ilog2());
    let mut buf = BeBuffer::new();
    buf.push(0u16).push(1u16);
    buf.push(3u16).push(1u16).push(12u32);
    buf.push(4u16)
        .push(16 + 8 * seg_count)
        .push(0u16)
        .push(seg_count * 2)
        .push(search_range)
        .push(seg_count.ilog2() as u16)
        .push(seg_count * 2 - search_range);
    buf.extend(mappings.iter().map(|(cp, _)| *cp)).push(0xFFFFu16);
    buf.push(0u16);
    buf.extend(mappings.iter().map(|(cp, _)| *cp)).push(0xFFFFu16);
    buf.extend(mappings.iter().map(|(cp, gid)| gid.wrapping_sub(*cp)))
        .push(1u16);
    buf.extend(mappings.iter().map(|_| 0u16)).push(0u16);
    buf.into_inner()
}

fn head_table() -> Vec<u8> {
    let mut buf = BeBuffer::new();
    buf.push(1u16)
        .push(0u16)
        .push(0x00010000u32)
        .push(0u32)
        .push(0x5F0F3CF5u32)
        .push(0u16)
        .push(UNITS_PER_EM)
        .extend([0u32; 4])
        .extend([0i16, 0, UNITS_PER_EM as i16, UNITS_PER_EM as i16])
        .push(0u16)
        .push(8u16)
        .push(2i16)
        // long loca offsets
        .push(1i16)
        .push(0i16);
    buf.into_inner()
}

fn maxp_table(num_glyphs: u16) -> Vec<u8> {
    let mut buf = BeBuffer::new();
    buf.push(0x00005000u32).push(num_glyphs);
    buf.into_inner()
}

fn hhea_table(num_glyphs: u16) -> Vec<u8> {
    let mut buf = BeBuffer::new();
    buf.push(0x00010000u32)
        .extend([800i16, -200, 0])
        .push(UNITS_PER_EM)
        .extend([0i16, 0, UNITS_PER_EM as i16, 1, 0, 0])
        .extend([0i16; 4])
        .push(0i16)
        .push(num_glyphs);
    buf.into_inner()
}

fn hmtx_table(num_glyphs: u16) -> Vec<u8> {
    let mut buf = BeBuffer::new();
    for _ in 0..num_glyphs {
        buf.push(UNITS_PER_EM).push(0i16);
    }
    buf.into_inner()
}
