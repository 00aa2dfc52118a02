//! Comparable representations of glyph outlines.
//!
//! Two glyphs are considered to have the same shape when their
//! [`OutlineKey`]s are equal. For TrueType outlines the key is the ordered
//! list of points with their on-curve flags and the contour end indices,
//! with composite glyphs flattened; for CFF and CFF2 outlines it is the raw
//! charstring program.

use skrifa::{
    raw::{
        tables::{
            glyf::{Anchor, CompositeGlyphFlags, Glyf, Glyph},
            loca::Loca,
            postscript::{dict, Index},
        },
        FontRef, TableProvider,
    },
    GlyphId,
};

use crate::{
    error::{CffError, OutlineError},
    font::CodepointMap,
};

/// Maximum nesting depth of composite glyphs.
pub(crate) const COMPOSITE_RECURSION_LIMIT: usize = 32;

/// Canonical value for comparing glyph shapes.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum OutlineKey<'a> {
    /// A TrueType glyph with coordinates in 16.16 fixed point.
    Points {
        points: Vec<[i32; 2]>,
        /// Index of the last point of each contour.
        contour_ends: Vec<usize>,
        on_curve: Vec<bool>,
    },
    /// Charstring bytes of a CFF or CFF2 glyph.
    Charstring(&'a [u8]),
}

/// Source of outline keys for a single font.
#[derive(Clone)]
pub enum OutlineExtractor<'a> {
    TrueType { loca: Loca<'a>, glyf: Glyf<'a> },
    PostScript { charstrings: Index<'a> },
    Unsupported,
}

impl<'a> OutlineExtractor<'a> {
    pub fn new(font: &FontRef<'a>) -> Self {
        if let (Ok(loca), Ok(glyf)) = (font.loca(None), font.glyf()) {
            return Self::TrueType { loca, glyf };
        }
        match postscript_charstrings(font) {
            Some(Ok(charstrings)) => Self::PostScript { charstrings },
            Some(Err(e)) => {
                log::warn!("unable to read charstrings: {e}");
                Self::Unsupported
            }
            None => Self::Unsupported,
        }
    }

    /// Returns the number of glyphs with comparable outlines.
    ///
    /// This is zero for fonts without a supported outline format.
    pub fn glyph_count(&self) -> u32 {
        match self {
            Self::TrueType { loca, .. } => loca.len().saturating_sub(1) as u32,
            Self::PostScript { charstrings } => charstrings.count(),
            Self::Unsupported => 0,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    /// Returns the outline key of the glyph mapped to `codepoint`.
    pub fn extract(
        &self,
        cmap: &CodepointMap,
        codepoint: u32,
    ) -> Result<OutlineKey<'a>, OutlineError> {
        let glyph_id = cmap
            .glyph_id(codepoint)
            .ok_or(OutlineError::NotFound(codepoint))?;
        self.glyph_key(glyph_id)
    }

    /// Returns the outline key for a glyph identifier.
    pub fn glyph_key(&self, glyph_id: GlyphId) -> Result<OutlineKey<'a>, OutlineError> {
        match self {
            Self::TrueType { loca, glyf } => {
                let outline = flatten_glyf(loca, glyf, glyph_id, 0)?;
                Ok(OutlineKey::Points {
                    points: outline.points.into_iter().map(|p| p.map(to_fixed)).collect(),
                    contour_ends: outline.contour_ends,
                    on_curve: outline.on_curve,
                })
            }
            Self::PostScript { charstrings } => Ok(OutlineKey::Charstring(
                charstrings.get(glyph_id.to_u32() as usize)?,
            )),
            Self::Unsupported => Err(OutlineError::UnsupportedFormat),
        }
    }
}

/// Returns the charstring index of the first font in a `CFF ` table or of
/// the `CFF2` table.
fn postscript_charstrings<'a>(font: &FontRef<'a>) -> Option<Result<Index<'a>, CffError>> {
    if let Ok(cff) = font.cff() {
        let table_data = cff.offset_data().as_bytes();
        return Some(
            cff.top_dicts()
                .get(0)
                .map_err(CffError::from)
                .and_then(|top_dict| charstrings(table_data, top_dict, false)),
        );
    }
    let cff2 = font.cff2().ok()?;
    Some(charstrings(
        cff2.offset_data().as_bytes(),
        cff2.top_dict_data(),
        true,
    ))
}

fn charstrings<'a>(
    table_data: &'a [u8],
    top_dict_data: &'a [u8],
    is_cff2: bool,
) -> Result<Index<'a>, CffError> {
    for entry in dict::entries(top_dict_data, None) {
        if let dict::Entry::CharstringsOffset(offset) = entry? {
            return Index::new(table_data.get(offset..).unwrap_or_default(), is_cff2);
        }
    }
    Ok(Index::Empty)
}

#[derive(Default)]
struct FlatOutline {
    points: Vec<[f64; 2]>,
    contour_ends: Vec<usize>,
    on_curve: Vec<bool>,
}

/// Collects the contours of a glyph, resolving components into the
/// coordinate space of the outermost glyph.
fn flatten_glyf<'a>(
    loca: &Loca<'a>,
    glyf: &Glyf<'a>,
    glyph_id: GlyphId,
    depth: usize,
) -> Result<FlatOutline, OutlineError> {
    if depth > COMPOSITE_RECURSION_LIMIT {
        return Err(OutlineError::RecursionLimitExceeded(glyph_id));
    }
    let Some(glyph) = loca.get_glyf(glyph_id, glyf)? else {
        return Ok(FlatOutline::default());
    };
    let composite = match glyph {
        Glyph::Simple(simple) => {
            let (points, on_curve) = simple
                .points()
                .map(|point| ([point.x as f64, point.y as f64], point.on_curve))
                .unzip();
            return Ok(FlatOutline {
                points,
                contour_ends: simple
                    .end_pts_of_contours()
                    .iter()
                    .map(|end| end.get() as usize)
                    .collect(),
                on_curve,
            });
        }
        Glyph::Composite(composite) => composite,
    };
    let mut outline = FlatOutline::default();
    for component in composite.components() {
        let mut child = flatten_glyf(loca, glyf, component.glyph.into(), depth + 1)?;
        let t = &component.transform;
        let [xx, yx, xy, yy] = [t.xx, t.yx, t.xy, t.yy].map(|v| v.to_f32() as f64);
        let transform = |[x, y]: [f64; 2]| [x * xx + y * xy, x * yx + y * yy];
        for point in child.points.iter_mut() {
            *point = transform(*point);
        }
        let [dx, dy] = match component.anchor {
            Anchor::Offset { x, y } => {
                let offset = [x as f64, y as f64];
                if component
                    .flags
                    .contains(CompositeGlyphFlags::SCALED_COMPONENT_OFFSET)
                {
                    transform(offset)
                } else {
                    offset
                }
            }
            Anchor::Point {
                base,
                component: component_ix,
            } => {
                let base_point = outline
                    .points
                    .get(base as usize)
                    .ok_or(OutlineError::InvalidAnchorPoint(glyph_id, base))?;
                let component_point = child
                    .points
                    .get(component_ix as usize)
                    .ok_or(OutlineError::InvalidAnchorPoint(glyph_id, component_ix))?;
                [
                    base_point[0] - component_point[0],
                    base_point[1] - component_point[1],
                ]
            }
        };
        let first_point = outline.points.len();
        outline
            .contour_ends
            .extend(child.contour_ends.iter().map(|end| end + first_point));
        outline.on_curve.extend(child.on_curve);
        outline
            .points
            .extend(child.points.into_iter().map(|[x, y]| [x + dx, y + dy]));
    }
    Ok(outline)
}

fn to_fixed(value: f64) -> i32 {
    (value * 65536.0).round() as i32
}
