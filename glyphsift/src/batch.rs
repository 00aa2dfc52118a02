//! Batch processing of font files into per-glyph PNG images.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Instant,
};

use image::ImageFormat;
use rayon::prelude::*;

use crate::{
    dedup::{self, DedupStrategy},
    error::{FontError, GlyphError},
    font::Font,
    normalize::{normalize, DEFAULT_MIN_SIZE},
    outline::OutlineExtractor,
    raster::{GlyphRasterizer, Rendered, DEFAULT_RENDER_SIZE},
};

const PROGRESS_INTERVAL: usize = 10;

/// Settings shared by every font in a batch.
#[derive(Clone, Debug)]
pub struct BatchOptions {
    /// Root of the output tree. Each font writes into a subdirectory named
    /// after its file stem.
    pub output_base_dir: PathBuf,
    /// Minimum size of the shorter image side after upscaling.
    pub min_size: u32,
    /// Pixels per em used for rasterization.
    pub render_size: u32,
    pub strategy: DedupStrategy,
    /// Process fonts concurrently.
    pub parallel: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            output_base_dir: PathBuf::from("glyphs"),
            min_size: DEFAULT_MIN_SIZE,
            render_size: DEFAULT_RENDER_SIZE,
            strategy: DedupStrategy::default(),
            parallel: false,
        }
    }
}

/// Summary of a processed font.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FontReport {
    pub path: PathBuf,
    pub output_dir: PathBuf,
    /// Number of codepoints in the character map.
    pub codepoints: usize,
    /// Number of codepoints left after deduplication.
    pub representatives: usize,
    /// Images written.
    pub written: usize,
    /// Glyphs without ink.
    pub empty: usize,
    /// Glyphs that failed to render or save.
    pub failed: usize,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub fonts: Vec<FontReport>,
    pub failures: Vec<(PathBuf, FontError)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Returns the `.ttf` and `.otf` files directly inside `dir`, sorted by
/// path.
pub fn discover_fonts(dir: impl AsRef<Path>) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_font_extension(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn has_font_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf"))
}

/// Returns the output file name, without extension, for a codepoint.
pub fn glyph_file_stem(codepoint: u32) -> String {
    match char::from_u32(codepoint) {
        Some(ch) if ch.is_alphanumeric() => ch.to_string(),
        _ => format!("U{codepoint:04X}"),
    }
}

/// Extracts one image per unique glyph outline of the font at `path`.
pub fn process_font(path: &Path, options: &BatchOptions) -> Result<FontReport, FontError> {
    let font = Font::open(path)?;
    let font_ref = font.font_ref()?;
    let cmap = font.codepoint_map()?;
    let extractor = OutlineExtractor::new(&font_ref);
    if !extractor.is_supported() {
        log::warn!(
            "{}: no glyf, CFF or CFF2 outlines, skipping deduplication",
            path.display()
        );
    }
    let representatives = dedup::select(&extractor, &cmap, options.strategy);
    log::info!(
        "{}: {} unique glyphs out of {} codepoints",
        path.display(),
        representatives.len(),
        cmap.len()
    );
    let output_dir = options.output_base_dir.join(font.name());
    fs::create_dir_all(&output_dir)?;
    let mut report = FontReport {
        path: path.to_owned(),
        output_dir,
        codepoints: cmap.len(),
        representatives: representatives.len(),
        ..Default::default()
    };
    let rasterizer = GlyphRasterizer::new(&font_ref, options.render_size);
    let start = Instant::now();
    for (ix, &codepoint) in representatives.iter().enumerate() {
        match write_glyph(&rasterizer, codepoint, &report.output_dir, options.min_size) {
            Ok(true) => report.written += 1,
            Ok(false) => report.empty += 1,
            Err(e) => {
                log::warn!(
                    "{}: skipping U+{codepoint:04X}: {e}",
                    path.display()
                );
                report.failed += 1;
            }
        }
        let done = ix + 1;
        if done % PROGRESS_INTERVAL == 0 {
            log::info!(
                "{}: {done}/{} glyphs ({:.2?})",
                path.display(),
                representatives.len(),
                start.elapsed()
            );
        }
    }
    log::info!(
        "{}: wrote {} images in {:.2?} ({} empty, {} failed)",
        path.display(),
        report.written,
        start.elapsed(),
        report.empty,
        report.failed
    );
    Ok(report)
}

/// Renders and saves a single glyph. Returns false for empty glyphs.
fn write_glyph(
    rasterizer: &GlyphRasterizer,
    codepoint: u32,
    output_dir: &Path,
    min_size: u32,
) -> Result<bool, GlyphError> {
    let Rendered::Bitmap(bitmap) = rasterizer.rasterize(codepoint)? else {
        return Ok(false);
    };
    let bitmap = normalize(bitmap, min_size);
    let path = output_dir.join(format!("{}.png", glyph_file_stem(codepoint)));
    bitmap.image().save_with_format(&path, ImageFormat::Png)?;
    Ok(true)
}

/// Processes every font named by `inputs`.
///
/// Directories are scanned with [`discover_fonts`]; other paths are treated
/// as font files. Failures are logged and recorded and never stop the
/// batch.
pub fn process_batch(inputs: &[PathBuf], options: &BatchOptions) -> BatchReport {
    let mut report = BatchReport::default();
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            match discover_fonts(input) {
                Ok(found) => {
                    if found.is_empty() {
                        log::warn!("{}: no font files found", input.display());
                    }
                    paths.extend(found);
                }
                Err(e) => {
                    log::error!("{}: {e}", input.display());
                    report.failures.push((input.clone(), e.into()));
                }
            }
        } else {
            paths.push(input.clone());
        }
    }
    let results: Vec<_> = if options.parallel {
        paths
            .into_par_iter()
            .map(|path| run_font(path, options))
            .collect()
    } else {
        paths
            .into_iter()
            .map(|path| run_font(path, options))
            .collect()
    };
    for (path, result) in results {
        match result {
            Ok(font) => report.fonts.push(font),
            Err(e) => report.failures.push((path, e)),
        }
    }
    report
}

fn run_font(path: PathBuf, options: &BatchOptions) -> (PathBuf, Result<FontReport, FontError>) {
    let result = process_font(&path, options);
    if let Err(e) = &result {
        log::error!("{}: {e}", path.display());
    }
    (path, result)
}
