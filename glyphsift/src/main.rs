use std::path::PathBuf;

use glyphsift::{BatchOptions, DedupStrategy};

/// Extract one PNG image per visually unique glyph from font files.
#[derive(clap::Parser, Debug)]
#[command(version)]
struct Args {
    /// Root directory for the generated images
    #[arg(short, long, default_value = "glyphs")]
    output: PathBuf,
    /// Minimum pixel size of the shorter image side
    #[arg(long, default_value_t = glyphsift::DEFAULT_MIN_SIZE)]
    min_size: u32,
    /// Pixels per em used for rasterization
    #[arg(long, default_value_t = glyphsift::DEFAULT_RENDER_SIZE)]
    render_size: u32,
    /// How codepoints sharing an outline are collapsed
    #[arg(long, value_enum, default_value_t)]
    dedup: Dedup,
    /// Process fonts in parallel
    #[arg(long)]
    parallel: bool,
    /// Font files or directories containing .ttf/.otf files (may use glob
    /// syntax)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

/// Specifies how duplicate outlines are handled.
#[derive(clap::ValueEnum, Copy, Clone, Default, Debug)]
enum Dedup {
    /// Drop every codepoint whose outline is also drawn by another glyph.
    #[default]
    Pairwise,
    /// Keep the first codepoint of each group of identical outlines.
    Grouped,
}

impl From<Dedup> for DedupStrategy {
    fn from(value: Dedup) -> Self {
        match value {
            Dedup::Pairwise => Self::Pairwise,
            Dedup::Grouped => Self::Grouped,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    use clap::Parser as _;
    let args = Args::parse_from(wild::args());

    let options = BatchOptions {
        output_base_dir: args.output,
        min_size: args.min_size,
        render_size: args.render_size,
        strategy: args.dedup.into(),
        parallel: args.parallel,
    };
    let report = glyphsift::process_batch(&args.inputs, &options);
    let written: usize = report.fonts.iter().map(|font| font.written).sum();
    log::info!(
        "processed {} fonts, wrote {written} images, {} fonts failed",
        report.fonts.len(),
        report.failures.len()
    );
    if !report.is_success() {
        std::process::exit(1);
    }
}
