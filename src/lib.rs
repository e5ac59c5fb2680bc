//! Recovers glyph bitmaps from N64 font data (a glyph metadata table plus a
//! tiled 4-bit intensity+alpha or 8-bit palette texture) and packs them into
//! atlases.

#[macro_use]
extern crate pest_derive;

pub mod atlas;
pub mod config;
pub mod error;
pub mod export;
pub mod font;
pub mod rom;
pub mod texture;

use log::info;

pub use config::ExtractConfig;
pub use error::{FontError, Result, Warning};
pub use font::ExtractionReport;

use font::GlyphExtractor;
use rom::{GlyphTable, PixelBlob};

/// Decode every glyph of one font. Fails only on table-level problems;
/// per-glyph failures end up in the report.
pub fn extract_font(
    metadata_words: &[u32],
    pixel_words: &[u32],
    config: &ExtractConfig,
) -> Result<ExtractionReport> {
    let table = GlyphTable::from_words(metadata_words);
    let blob = PixelBlob::from_words(pixel_words);
    extract_table(&table, &blob, config)
}

pub fn extract_table(
    table: &GlyphTable,
    blob: &PixelBlob,
    config: &ExtractConfig,
) -> Result<ExtractionReport> {
    let decoder = config.decoder()?;
    let extractor = GlyphExtractor::new(table, blob, &decoder, config.extract_options())?;
    let report = extractor.extract_all();
    info!(
        "Decoded {} glyphs ({} placeholders, {} skipped, {} warnings)",
        report.decoded_count(),
        report.placeholder_count(),
        report.skipped.len(),
        report.warnings.len()
    );
    Ok(report)
}

/// `Found N characters. Total logical pixels: P`
pub fn summary_line(table: &GlyphTable) -> String {
    format!(
        "Found {} characters. Total logical pixels: {}",
        table.len(),
        table.total_logical_pixels()
    )
}
