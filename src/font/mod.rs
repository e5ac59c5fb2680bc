/// Font Module
///
/// Per-glyph extraction: locates each glyph's bytes in the shared pixel blob,
/// deswizzles and decodes them, and collects the results together with any
/// per-glyph failures.

pub mod bitmap;
pub mod extractor;

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{FontError, Warning};
use crate::rom::GlyphRecord;

pub use bitmap::{BinaryView, Bitmap, DecodedBitmap};
pub use extractor::{ExtractOptions, GlyphExtractor};

/// Handling of the display-list header some tools leave in front of glyph data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderPolicy {
    /// Glyph data starts at the record's offset.
    None,
    /// Skip past a `B8000000 00000000` (G_ENDDL) marker, or 8 bytes if none is found.
    Strip,
}

impl Default for HeaderPolicy {
    fn default() -> Self {
        HeaderPolicy::None
    }
}

/// Where a glyph's byte length came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanSource {
    /// Difference to the next record's offset.
    NextRecord,
    /// Padded canvas size; no usable successor offset.
    Estimated,
}

#[derive(Debug, Clone)]
pub struct ExtractedGlyph {
    pub record: GlyphRecord,
    pub bitmap: DecodedBitmap,
    /// Thresholded view, palette fonts only.
    pub binary: Option<BinaryView>,
    /// Stand-in for a glyph without pixel data.
    pub placeholder: bool,
    pub span: Option<(usize, SpanSource)>,
}

impl ExtractedGlyph {
    pub fn codepoint(&self) -> u32 {
        self.record.codepoint
    }
}

/// Outcome of one extraction run.
#[derive(Debug, Default)]
pub struct ExtractionReport {
    pub base_offset: u32,
    glyphs: Vec<ExtractedGlyph>,
    /// Codepoint to position in `glyphs`; the first glyph wins on duplicates.
    lookup: FxHashMap<u32, usize>,
    /// Glyphs that could not be extracted, in table order.
    pub skipped: Vec<FontError>,
    pub warnings: Vec<Warning>,
}

impl ExtractionReport {
    pub(crate) fn push_glyph(&mut self, glyph: ExtractedGlyph) {
        let index = self.glyphs.len();
        self.lookup.entry(glyph.codepoint()).or_insert(index);
        self.glyphs.push(glyph);
    }

    /// Extracted glyphs in table order.
    pub fn glyphs(&self) -> &[ExtractedGlyph] {
        &self.glyphs
    }

    pub fn decoded_count(&self) -> usize {
        self.glyphs.iter().filter(|g| !g.placeholder).count()
    }

    pub fn placeholder_count(&self) -> usize {
        self.glyphs.iter().filter(|g| g.placeholder).count()
    }

    pub fn bitmaps(&self) -> Vec<&DecodedBitmap> {
        self.glyphs.iter().map(|g| &g.bitmap).collect()
    }

    /// Binary views, with a blank view for glyphs that have none.
    pub fn binary_views(&self) -> Vec<BinaryView> {
        self.glyphs
            .iter()
            .map(|g| match &g.binary {
                Some(view) => view.clone(),
                None => Bitmap::new(g.bitmap.width(), g.bitmap.height(), 0),
            })
            .collect()
    }

    pub fn glyph(&self, codepoint: u32) -> Option<&ExtractedGlyph> {
        self.lookup.get(&codepoint).map(|&i| &self.glyphs[i])
    }
}
