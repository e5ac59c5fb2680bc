/// Glyph Extractor - byte-span addressing and per-glyph decode
///
/// Records carry no length: a glyph's bytes run from its own offset to the
/// next record's offset. The last glyph has no successor and falls back to
/// the size of its padded canvas, which is an estimate that can over- or
/// under-read.

use log::{debug, warn};

use super::bitmap::{Bitmap, DecodedBitmap};
use super::{ExtractedGlyph, ExtractionReport, HeaderPolicy, SpanSource};
use crate::error::{FontError, Result, Warning};
use crate::rom::{BaseOffsetRule, GlyphRecord, GlyphTable, PixelBlob};
use crate::texture::deswizzle::Deswizzler;
use crate::texture::texel::{binary_threshold, TexelDecoder};
use crate::texture::{TextureFormat, TileMode};

/// G_ENDDL followed by a zero word.
const DISPLAY_LIST_END: [u8; 8] = [0xB8, 0, 0, 0, 0, 0, 0, 0];

/// Largest glyph edge the RDP can address (10-bit tile coordinates).
pub const MAX_GLYPH_EDGE: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub tile_mode: TileMode,
    pub header: HeaderPolicy,
    pub base_offset_rule: BaseOffsetRule,
    pub include_placeholders: bool,
}

impl ExtractOptions {
    pub fn for_format(format: TextureFormat) -> Self {
        Self {
            tile_mode: format.native_tile_mode(),
            header: HeaderPolicy::None,
            base_offset_rule: BaseOffsetRule::Minimum,
            include_placeholders: true,
        }
    }
}

/// One decoded glyph and the warning raised while reading it, if any.
#[derive(Debug)]
pub struct GlyphOutcome {
    pub glyph: ExtractedGlyph,
    pub warning: Option<Warning>,
}

pub struct GlyphExtractor<'a> {
    table: &'a GlyphTable,
    blob: &'a PixelBlob,
    decoder: &'a TexelDecoder,
    deswizzler: Deswizzler,
    options: ExtractOptions,
    base_offset: u32,
}

impl<'a> GlyphExtractor<'a> {
    /// Fails when the table has no usable base offset.
    pub fn new(
        table: &'a GlyphTable,
        blob: &'a PixelBlob,
        decoder: &'a TexelDecoder,
        options: ExtractOptions,
    ) -> Result<Self> {
        let base_offset = table.base_offset(options.base_offset_rule)?;
        debug!(
            "Extractor: base offset {:#x}, blob {} bytes, {:?} {:?}",
            base_offset,
            blob.len(),
            decoder.format(),
            options.tile_mode
        );
        Ok(Self {
            table,
            blob,
            decoder,
            deswizzler: Deswizzler::new(options.tile_mode),
            options,
            base_offset,
        })
    }

    pub fn base_offset(&self) -> u32 {
        self.base_offset
    }

    fn format(&self) -> TextureFormat {
        self.decoder.format()
    }

    /// Bytes needed to fill the padded canvas of `record`. Fails for
    /// dimensions beyond `MAX_GLYPH_EDGE`.
    pub fn canvas_bytes(&self, record: &GlyphRecord) -> Result<usize> {
        let too_large = || FontError::GlyphTooLarge {
            codepoint: record.codepoint,
            width: record.width,
            height: record.height,
        };
        if record.width > MAX_GLYPH_EDGE || record.height > MAX_GLYPH_EDGE {
            return Err(too_large());
        }
        let (padded_width, padded_height) = self
            .options
            .tile_mode
            .padded_size(record.width as usize, record.height as usize);
        let samples = padded_width
            .checked_mul(padded_height)
            .ok_or_else(too_large)?;
        Ok(self.format().byte_len(samples))
    }

    /// Byte length of the glyph at `index`. An estimated span also covers the
    /// display-list header when headers are stripped.
    pub fn span_for(&self, index: usize) -> Result<(usize, SpanSource)> {
        let record = &self.table.records()[index];
        match self.table.next_record(index) {
            Some(next) if next.data_offset > record.data_offset => Ok((
                (next.data_offset - record.data_offset) as usize,
                SpanSource::NextRecord,
            )),
            _ => {
                let header = match self.options.header {
                    HeaderPolicy::Strip => DISPLAY_LIST_END.len(),
                    HeaderPolicy::None => 0,
                };
                Ok((self.canvas_bytes(record)? + header, SpanSource::Estimated))
            }
        }
    }

    /// Decode the glyph at `index` in table order.
    pub fn extract_glyph(&self, index: usize) -> Result<GlyphOutcome> {
        let record = self.table.records()[index];
        let format = self.format();

        if !record.has_pixels() {
            return Ok(GlyphOutcome {
                glyph: ExtractedGlyph {
                    record,
                    bitmap: DecodedBitmap::placeholder(format),
                    binary: None,
                    placeholder: true,
                    span: None,
                },
                warning: None,
            });
        }

        let canvas_bytes = self.canvas_bytes(&record)?;

        let start = record
            .data_offset
            .checked_sub(self.base_offset)
            .ok_or(FontError::NegativeRelativeOffset {
                codepoint: record.codepoint,
                data_offset: record.data_offset,
                base_offset: self.base_offset,
            })? as usize;

        if start >= self.blob.len() {
            return Err(FontError::GlyphDataOutOfRange {
                codepoint: record.codepoint,
                start,
                blob_len: self.blob.len(),
            });
        }

        let (span, span_source) = self.span_for(index)?;
        let mut data = self.blob.span(start, span);
        let mut requested = span;

        if self.options.header == HeaderPolicy::Strip {
            let skip = header_len(data);
            data = &data[skip.min(data.len())..];
            requested = requested.saturating_sub(skip);
        }

        let required = requested.max(canvas_bytes);
        let warning = if data.len() < required {
            Some(Warning::TruncatedSourceData {
                codepoint: record.codepoint,
                available: data.len(),
                required,
            })
        } else {
            None
        };

        let width = record.width as usize;
        let height = record.height as usize;
        let linear = self
            .deswizzler
            .deswizzle_bytes(data, format.bits_per_sample(), width, height);

        // The threshold looks at the whole padded canvas, then crops like the bitmap.
        let binary = match format {
            TextureFormat::Ci8 => Some(
                Bitmap::from_cells(linear.width, linear.height, binary_threshold(&linear.samples))
                    .crop(width, height),
            ),
            TextureFormat::Ia4 => None,
        };
        let bitmap = Bitmap::from_cells(width, height, self.decoder.expand(&linear.crop(width, height)));

        debug!(
            "Glyph {:#x} ('{}'): {}x{} start={:#x} span={} ({:?})",
            record.codepoint,
            record.display_char(),
            width,
            height,
            start,
            span,
            span_source
        );

        Ok(GlyphOutcome {
            glyph: ExtractedGlyph {
                record,
                bitmap,
                binary,
                placeholder: false,
                span: Some((span, span_source)),
            },
            warning,
        })
    }

    /// Extract every glyph. Per-glyph failures are collected, never fatal.
    pub fn extract_all(&self) -> ExtractionReport {
        let mut report = ExtractionReport {
            base_offset: self.base_offset,
            ..ExtractionReport::default()
        };
        if let Some(w) = self.table.malformed_warning() {
            report.warnings.push(w);
        }

        for index in 0..self.table.len() {
            match self.extract_glyph(index) {
                Ok(outcome) => {
                    if let Some(w) = outcome.warning {
                        warn!("{}", w);
                        report.warnings.push(w);
                    }
                    if outcome.glyph.placeholder && !self.options.include_placeholders {
                        continue;
                    }
                    report.push_glyph(outcome.glyph);
                }
                Err(e) => {
                    warn!("Skipping glyph: {}", e);
                    report.skipped.push(e);
                }
            }
        }
        report
    }
}

/// Bytes to skip so decoding starts after the display-list end marker.
fn header_len(data: &[u8]) -> usize {
    data.windows(DISPLAY_LIST_END.len())
        .position(|w| w == DISPLAY_LIST_END)
        .map_or(DISPLAY_LIST_END.len(), |pos| pos + DISPLAY_LIST_END.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::palette::Palette;
    use crate::texture::texel::{IntensityScale, Texel};

    fn table(records: &[[u32; 6]]) -> GlyphTable {
        let words: Vec<u32> = records.iter().flat_map(|r| r.iter().copied()).collect();
        GlyphTable::from_words(&words)
    }

    fn ci8() -> TexelDecoder {
        TexelDecoder::new(TextureFormat::Ci8, IntensityScale::Exact, Palette::grayscale())
    }

    fn ia4() -> TexelDecoder {
        TexelDecoder::new(TextureFormat::Ia4, IntensityScale::Exact, Palette::grayscale())
    }

    #[test]
    fn test_span_from_next_record() {
        let table = table(&[[0x41, 0, 2, 8, 0, 0x100], [0x42, 0, 2, 8, 0, 0x110]]);
        let blob = PixelBlob::from_bytes(vec![0; 0x40]);
        let decoder = ci8();
        let extractor =
            GlyphExtractor::new(&table, &blob, &decoder, ExtractOptions::for_format(TextureFormat::Ci8))
                .unwrap();
        assert_eq!(extractor.span_for(0).unwrap(), (0x10, SpanSource::NextRecord));
        assert_eq!(extractor.span_for(1).unwrap(), (16, SpanSource::Estimated));
    }

    #[test]
    fn test_last_span_estimate_by_format() {
        let table = table(&[[0x41, 0, 7, 7, 0, 0]]);
        let blob = PixelBlob::from_bytes(vec![0; 64]);
        let decoder = ia4();
        let options = ExtractOptions::for_format(TextureFormat::Ia4);
        let extractor = GlyphExtractor::new(&table, &blob, &decoder, options).unwrap();
        // 8x8 canvas of nibbles.
        assert_eq!(extractor.span_for(0).unwrap(), (32, SpanSource::Estimated));
    }

    #[test]
    fn test_zero_size_glyph_is_placeholder() {
        let table = table(&[[0x20, 0, 0, 4, 0, 0x999], [0x41, 0, 2, 8, 0, 0x100]]);
        let blob = PixelBlob::from_bytes(vec![5; 16]);
        let decoder = ia4();
        let mut options = ExtractOptions::for_format(TextureFormat::Ia4);
        options.tile_mode = TileMode::Block8x2;
        let extractor = GlyphExtractor::new(&table, &blob, &decoder, options).unwrap();

        let outcome = extractor.extract_glyph(0).unwrap();
        assert!(outcome.glyph.placeholder);
        assert_eq!(outcome.glyph.bitmap.size(), (1, 1));
        assert!(outcome.glyph.bitmap.is_transparent());

        let report = extractor.extract_all();
        assert_eq!(report.glyphs().len(), 2);
        assert_eq!(report.placeholder_count(), 1);
    }

    #[test]
    fn test_placeholders_can_be_dropped() {
        let table = table(&[[0x20, 0, 0, 0, 0, 0], [0x41, 0, 2, 8, 0, 0x100]]);
        let blob = PixelBlob::from_bytes(vec![1; 16]);
        let decoder = ci8();
        let mut options = ExtractOptions::for_format(TextureFormat::Ci8);
        options.include_placeholders = false;
        let report = GlyphExtractor::new(&table, &blob, &decoder, options)
            .unwrap()
            .extract_all();
        assert_eq!(report.glyphs().len(), 1);
        assert_eq!(report.glyphs()[0].codepoint(), 0x41);
    }

    #[test]
    fn test_out_of_range_glyph_is_skipped() {
        let table = table(&[[0x41, 0, 2, 8, 0, 0x100], [0x42, 0, 2, 8, 0, 0x200]]);
        let blob = PixelBlob::from_bytes(vec![3; 16]);
        let decoder = ci8();
        let report = GlyphExtractor::new(&table, &blob, &decoder, ExtractOptions::for_format(TextureFormat::Ci8))
            .unwrap()
            .extract_all();
        assert_eq!(report.glyphs().len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(
            report.skipped[0],
            FontError::GlyphDataOutOfRange { codepoint: 0x42, start: 0x100, blob_len: 16 }
        ));
        assert!(!report.skipped[0].is_fatal());
    }

    #[test]
    fn test_negative_offset_under_first_valid_rule() {
        let table = table(&[[0x41, 0, 2, 8, 0, 0x110], [0x42, 0, 2, 8, 0, 0x100]]);
        let blob = PixelBlob::from_bytes(vec![0; 64]);
        let decoder = ci8();
        let mut options = ExtractOptions::for_format(TextureFormat::Ci8);
        options.base_offset_rule = BaseOffsetRule::FirstValid;
        let extractor = GlyphExtractor::new(&table, &blob, &decoder, options).unwrap();
        assert!(matches!(
            extractor.extract_glyph(1),
            Err(FontError::NegativeRelativeOffset { codepoint: 0x42, .. })
        ));
    }

    #[test]
    fn test_truncated_data_zero_extends() {
        let table = table(&[[0x41, 0, 2, 8, 0, 0]]);
        let blob = PixelBlob::from_bytes(vec![9; 10]);
        let decoder = ci8();
        let extractor =
            GlyphExtractor::new(&table, &blob, &decoder, ExtractOptions::for_format(TextureFormat::Ci8))
                .unwrap();
        let outcome = extractor.extract_glyph(0).unwrap();
        assert_eq!(
            outcome.warning,
            Some(Warning::TruncatedSourceData { codepoint: 0x41, available: 10, required: 16 })
        );
        let texels = outcome.glyph.bitmap.cells();
        assert!(texels[..10].iter().all(|t| *t == Texel::Index(9)));
        assert!(texels[10..].iter().all(|t| *t == Texel::Index(0)));
    }

    #[test]
    fn test_header_strip() {
        let mut bytes = DISPLAY_LIST_END.to_vec();
        bytes.extend((1..=16).map(|v| v as u8));
        let table = table(&[[0x41, 0, 2, 8, 0, 0]]);
        let blob = PixelBlob::from_bytes(bytes);
        let decoder = ci8();
        let mut options = ExtractOptions::for_format(TextureFormat::Ci8);
        options.header = HeaderPolicy::Strip;
        let extractor = GlyphExtractor::new(&table, &blob, &decoder, options).unwrap();
        let glyph = extractor.extract_glyph(0).unwrap().glyph;
        assert_eq!(glyph.bitmap.get(0, 0), Texel::Index(1));
        assert_eq!(glyph.bitmap.get(7, 1), Texel::Index(16));
    }

    #[test]
    fn test_header_len_without_marker() {
        assert_eq!(header_len(&[1, 2, 3, 4, 5, 6, 7, 8, 9]), 8);
        assert_eq!(header_len(&[7, 7, 0xB8, 0, 0, 0, 0, 0, 0, 0, 1]), 10);
    }

    #[test]
    fn test_ia4_tile_decode_and_crop() {
        // One 8x8 tile of nibbles 0xF (intensity 7, alpha on), glyph is 5x3.
        let table = table(&[[0x41, 0, 3, 5, 0, 0]]);
        let blob = PixelBlob::from_bytes(vec![0xFF; 32]);
        let decoder = ia4();
        let extractor =
            GlyphExtractor::new(&table, &blob, &decoder, ExtractOptions::for_format(TextureFormat::Ia4))
                .unwrap();
        let outcome = extractor.extract_glyph(0).unwrap();
        assert!(outcome.warning.is_none());
        let bitmap = outcome.glyph.bitmap;
        assert_eq!(bitmap.size(), (5, 3));
        assert!(bitmap
            .cells()
            .iter()
            .all(|t| *t == Texel::GrayAlpha { intensity: 255, alpha: 255 }));
        assert!(outcome.glyph.binary.is_none());
    }

    #[test]
    fn test_binary_median_uses_padded_canvas() {
        // 8x2 block; the glyph keeps only the first 2 columns of row 0, but
        // the median is taken over every non-zero sample of the block.
        let mut bytes = vec![0u8; 16];
        bytes[0] = 4;
        bytes[1] = 6;
        bytes[5] = 10;
        bytes[6] = 10;
        let table = table(&[[0x41, 0, 1, 2, 0, 0]]);
        let blob = PixelBlob::from_bytes(bytes);
        let decoder = ci8();
        let extractor =
            GlyphExtractor::new(&table, &blob, &decoder, ExtractOptions::for_format(TextureFormat::Ci8))
                .unwrap();
        let binary = extractor.extract_glyph(0).unwrap().glyph.binary.unwrap();
        // Non-zero: 4, 6, 10, 10 -> median 8; both kept samples are off.
        assert_eq!(binary.cells(), &[0, 0]);
    }

    #[test]
    fn test_span_falls_back_when_successor_does_not_advance() {
        // A zero-size space stored at offset 0 sits between two glyphs.
        let table = table(&[
            [0x41, 0, 2, 8, 0, 0x100],
            [0x20, 0, 0, 0, 0, 0],
            [0x42, 0, 2, 8, 0, 0x110],
        ]);
        let blob = PixelBlob::from_bytes((1..=32).collect());
        let decoder = ci8();
        let extractor =
            GlyphExtractor::new(&table, &blob, &decoder, ExtractOptions::for_format(TextureFormat::Ci8))
                .unwrap();
        let canvas = extractor.canvas_bytes(&table.records()[0]).unwrap();
        assert_eq!(canvas, 16);
        assert_eq!(extractor.span_for(0).unwrap(), (canvas, SpanSource::Estimated));

        let outcome = extractor.extract_glyph(0).unwrap();
        assert!(outcome.warning.is_none());
        assert_eq!(outcome.glyph.span, Some((16, SpanSource::Estimated)));
        assert_eq!(outcome.glyph.bitmap.get(0, 0), Texel::Index(1));
        assert_eq!(outcome.glyph.bitmap.get(7, 1), Texel::Index(16));

        let report = extractor.extract_all();
        assert_eq!(report.glyphs().len(), 3);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_oversized_glyph_is_skipped() {
        let table = table(&[
            [0x41, 0, 2, 8, 0, 0x100],
            [0x42, 0, 0xFFFF_FFFF, 0xFFFF_FFFF, 0, 0x110],
            [0x43, 0, MAX_GLYPH_EDGE + 1, 8, 0, 0x120],
        ]);
        let blob = PixelBlob::from_bytes(vec![7; 0x30]);
        let decoder = ci8();
        let extractor =
            GlyphExtractor::new(&table, &blob, &decoder, ExtractOptions::for_format(TextureFormat::Ci8))
                .unwrap();
        assert!(matches!(
            extractor.span_for(2),
            Err(FontError::GlyphTooLarge { codepoint: 0x43, .. })
        ));

        let report = extractor.extract_all();
        assert_eq!(report.glyphs().len(), 1);
        assert_eq!(report.glyphs()[0].codepoint(), 0x41);
        assert_eq!(report.skipped.len(), 2);
        assert!(matches!(
            report.skipped[0],
            FontError::GlyphTooLarge { codepoint: 0x42, width: 0xFFFF_FFFF, height: 0xFFFF_FFFF }
        ));
        assert!(report.skipped.iter().all(|e| !e.is_fatal()));
    }
}
