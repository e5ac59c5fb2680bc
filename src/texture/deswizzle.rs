/// Tiled-to-linear sample reordering.
///
/// Texture memory stores pixels tile by tile: 8x8 tiles for 4-bit fonts and
/// 8x2 micro-blocks for 8-bit fonts. Within a tile samples are row-major, and
/// tiles follow each other left to right, top to bottom. Both granularities
/// share one addressing rule, parameterized by the tile height.

use super::sample_reader::SampleReader;
use super::TileMode;

/// Row-major samples at padded (whole-tile) dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearSamples {
    pub width: usize,
    pub height: usize,
    pub samples: Vec<u8>,
}

impl LinearSamples {
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.samples[y * self.width + x]
    }

    /// Copy out the top-left `width` x `height` region.
    pub fn crop(&self, width: usize, height: usize) -> Vec<u8> {
        let width = width.min(self.width);
        let height = height.min(self.height);
        let mut out = Vec::with_capacity(width * height);
        for row in self.samples.chunks(self.width.max(1)).take(height) {
            out.extend_from_slice(&row[..width]);
        }
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Deswizzler {
    mode: TileMode,
}

impl Deswizzler {
    pub fn new(mode: TileMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> TileMode {
        self.mode
    }

    /// Index into the tiled source stream of linear pixel (x, y) on a canvas
    /// `padded_width` samples wide.
    #[inline]
    pub fn source_index(&self, x: usize, y: usize, padded_width: usize) -> usize {
        let tw = self.mode.tile_width();
        let th = self.mode.tile_height();
        let tiles_per_row = (padded_width + tw - 1) / tw;
        let tile_index = (y / th) * tiles_per_row + x / tw;
        let in_tile = (y % th) * tw + x % tw;
        tile_index * self.mode.samples_per_tile() + in_tile
    }

    /// Reorder the tiled samples of `reader` into linear order. Dimensions are
    /// padded up to whole tiles; samples missing from the source read as 0.
    pub fn deswizzle(&self, reader: &SampleReader, width: usize, height: usize) -> LinearSamples {
        let (padded_width, padded_height) = self.mode.padded_size(width, height);
        let mut samples = vec![0u8; padded_width * padded_height];
        for y in 0..padded_height {
            for x in 0..padded_width {
                let src = self.source_index(x, y, padded_width);
                samples[y * padded_width + x] = reader.sample_at(src);
            }
        }
        LinearSamples {
            width: padded_width,
            height: padded_height,
            samples,
        }
    }

    /// Convenience wrapper over raw bytes holding `bits`-wide samples.
    pub fn deswizzle_bytes(&self, data: &[u8], bits: u32, width: usize, height: usize) -> LinearSamples {
        self.deswizzle(&SampleReader::new(data, bits), width, height)
    }

    /// Inverse of [`Deswizzler::deswizzle`]: pack linear samples back into the
    /// tiled layout with `bits`-wide samples.
    pub fn swizzle(&self, linear: &LinearSamples, bits: u32) -> Vec<u8> {
        let count = linear.width * linear.height;
        let mut tiled = vec![0u8; count];
        for y in 0..linear.height {
            for x in 0..linear.width {
                let dst = self.source_index(x, y, linear.width);
                if dst < count {
                    tiled[dst] = linear.get(x, y);
                }
            }
        }
        pack_samples(&tiled, bits)
    }
}

/// Pack one-sample-per-byte values into `bits`-wide samples, MSB first.
pub fn pack_samples(samples: &[u8], bits: u32) -> Vec<u8> {
    match bits {
        8 => samples.to_vec(),
        _ => samples
            .chunks(2)
            .map(|pair| {
                let hi = pair[0] & 0x0F;
                let lo = pair.get(1).map_or(0, |v| v & 0x0F);
                (hi << 4) | lo
            })
            .collect(),
    }
}
