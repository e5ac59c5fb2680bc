/// Texel expansion: packed 4-bit intensity+alpha and 8-bit palette indices
/// to full-depth samples, plus the two-level view of palette glyphs.

use serde::{Deserialize, Serialize};

use super::palette::Palette;
use super::TextureFormat;

/// One decoded pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Texel {
    GrayAlpha { intensity: u8, alpha: u8 },
    Index(u8),
}

impl Texel {
    pub const TRANSPARENT: Texel = Texel::GrayAlpha {
        intensity: 0,
        alpha: 0,
    };

    /// The zero texel of `format`: transparent for IA4, index 0 for CI8.
    pub fn blank(format: TextureFormat) -> Texel {
        match format {
            TextureFormat::Ia4 => Texel::TRANSPARENT,
            TextureFormat::Ci8 => Texel::Index(0),
        }
    }

    pub fn luma(&self, palette: &Palette) -> u8 {
        match *self {
            Texel::GrayAlpha { intensity, .. } => intensity,
            Texel::Index(index) => palette.luma(index),
        }
    }

    /// Palette texels carry no coverage of their own and are always opaque.
    pub fn alpha(&self) -> u8 {
        match *self {
            Texel::GrayAlpha { alpha, .. } => alpha,
            Texel::Index(_) => 255,
        }
    }

    pub fn rgba(&self, palette: &Palette) -> [u8; 4] {
        match *self {
            Texel::GrayAlpha { intensity, alpha } => [intensity, intensity, intensity, alpha],
            Texel::Index(index) => {
                let (r, g, b) = palette.get(index);
                [r, g, b, 255]
            }
        }
    }
}

/// How a 3-bit intensity widens to 8 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityScale {
    /// `i * 255 / 7`: full 0..=255 range.
    Exact,
    /// `i * 32`: tops out at 224.
    Shift,
}

impl IntensityScale {
    #[inline]
    pub fn expand(self, intensity3: u8) -> u8 {
        let i = (intensity3 & 0x07) as u32;
        match self {
            IntensityScale::Exact => (i * 255 / 7) as u8,
            IntensityScale::Shift => (i * 32) as u8,
        }
    }
}

impl Default for IntensityScale {
    fn default() -> Self {
        IntensityScale::Exact
    }
}

#[derive(Debug, Clone)]
pub struct TexelDecoder {
    format: TextureFormat,
    scale: IntensityScale,
    palette: Palette,
}

impl TexelDecoder {
    pub fn new(format: TextureFormat, scale: IntensityScale, palette: Palette) -> Self {
        Self {
            format,
            scale,
            palette,
        }
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Expand one raw sample (a nibble for IA4, a byte for CI8).
    #[inline]
    pub fn decode_sample(&self, sample: u8) -> Texel {
        match self.format {
            TextureFormat::Ia4 => Texel::GrayAlpha {
                intensity: self.scale.expand((sample >> 1) & 0x07),
                alpha: if sample & 0x01 != 0 { 255 } else { 0 },
            },
            TextureFormat::Ci8 => Texel::Index(sample),
        }
    }

    /// Expand already-unpacked samples, one per byte.
    pub fn expand(&self, samples: &[u8]) -> Vec<Texel> {
        samples.iter().map(|&s| self.decode_sample(s)).collect()
    }
}

/// Twice the median of the non-zero values, kept doubled so the even-count
/// mean stays exact. `None` when every value is zero.
pub fn doubled_nonzero_median(indices: &[u8]) -> Option<u32> {
    let mut non_zero: Vec<u8> = indices.iter().copied().filter(|&v| v > 0).collect();
    if non_zero.is_empty() {
        return None;
    }
    non_zero.sort_unstable();
    let mid = non_zero.len() / 2;
    Some(if non_zero.len() % 2 == 1 {
        non_zero[mid] as u32 * 2
    } else {
        non_zero[mid - 1] as u32 + non_zero[mid] as u32
    })
}

/// Two-level view: 255 where the index is strictly above the median of the
/// non-zero indices, 0 elsewhere.
pub fn binary_threshold(indices: &[u8]) -> Vec<u8> {
    match doubled_nonzero_median(indices) {
        None => vec![0; indices.len()],
        Some(median2) => indices
            .iter()
            .map(|&v| if v as u32 * 2 > median2 { 255 } else { 0 })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::sample_reader::SampleReader;

    fn unpack(decoder: &TexelDecoder, packed: &[u8], count: usize) -> Vec<Texel> {
        let reader = SampleReader::new(packed, decoder.format().bits_per_sample());
        let samples: Vec<u8> = (0..count).map(|i| reader.sample_at(i)).collect();
        decoder.expand(&samples)
    }

    fn ia4(scale: IntensityScale) -> TexelDecoder {
        TexelDecoder::new(TextureFormat::Ia4, scale, Palette::grayscale())
    }

    #[test]
    fn test_exact_expansion_endpoints() {
        assert_eq!(IntensityScale::Exact.expand(0), 0);
        assert_eq!(IntensityScale::Exact.expand(7), 255);
        assert_eq!(IntensityScale::Exact.expand(3), 109);
    }

    #[test]
    fn test_expansion_is_monotonic() {
        for scale in [IntensityScale::Exact, IntensityScale::Shift].iter() {
            for i in 0..7u8 {
                assert!(scale.expand(i) < scale.expand(i + 1));
            }
        }
        assert_eq!(IntensityScale::Shift.expand(7), 224);
    }

    #[test]
    fn test_ia4_bit_split() {
        let decoder = ia4(IntensityScale::Exact);
        assert_eq!(
            decoder.decode_sample(0b1111),
            Texel::GrayAlpha { intensity: 255, alpha: 255 }
        );
        assert_eq!(
            decoder.decode_sample(0b1110),
            Texel::GrayAlpha { intensity: 255, alpha: 0 }
        );
        assert_eq!(
            decoder.decode_sample(0b0001),
            Texel::GrayAlpha { intensity: 0, alpha: 255 }
        );
    }

    #[test]
    fn test_ia4_high_nibble_first() {
        let decoder = ia4(IntensityScale::Shift);
        let texels = unpack(&decoder, &[0xF0], 2);
        assert_eq!(texels[0], Texel::GrayAlpha { intensity: 224, alpha: 255 });
        assert_eq!(texels[1], Texel::TRANSPARENT);
    }

    #[test]
    fn test_decode_past_end_is_zero() {
        let decoder = ia4(IntensityScale::Exact);
        let texels = unpack(&decoder, &[0xFF], 5);
        assert_eq!(texels.len(), 5);
        assert!(texels[2..].iter().all(|t| *t == Texel::TRANSPARENT));

        let ci8 = TexelDecoder::new(TextureFormat::Ci8, IntensityScale::Exact, Palette::grayscale());
        assert_eq!(unpack(&ci8, &[9], 2), vec![Texel::Index(9), Texel::Index(0)]);
    }

    #[test]
    fn test_custom_palette_resolution() {
        let mut colors = vec![(0, 0, 0); 256];
        colors[4] = (10, 20, 30);
        let decoder = TexelDecoder::new(
            TextureFormat::Ci8,
            IntensityScale::Exact,
            Palette::from_colors(colors).unwrap(),
        );
        let texel = decoder.decode_sample(4);
        assert_eq!(texel.rgba(decoder.palette()), [10, 20, 30, 255]);
    }

    #[test]
    fn test_binary_threshold_strictly_greater() {
        let view = binary_threshold(&[0, 0, 4, 4, 8, 8, 0, 0]);
        assert_eq!(view, vec![0, 0, 0, 0, 255, 255, 0, 0]);
    }

    #[test]
    fn test_binary_threshold_even_count_mean() {
        // Non-zero values 2, 5 -> median 3.5; 5 is on, 2 is off.
        assert_eq!(binary_threshold(&[2, 5, 0]), vec![0, 255, 0]);
        assert_eq!(doubled_nonzero_median(&[2, 5, 0]), Some(7));
    }

    #[test]
    fn test_binary_threshold_all_zero() {
        assert_eq!(binary_threshold(&[0, 0, 0]), vec![0, 0, 0]);
        assert_eq!(doubled_nonzero_median(&[]), None);
    }
}
