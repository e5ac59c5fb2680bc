/// Texture Module
///
/// Hardware texture layouts used by the font tables: the two texel formats,
/// the two tiling granularities, and the reader/deswizzler/decoder stages
/// that turn a tiled byte span into linear pixel samples.

pub mod sample_reader;
pub mod deswizzle;
pub mod palette;
pub mod texel;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

/// RDP image format field (`G_IM_FMT_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum ImageFormatCode {
    Rgba = 0,
    Yuv = 1,
    ColorIndex = 2,
    IntensityAlpha = 3,
    Intensity = 4,
}

/// RDP texel size field (`G_IM_SIZ_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum PixelSizeCode {
    Bits4 = 0,
    Bits8 = 1,
    Bits16 = 2,
    Bits32 = 3,
}

/// Packed texel format of a font's pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureFormat {
    /// 4-bit intensity+alpha: 3 bits intensity, 1 bit alpha.
    Ia4,
    /// 8-bit palette index.
    Ci8,
}

impl TextureFormat {
    /// Map the raw `fmt`/`siz` fields of a texture load command to a supported format.
    pub fn from_hardware(fmt: u8, siz: u8) -> Option<TextureFormat> {
        let fmt = ImageFormatCode::from_u8(fmt)?;
        let siz = PixelSizeCode::from_u8(siz)?;
        match (fmt, siz) {
            (ImageFormatCode::IntensityAlpha, PixelSizeCode::Bits4) => Some(TextureFormat::Ia4),
            (ImageFormatCode::ColorIndex, PixelSizeCode::Bits8) => Some(TextureFormat::Ci8),
            _ => None,
        }
    }

    pub fn bits_per_sample(self) -> u32 {
        match self {
            TextureFormat::Ia4 => 4,
            TextureFormat::Ci8 => 8,
        }
    }

    /// Bytes occupied by `samples` packed texels.
    pub fn byte_len(self, samples: usize) -> usize {
        (samples * self.bits_per_sample() as usize + 7) / 8
    }

    /// The tiling the hardware pairs with this format.
    pub fn native_tile_mode(self) -> TileMode {
        match self {
            TextureFormat::Ia4 => TileMode::Tile8x8,
            TextureFormat::Ci8 => TileMode::Block8x2,
        }
    }
}

impl Default for TextureFormat {
    fn default() -> Self {
        TextureFormat::Ci8
    }
}

/// Tiling granularity of the stored texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileMode {
    #[serde(rename = "8x8")]
    Tile8x8,
    #[serde(rename = "8x2")]
    Block8x2,
}

impl TileMode {
    pub fn tile_width(self) -> usize {
        8
    }

    pub fn tile_height(self) -> usize {
        match self {
            TileMode::Tile8x8 => 8,
            TileMode::Block8x2 => 2,
        }
    }

    pub fn samples_per_tile(self) -> usize {
        self.tile_width() * self.tile_height()
    }

    /// Round logical dimensions up to whole tiles.
    pub fn padded_size(self, width: usize, height: usize) -> (usize, usize) {
        (
            round_up(width, self.tile_width()),
            round_up(height, self.tile_height()),
        )
    }
}

impl Default for TileMode {
    fn default() -> Self {
        TileMode::Block8x2
    }
}

fn round_up(value: usize, multiple: usize) -> usize {
    (value + multiple - 1) / multiple * multiple
}
