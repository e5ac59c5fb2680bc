//! Extraction settings, loaded from `glyph-rip.toml`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::atlas::PackOptions;
use crate::error::{FontError, Result};
use crate::font::{ExtractOptions, HeaderPolicy};
use crate::rom::BaseOffsetRule;
use crate::texture::palette::Palette;
use crate::texture::texel::{IntensityScale, TexelDecoder};
use crate::texture::{TextureFormat, TileMode};

pub const DEFAULT_CONFIG_FILE: &str = "glyph-rip.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub texture: TextureConfig,
    pub table: TableConfig,
    pub atlas: PackOptions,
    pub palette: PaletteConfig,
}

/// How the pixel blob is stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub format: TextureFormat,
    /// Defaults to the format's native tiling (IA4 8x8, CI8 8x2).
    pub tile_mode: Option<TileMode>,
    pub intensity_scale: IntensityScale,
    pub header: HeaderPolicy,
    /// Raw `G_IM_FMT_*` / `G_IM_SIZ_*` codes from the texture load command.
    /// When both are set they replace `format` on load.
    pub fmt: Option<u8>,
    pub siz: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub base_offset: BaseOffsetRule,
    /// Keep 1x1 stand-ins for glyphs without pixel data.
    pub include_placeholders: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            base_offset: BaseOffsetRule::Minimum,
            include_placeholders: true,
        }
    }
}

/// CI8 palette. Without colors a grayscale ramp is used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub colors: Option<Vec<[u8; 3]>>,
}

impl ExtractConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: ExtractConfig = toml::from_str(content)
            .map_err(|e| FontError::Config(format!("failed to parse config: {}", e)))?;
        config.apply_hardware_codes()?;
        config.palette()?;
        Ok(config)
    }

    /// `glyph-rip.toml` from the current directory, or defaults if it is missing or invalid.
    pub fn load_or_default() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_FILE).unwrap_or_default()
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| FontError::Config(format!("failed to serialize config: {}", e)))
    }

    /// Resolve `fmt`/`siz` into `format`.
    pub fn apply_hardware_codes(&mut self) -> Result<()> {
        match (self.texture.fmt, self.texture.siz) {
            (None, None) => Ok(()),
            (Some(fmt), Some(siz)) => {
                self.texture.format = TextureFormat::from_hardware(fmt, siz).ok_or_else(|| {
                    FontError::Config(format!("unsupported texture fmt {} / siz {}", fmt, siz))
                })?;
                Ok(())
            }
            _ => Err(FontError::Config(
                "texture `fmt` and `siz` must be given together".to_string(),
            )),
        }
    }

    pub fn palette(&self) -> Result<Palette> {
        match &self.palette.colors {
            Some(colors) => Palette::from_colors(colors.iter().map(|c| (c[0], c[1], c[2])).collect()),
            None => Ok(Palette::grayscale()),
        }
    }

    pub fn tile_mode(&self) -> TileMode {
        self.texture
            .tile_mode
            .unwrap_or_else(|| self.texture.format.native_tile_mode())
    }

    pub fn decoder(&self) -> Result<TexelDecoder> {
        Ok(TexelDecoder::new(
            self.texture.format,
            self.texture.intensity_scale,
            self.palette()?,
        ))
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            tile_mode: self.tile_mode(),
            header: self.texture.header,
            base_offset_rule: self.table.base_offset,
            include_placeholders: self.table.include_placeholders,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::PackStrategy;

    #[test]
    fn test_default_config() {
        let config = ExtractConfig::default();
        assert_eq!(config.texture.format, TextureFormat::Ci8);
        assert_eq!(config.tile_mode(), TileMode::Block8x2);
        assert!(config.table.include_placeholders);
        assert_eq!(config.atlas.strategy, PackStrategy::Wrap);
        assert_eq!(config.extract_options(), ExtractOptions::for_format(TextureFormat::Ci8));
    }

    #[test]
    fn test_partial_config() {
        let config = ExtractConfig::from_toml_str(
            r#"
[texture]
format = "ia4"
intensity_scale = "shift"
header = "strip"

[atlas]
strategy = "single_row"
"#,
        )
        .unwrap();
        assert_eq!(config.texture.format, TextureFormat::Ia4);
        assert_eq!(config.tile_mode(), TileMode::Tile8x8);
        assert_eq!(config.texture.intensity_scale, IntensityScale::Shift);
        assert_eq!(config.texture.header, HeaderPolicy::Strip);
        assert_eq!(config.atlas.strategy, PackStrategy::SingleRow);
        assert_eq!(config.atlas.padding, PackOptions::default().padding);
        assert_eq!(config.table.base_offset, BaseOffsetRule::Minimum);
    }

    #[test]
    fn test_tile_mode_override() {
        let config = ExtractConfig::from_toml_str(
            "[texture]\nformat = \"ia4\"\ntile_mode = \"8x2\"\n[table]\nbase_offset = \"first_valid\"\n",
        )
        .unwrap();
        assert_eq!(config.tile_mode(), TileMode::Block8x2);
        assert_eq!(config.extract_options().base_offset_rule, BaseOffsetRule::FirstValid);
    }

    #[test]
    fn test_hardware_codes_select_format() {
        let config = ExtractConfig::from_toml_str("[texture]\nformat = \"ci8\"\nfmt = 3\nsiz = 0\n").unwrap();
        assert_eq!(config.texture.format, TextureFormat::Ia4);
        assert_eq!(config.tile_mode(), TileMode::Tile8x8);

        let config = ExtractConfig::from_toml_str("[texture]\nfmt = 2\nsiz = 1\n").unwrap();
        assert_eq!(config.texture.format, TextureFormat::Ci8);
    }

    #[test]
    fn test_bad_hardware_codes_rejected() {
        let err = ExtractConfig::from_toml_str("[texture]\nfmt = 0\nsiz = 2\n").unwrap_err();
        assert!(matches!(err, FontError::Config(_)));
        let err = ExtractConfig::from_toml_str("[texture]\nfmt = 3\n").unwrap_err();
        assert!(matches!(err, FontError::Config(_)));
    }

    #[test]
    fn test_short_palette_rejected() {
        let err = ExtractConfig::from_toml_str("[palette]\ncolors = [[1, 2, 3]]\n").unwrap_err();
        assert!(matches!(err, FontError::Config(_)));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut config = ExtractConfig::default();
        config.texture.tile_mode = Some(TileMode::Tile8x8);
        config.atlas.max_row_width = 128;
        let text = config.to_toml_string().unwrap();
        assert_eq!(ExtractConfig::from_toml_str(&text).unwrap(), config);
    }
}
