//! PNG atlases and the TOML manifest describing them.

use std::path::{Path, PathBuf};

use image::{GrayAlphaImage, GrayImage, ImageBuffer, Luma, LumaA};
use log::info;
use serde::Serialize;

use crate::atlas::{Atlas, AtlasPacker, Layout};
use crate::error::{FontError, Result};
use crate::font::{BinaryView, DecodedBitmap, ExtractionReport};
use crate::texture::palette::Palette;
use crate::texture::texel::Texel;
use crate::texture::{TextureFormat, TileMode};

/// Opaque grayscale, palette entries reduced to luma.
pub fn luma_image(bitmap: &DecodedBitmap, palette: &Palette) -> GrayImage {
    ImageBuffer::from_fn(bitmap.width() as u32, bitmap.height() as u32, |x, y| {
        Luma([bitmap.get(x as usize, y as usize).luma(palette)])
    })
}

pub fn gray_alpha_image(bitmap: &DecodedBitmap, palette: &Palette) -> GrayAlphaImage {
    ImageBuffer::from_fn(bitmap.width() as u32, bitmap.height() as u32, |x, y| {
        let texel = bitmap.get(x as usize, y as usize);
        LumaA([texel.luma(palette), texel.alpha()])
    })
}

pub fn binary_image(view: &BinaryView) -> GrayImage {
    ImageBuffer::from_fn(view.width() as u32, view.height() as u32, |x, y| {
        Luma([view.get(x as usize, y as usize)])
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    pub codepoint: u32,
    pub character: String,
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub v_offset: i32,
    pub flags: u32,
    pub placeholder: bool,
}

/// Where each glyph landed in the atlas, plus the metrics needed to typeset it.
#[derive(Debug, Clone, Serialize)]
pub struct GlyphManifest {
    pub font: String,
    pub format: TextureFormat,
    pub tile_mode: TileMode,
    pub base_offset: u32,
    pub atlas_width: usize,
    pub atlas_height: usize,
    pub skipped: usize,
    pub glyphs: Vec<ManifestEntry>,
}

impl GlyphManifest {
    pub fn new(
        font: &str,
        format: TextureFormat,
        tile_mode: TileMode,
        report: &ExtractionReport,
        layout: &Layout,
    ) -> Self {
        let glyphs = report
            .glyphs()
            .iter()
            .zip(layout.placements.iter())
            .map(|(glyph, p)| ManifestEntry {
                codepoint: glyph.codepoint(),
                character: glyph.record.display_char().to_string(),
                x: p.x,
                y: p.y,
                width: p.width,
                height: p.height,
                v_offset: glyph.record.v_offset,
                flags: glyph.record.flags,
                placeholder: glyph.placeholder,
            })
            .collect();
        Self {
            font: font.to_string(),
            format,
            tile_mode,
            base_offset: report.base_offset,
            atlas_width: layout.width,
            atlas_height: layout.height,
            skipped: report.skipped.len(),
            glyphs,
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| FontError::Config(format!("failed to serialize manifest: {}", e)))
    }
}

/// Settings `write_font_outputs` needs besides the report itself.
pub struct ExportSettings<'a> {
    pub font: &'a str,
    pub format: TextureFormat,
    pub tile_mode: TileMode,
    pub palette: &'a Palette,
    pub packer: AtlasPacker,
}

fn output_path(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(suffix);
    base.with_file_name(name)
}

/// Write `<base>_grayscale.png`, `<base>_binary.png` (palette fonts) and
/// `<base>_manifest.toml`. Returns the written paths; none for an empty report.
pub fn write_font_outputs(
    report: &ExtractionReport,
    settings: &ExportSettings,
    base: &Path,
) -> Result<Vec<PathBuf>> {
    let bitmaps = report.bitmaps();
    let atlas = match settings
        .packer
        .pack(&bitmaps, Texel::blank(settings.format))
    {
        Some(atlas) => atlas,
        None => return Ok(Vec::new()),
    };

    let mut written = Vec::new();

    let gray_path = output_path(base, "_grayscale.png");
    match settings.format {
        TextureFormat::Ia4 => gray_alpha_image(&atlas.image, settings.palette).save(&gray_path)?,
        TextureFormat::Ci8 => luma_image(&atlas.image, settings.palette).save(&gray_path)?,
    }
    written.push(gray_path);

    if settings.format == TextureFormat::Ci8 {
        let views = report.binary_views();
        let view_refs: Vec<&BinaryView> = views.iter().collect();
        let binary = Atlas::compose(atlas.layout.clone(), &view_refs, 0u8);
        let binary_path = output_path(base, "_binary.png");
        binary_image(&binary.image).save(&binary_path)?;
        written.push(binary_path);
    }

    let manifest = GlyphManifest::new(
        settings.font,
        settings.format,
        settings.tile_mode,
        report,
        &atlas.layout,
    );
    let manifest_path = output_path(base, "_manifest.toml");
    std::fs::write(&manifest_path, manifest.to_toml_string()?)?;
    written.push(manifest_path);

    for path in &written {
        info!("Wrote {}", path.display());
    }
    Ok(written)
}
