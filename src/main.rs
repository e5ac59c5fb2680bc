use std::path::PathBuf;
use std::process;

use env_logger::Env;
use log::{error, info};

use glyph_rip::atlas::AtlasPacker;
use glyph_rip::export::{write_font_outputs, ExportSettings};
use glyph_rip::rom::word_blob::words_from_be_bytes;
use glyph_rip::rom::{CSource, GlyphTable, PixelBlob};
use glyph_rip::{extract_table, summary_line, ExtractConfig, FontError, Result};

const USAGE: &str = "usage: glyph-rip [--config FILE] [--font NAME] [--out BASE] <source.c>
       glyph-rip [--config FILE] [--out BASE] --raw <table.bin> <pixels.bin>
       glyph-rip [--config FILE] --dump-config";

enum Input {
    CSource { path: PathBuf, font: Option<String> },
    Raw { table: PathBuf, pixels: PathBuf },
}

struct Args {
    input: Option<Input>,
    config: Option<PathBuf>,
    out: Option<PathBuf>,
    dump_config: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut source = None;
    let mut font = None;
    let mut raw = None;
    let mut config = None;
    let mut out = None;
    let mut dump_config = false;

    let missing = |flag: &str| FontError::Config(format!("{} needs a value\n{}", flag, USAGE));

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--font" => font = Some(args.next().ok_or_else(|| missing("--font"))?),
            "--config" => config = Some(PathBuf::from(args.next().ok_or_else(|| missing("--config"))?)),
            "--out" => out = Some(PathBuf::from(args.next().ok_or_else(|| missing("--out"))?)),
            "--raw" => {
                let table = args.next().ok_or_else(|| missing("--raw"))?;
                let pixels = args.next().ok_or_else(|| missing("--raw"))?;
                raw = Some((PathBuf::from(table), PathBuf::from(pixels)));
            }
            "--dump-config" => dump_config = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                process::exit(0);
            }
            _ if arg.starts_with("--") => {
                return Err(FontError::Config(format!("unknown option {}\n{}", arg, USAGE)))
            }
            _ => source = Some(PathBuf::from(arg)),
        }
    }

    let input = match (source, raw) {
        (Some(_), Some(_)) => {
            return Err(FontError::Config(format!(
                "give either a C source or --raw, not both\n{}",
                USAGE
            )))
        }
        (Some(path), None) => Some(Input::CSource { path, font }),
        (None, Some((table, pixels))) => Some(Input::Raw { table, pixels }),
        (None, None) => None,
    };

    Ok(Args {
        input,
        config,
        out,
        dump_config,
    })
}

/// Table words, pixel words, font name, default output base.
fn load_input(input: &Input) -> Result<(Vec<u32>, Vec<u32>, String, PathBuf)> {
    match input {
        Input::CSource { path, font } => {
            let source = CSource::load(path)?;
            let arrays = match font {
                Some(name) => source.font_arrays(name)?,
                None => source.first_font()?,
            };
            info!(
                "Using font {} ({} table words, {} pixel words)",
                arrays.name,
                arrays.char_table.values.len(),
                arrays.pixel_words.values.len()
            );
            Ok((
                arrays.char_table.values.clone(),
                arrays.pixel_words.values.clone(),
                arrays.name.to_string(),
                PathBuf::from(arrays.name),
            ))
        }
        Input::Raw { table, pixels } => {
            let name = table
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "font".to_string());
            Ok((
                words_from_be_bytes(&std::fs::read(table)?),
                words_from_be_bytes(&std::fs::read(pixels)?),
                name.clone(),
                PathBuf::from(name),
            ))
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => ExtractConfig::load_from_file(path)?,
        None => ExtractConfig::load_or_default(),
    };

    if args.dump_config {
        print!("{}", config.to_toml_string()?);
        if args.input.is_none() {
            return Ok(());
        }
    }

    let input = args
        .input
        .as_ref()
        .ok_or_else(|| FontError::Config(format!("no input given\n{}", USAGE)))?;
    let (table_words, pixel_words, font, default_base) = load_input(input)?;

    let table = GlyphTable::from_words(&table_words);
    println!("{}", summary_line(&table));

    let blob = PixelBlob::from_words(&pixel_words);
    let report = extract_table(&table, &blob, &config)?;

    let palette = config.palette()?;
    let settings = ExportSettings {
        font: &font,
        format: config.texture.format,
        tile_mode: config.tile_mode(),
        palette: &palette,
        packer: AtlasPacker::new(config.atlas),
    };
    let base = args.out.clone().unwrap_or(default_base);
    let written = write_font_outputs(&report, &settings, &base)?;
    if written.is_empty() {
        println!("No glyphs to write");
    }
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let result = parse_args().and_then(run);
    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}
