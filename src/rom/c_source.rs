/// C source front end: pulls the numeric arrays out of a decompiled font file.

use std::path::Path;

use itertools::Itertools;
use log::debug;
use pest::Parser;

use crate::error::{FontError, Result};

#[derive(Parser)]
#[grammar = "rom/c_source.pest"]
struct CSourceParser;

pub const CHAR_TABLE_SUFFIX: &str = "_fontchartable";
pub const PIXEL_BYTES_SUFFIX: &str = "_fontbytes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CArray {
    pub name: String,
    pub element_type: String,
    pub values: Vec<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct CSource {
    arrays: Vec<CArray>,
}

/// The metadata/pixel array pair of one font.
#[derive(Debug, Clone, Copy)]
pub struct FontArrays<'a> {
    pub name: &'a str,
    pub char_table: &'a CArray,
    pub pixel_words: &'a CArray,
}

impl CSource {
    pub fn parse(text: &str) -> Result<CSource> {
        let mut pairs = CSourceParser::parse(Rule::source, text)
            .map_err(|e| FontError::Parse(e.to_string()))?;
        let source = match pairs.next() {
            Some(pair) => pair,
            None => return Ok(CSource::default()),
        };

        let mut arrays = Vec::new();
        for pair in source.into_inner() {
            if pair.as_rule() != Rule::array {
                continue;
            }
            let mut element_type = String::new();
            let mut name = String::new();
            let mut values = Vec::new();
            for part in pair.into_inner() {
                match part.as_rule() {
                    Rule::elem_type => element_type = part.as_str().to_string(),
                    Rule::ident => name = part.as_str().to_string(),
                    Rule::values => {
                        for number in part.into_inner() {
                            values.push(parse_number(number.as_str())?);
                        }
                    }
                    _ => {}
                }
            }
            debug!("Found array {} {}[{}]", element_type, name, values.len());
            arrays.push(CArray {
                name,
                element_type,
                values,
            });
        }

        Ok(CSource { arrays })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<CSource> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    pub fn arrays(&self) -> &[CArray] {
        &self.arrays
    }

    pub fn array(&self, name: &str) -> Result<&CArray> {
        self.arrays
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| FontError::ArrayNotFound(name.to_string()))
    }

    /// Font names that have both a `<name>_fontchartable` and a `<name>_fontbytes` array.
    pub fn font_names(&self) -> Vec<&str> {
        self.arrays
            .iter()
            .filter_map(|a| a.name.strip_suffix(CHAR_TABLE_SUFFIX))
            .filter(|prefix| self.has_array(&format!("{}{}", prefix, PIXEL_BYTES_SUFFIX)))
            .unique()
            .collect()
    }

    pub fn font_arrays(&self, name: &str) -> Result<FontArrays<'_>> {
        let char_table = self.array(&format!("{}{}", name, CHAR_TABLE_SUFFIX))?;
        let pixel_words = self.array(&format!("{}{}", name, PIXEL_BYTES_SUFFIX))?;
        Ok(FontArrays {
            name: char_table
                .name
                .strip_suffix(CHAR_TABLE_SUFFIX)
                .unwrap_or(&char_table.name),
            char_table,
            pixel_words,
        })
    }

    /// The first complete font in the file.
    pub fn first_font(&self) -> Result<FontArrays<'_>> {
        match self.font_names().first() {
            Some(name) => self.font_arrays(name),
            None => Err(FontError::ArrayNotFound(format!(
                "*{} / *{}",
                CHAR_TABLE_SUFFIX, PIXEL_BYTES_SUFFIX
            ))),
        }
    }

    fn has_array(&self, name: &str) -> bool {
        self.arrays.iter().any(|a| a.name == name)
    }
}

/// Hex or decimal literal with optional `U`/`L` suffixes. Negative values wrap.
fn parse_number(literal: &str) -> Result<u32> {
    let trimmed = literal.trim_end_matches(|c| c == 'u' || c == 'U' || c == 'l' || c == 'L');
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let magnitude = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16)
    } else {
        digits.parse::<i64>()
    }
    .map_err(|e| FontError::Parse(format!("bad literal `{}`: {}", literal, e)))?;

    let value = if negative { -magnitude } else { magnitude };
    Ok(value as u32)
}
