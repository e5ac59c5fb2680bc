/// Glyph metadata table: fixed six-word records describing each character.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{FontError, Result, Warning};

pub const RECORD_WORDS: usize = 6;

const CODEPOINT_IDX: usize = 0;
const V_OFFSET_IDX: usize = 1;
const HEIGHT_IDX: usize = 2;
const WIDTH_IDX: usize = 3;
const FLAGS_IDX: usize = 4;
const DATA_OFFSET_IDX: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlyphRecord {
    pub codepoint: u32,
    pub v_offset: i32,
    pub height: u32,
    pub width: u32,
    pub flags: u32,
    /// Absolute address of the pixel data in the game's memory image.
    pub data_offset: u32,
}

impl GlyphRecord {
    fn from_words(words: &[u32]) -> Self {
        Self {
            codepoint: words[CODEPOINT_IDX],
            v_offset: words[V_OFFSET_IDX] as i32,
            height: words[HEIGHT_IDX],
            width: words[WIDTH_IDX],
            flags: words[FLAGS_IDX],
            data_offset: words[DATA_OFFSET_IDX],
        }
    }

    /// Whether the glyph carries pixel data.
    pub fn has_pixels(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Printable form of the codepoint for logs.
    pub fn display_char(&self) -> char {
        match std::char::from_u32(self.codepoint) {
            Some(c) if !c.is_control() => c,
            _ => '?',
        }
    }
}

/// Which record anchors the blob-relative offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseOffsetRule {
    /// Smallest offset among records with pixels.
    Minimum,
    /// Offset of the first record with pixels, in table order.
    FirstValid,
}

impl Default for BaseOffsetRule {
    fn default() -> Self {
        BaseOffsetRule::Minimum
    }
}

#[derive(Debug, Clone)]
pub struct GlyphTable {
    records: Vec<GlyphRecord>,
    trailing_words: usize,
}

impl GlyphTable {
    /// Group `words` into records; a short trailing group is dropped.
    pub fn from_words(words: &[u32]) -> Self {
        let chunks = words.chunks_exact(RECORD_WORDS);
        let trailing_words = chunks.remainder().len();
        let records: Vec<GlyphRecord> = chunks.map(GlyphRecord::from_words).collect();

        if trailing_words > 0 {
            warn!("{}", Warning::MalformedTable { trailing_words });
        }

        debug!(
            "Glyph table: {} records, {} with pixels",
            records.len(),
            records.iter().filter(|r| r.has_pixels()).count()
        );

        Self {
            records,
            trailing_words,
        }
    }

    pub fn records(&self) -> &[GlyphRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GlyphRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record after `index` in table order.
    pub fn next_record(&self, index: usize) -> Option<&GlyphRecord> {
        self.records.get(index + 1)
    }

    pub fn trailing_words(&self) -> usize {
        self.trailing_words
    }

    /// Warning for a word count that is not a multiple of the record size.
    pub fn malformed_warning(&self) -> Option<Warning> {
        if self.trailing_words > 0 {
            Some(Warning::MalformedTable {
                trailing_words: self.trailing_words,
            })
        } else {
            None
        }
    }

    pub fn base_offset(&self, rule: BaseOffsetRule) -> Result<u32> {
        if self.records.is_empty() {
            return Err(FontError::EmptyTable {
                discarded_words: self.trailing_words,
            });
        }
        let mut valid = self.records.iter().filter(|r| r.has_pixels());
        let base = match rule {
            BaseOffsetRule::Minimum => valid.map(|r| r.data_offset).min(),
            BaseOffsetRule::FirstValid => valid.next().map(|r| r.data_offset),
        };
        base.ok_or(FontError::NoValidGlyphs)
    }

    /// Sum of width * height over all records.
    pub fn total_logical_pixels(&self) -> u64 {
        self.records
            .iter()
            .map(|r| r.width as u64 * r.height as u64)
            .sum()
    }
}
