//! Error and warning types for font extraction.

use thiserror::Error;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, FontError>;

/// Errors that stop either a whole run or a single glyph.
#[derive(Error, Debug)]
pub enum FontError {
    /// The metadata sequence did not contain a single complete record.
    #[error("glyph table is empty ({discarded_words} trailing words discarded)")]
    EmptyTable { discarded_words: usize },

    /// Every record in the table has a zero width or height.
    #[error("no glyph in the table has a positive width and height")]
    NoValidGlyphs,

    /// A record's data offset lies before the base offset.
    #[error(
        "glyph {codepoint:#x}: data offset {data_offset:#x} precedes base offset {base_offset:#x}"
    )]
    NegativeRelativeOffset {
        codepoint: u32,
        data_offset: u32,
        base_offset: u32,
    },

    /// A glyph's data starts at or past the end of the pixel blob.
    #[error("glyph {codepoint:#x}: data starts at byte {start:#x}, blob holds {blob_len} bytes")]
    GlyphDataOutOfRange {
        codepoint: u32,
        start: usize,
        blob_len: usize,
    },

    /// A glyph's dimensions exceed what a texture tile can hold.
    #[error("glyph {codepoint:#x}: {width}x{height} exceeds the maximum glyph size")]
    GlyphTooLarge {
        codepoint: u32,
        width: u32,
        height: u32,
    },

    /// A named array is missing from the C source.
    #[error("array `{0}` not found in source")]
    ArrayNotFound(String),

    /// The C source could not be tokenized.
    #[error("failed to parse source: {0}")]
    Parse(String),

    /// The configuration file is unreadable or inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

impl FontError {
    /// Table-level errors abort the run; everything else only costs one glyph
    /// or one output file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FontError::EmptyTable { .. } | FontError::NoValidGlyphs)
    }
}

/// Recoverable conditions. These are reported and logged, never returned as `Err`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The metadata word count is not a multiple of the record stride.
    #[error("glyph table has {trailing_words} trailing words that do not form a record")]
    MalformedTable { trailing_words: usize },

    /// Fewer bytes were available for a glyph than requested; the rest reads as zero.
    #[error("glyph {codepoint:#x}: only {available} of {required} bytes available, zero-extended")]
    TruncatedSourceData {
        codepoint: u32,
        available: usize,
        required: usize,
    },

    /// Packing was asked to lay out zero glyphs.
    #[error("no glyphs to pack")]
    EmptyGlyphSet,
}
