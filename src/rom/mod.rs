/// Font data as stored by the game: the C arrays it was decompiled into,
/// the word/byte views of those arrays, and the glyph metadata table.

pub mod c_source;
pub mod glyph_table;
pub mod word_blob;

pub use c_source::{CArray, CSource, FontArrays};
pub use glyph_table::{BaseOffsetRule, GlyphRecord, GlyphTable};
pub use word_blob::PixelBlob;
