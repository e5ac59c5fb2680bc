use binary_reader::{BinaryReader, Endian};
use log::warn;

/// Split a raw big-endian dump into 32-bit words. Up to three trailing bytes
/// that do not form a word are dropped.
pub fn words_from_be_bytes(bytes: &[u8]) -> Vec<u32> {
    let mut reader = BinaryReader::from_u8(bytes);
    reader.endian = Endian::Big;

    let mut words = Vec::with_capacity(bytes.len() / 4);
    while let Ok(word) = reader.read_u32() {
        words.push(word);
    }

    let leftover = bytes.len() % 4;
    if leftover != 0 {
        warn!("Word dump has {} trailing bytes, ignored", leftover);
    }
    words
}

/// Big-endian byte reassembly of 32-bit words.
pub fn be_bytes_from_words(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes().to_vec()).collect()
}

/// Texture bytes shared read-only by every glyph of a font.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelBlob {
    bytes: Vec<u8>,
}

impl PixelBlob {
    pub fn from_words(words: &[u32]) -> Self {
        Self {
            bytes: be_bytes_from_words(words),
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `[start, start + len)` clipped to the blob; empty when `start` is past the end.
    pub fn span(&self, start: usize, len: usize) -> &[u8] {
        if start >= self.bytes.len() {
            return &[];
        }
        let end = start.saturating_add(len).min(self.bytes.len());
        &self.bytes[start..end]
    }
}
