/// Texel Sample Reader - fixed-width sample access over packed texture bytes
///
/// Samples are packed MSB first: for 4-bit data the high nibble of each byte
/// is the earlier sample. Reads past the end of the data yield 0 so that a
/// truncated glyph decodes as transparent instead of failing.

#[derive(Debug, Clone, Copy)]
pub struct SampleReader<'a> {
    data: &'a [u8],
    bits: u32,
}

impl<'a> SampleReader<'a> {
    /// `bits` must be 4 or 8.
    pub fn new(data: &'a [u8], bits: u32) -> Self {
        debug_assert!(bits == 4 || bits == 8);
        Self { data, bits }
    }

    /// Sample `index`; 0 when out of range.
    pub fn sample_at(&self, index: usize) -> u8 {
        match self.bits {
            8 => self.data.get(index).copied().unwrap_or(0),
            _ => {
                let byte = match self.data.get(index / 2) {
                    Some(&b) => b,
                    None => return 0,
                };
                if index % 2 == 0 {
                    byte >> 4
                } else {
                    byte & 0x0F
                }
            }
        }
    }
}
