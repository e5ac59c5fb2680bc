use crate::error::{FontError, Result};

pub const PALETTE_SIZE: usize = 256;

/// 256-entry RGB lookup table for palette-indexed texels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<(u8, u8, u8)>,
}

impl Palette {
    /// Linear ramp: index 0 is black, 255 is white.
    pub fn grayscale() -> Self {
        Self {
            colors: (0..PALETTE_SIZE).map(|i| (i as u8, i as u8, i as u8)).collect(),
        }
    }

    pub fn from_colors(colors: Vec<(u8, u8, u8)>) -> Result<Self> {
        if colors.len() != PALETTE_SIZE {
            return Err(FontError::Config(format!(
                "palette must have {} entries, got {}",
                PALETTE_SIZE,
                colors.len()
            )));
        }
        Ok(Self { colors })
    }

    #[inline]
    pub fn get(&self, index: u8) -> (u8, u8, u8) {
        self.colors[index as usize]
    }

    /// ITU-R 601 luma of entry `index`.
    #[inline]
    pub fn luma(&self, index: u8) -> u8 {
        let (r, g, b) = self.get(index);
        luma(r, g, b)
    }

    pub fn colors(&self) -> &[(u8, u8, u8)] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::grayscale()
    }
}

pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grayscale_ramp() {
        let palette = Palette::grayscale();
        assert_eq!(palette.get(0), (0, 0, 0));
        assert_eq!(palette.get(128), (128, 128, 128));
        assert_eq!(palette.get(255), (255, 255, 255));
        assert_eq!(palette.luma(200), 200);
    }

    #[test]
    fn test_rejects_short_palette() {
        assert!(Palette::from_colors(vec![(1, 2, 3); 16]).is_err());
        let custom = Palette::from_colors(vec![(255, 0, 0); PALETTE_SIZE]).unwrap();
        assert_eq!(custom.get(9), (255, 0, 0));
        assert_eq!(custom.luma(9), 76);
    }
}
