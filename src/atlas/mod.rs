/// Atlas Module
///
/// Packs glyph bitmaps onto one canvas for previews and font sheets.

pub mod layout;

use crate::font::Bitmap;

pub use layout::{AtlasPacker, Layout, PackOptions, PackStrategy, Placement};

/// A composed sheet and the layout that produced it.
#[derive(Debug, Clone)]
pub struct Atlas<T> {
    pub layout: Layout,
    pub image: Bitmap<T>,
}

impl<T: Copy> Atlas<T> {
    /// Paste `bitmaps` at their placements on a `background`-filled canvas.
    /// `bitmaps` must be in the order the layout was computed for.
    pub fn compose(layout: Layout, bitmaps: &[&Bitmap<T>], background: T) -> Self {
        let mut image = Bitmap::new(layout.width, layout.height, background);
        for (bitmap, placement) in bitmaps.iter().zip(layout.placements.iter()) {
            image.paste(bitmap, placement.x, placement.y);
        }
        Self { layout, image }
    }
}

impl AtlasPacker {
    /// Lay out and compose in one step. `None` for an empty set.
    pub fn pack<T: Copy>(&self, bitmaps: &[&Bitmap<T>], background: T) -> Option<Atlas<T>> {
        let sizes: Vec<(usize, usize)> = bitmaps.iter().map(|b| b.size()).collect();
        self.layout(&sizes)
            .map(|layout| Atlas::compose(layout, bitmaps, background))
    }
}
