use crate::texture::texel::Texel;
use crate::texture::TextureFormat;

/// Dense row-major grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

/// Decoded glyph pixels.
pub type DecodedBitmap = Bitmap<Texel>;

/// Two-level glyph view, cells are 0 or 255.
pub type BinaryView = Bitmap<u8>;

impl<T: Copy> Bitmap<T> {
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }

    pub(crate) fn from_cells(width: usize, height: usize, cells: Vec<T>) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn sample_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.cells[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.cells[y * self.width + x] = value;
    }

    pub fn rows(&self) -> std::slice::Chunks<'_, T> {
        self.cells.chunks(self.width.max(1))
    }

    /// Top-left `width` x `height` region.
    pub fn crop(&self, width: usize, height: usize) -> Self {
        let width = width.min(self.width);
        let height = height.min(self.height);
        let mut cells = Vec::with_capacity(width * height);
        for row in self.rows().take(height) {
            cells.extend_from_slice(&row[..width]);
        }
        Self::from_cells(width, height, cells)
    }

    /// Copy `src` with its top-left corner at (x, y); parts outside are clipped.
    pub fn paste(&mut self, src: &Bitmap<T>, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        let copy_w = src.width.min(self.width - x);
        let copy_h = src.height.min(self.height - y);
        for row in 0..copy_h {
            let dst_start = (y + row) * self.width + x;
            let src_start = row * src.width;
            self.cells[dst_start..dst_start + copy_w]
                .copy_from_slice(&src.cells[src_start..src_start + copy_w]);
        }
    }

    pub fn map<U: Copy, F: Fn(T) -> U>(&self, f: F) -> Bitmap<U> {
        Bitmap::from_cells(self.width, self.height, self.cells.iter().map(|&c| f(c)).collect())
    }
}

impl DecodedBitmap {
    /// 1x1 blank stand-in for glyphs without pixel data.
    pub fn placeholder(format: TextureFormat) -> Self {
        Bitmap::new(1, 1, Texel::blank(format))
    }

    /// True when no texel is visible.
    pub fn is_transparent(&self) -> bool {
        self.cells.iter().all(|t| match *t {
            Texel::GrayAlpha { alpha, .. } => alpha == 0,
            Texel::Index(index) => index == 0,
        })
    }
}
