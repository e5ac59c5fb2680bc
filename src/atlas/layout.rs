/// Atlas layout strategies. All of them place glyphs in input order and are
/// fully determined by the glyph sizes and the options.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::Warning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackStrategy {
    /// One line, no padding.
    SingleRow,
    /// Lines wrapped at `max_row_width`.
    Wrap,
    /// Uniform cells, `grid_columns` per row.
    Grid,
}

impl Default for PackStrategy {
    fn default() -> Self {
        PackStrategy::Wrap
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackOptions {
    pub strategy: PackStrategy,
    pub max_row_width: usize,
    /// Gap between glyphs and between rows (wrap and grid).
    pub padding: usize,
    pub grid_columns: usize,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            strategy: PackStrategy::Wrap,
            max_row_width: 512,
            padding: 1,
            grid_columns: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub width: usize,
    pub height: usize,
    /// One entry per input size, same order.
    pub placements: Vec<Placement>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AtlasPacker {
    options: PackOptions,
}

impl AtlasPacker {
    pub fn new(options: PackOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PackOptions {
        &self.options
    }

    /// Lay out glyphs of the given `(width, height)` sizes. `None` for an empty set.
    pub fn layout(&self, sizes: &[(usize, usize)]) -> Option<Layout> {
        if sizes.is_empty() {
            warn!("{}", Warning::EmptyGlyphSet);
            return None;
        }
        let layout = match self.options.strategy {
            PackStrategy::SingleRow => single_row(sizes),
            PackStrategy::Wrap => wrap_rows(sizes, self.options.max_row_width, self.options.padding),
            PackStrategy::Grid => grid(sizes, self.options.grid_columns, self.options.padding),
        };
        debug!(
            "Packed {} glyphs ({:?}) into {}x{}",
            sizes.len(),
            self.options.strategy,
            layout.width,
            layout.height
        );
        Some(layout)
    }
}

fn single_row(sizes: &[(usize, usize)]) -> Layout {
    let mut x = 0;
    let mut placements = Vec::with_capacity(sizes.len());
    for &(width, height) in sizes {
        placements.push(Placement { x, y: 0, width, height });
        x += width;
    }
    Layout {
        width: x,
        height: sizes.iter().map(|&(_, h)| h).max().unwrap_or(0),
        placements,
    }
}

/// Left to right; a glyph that would cross `max_row_width` starts a new row.
/// The first glyph always stays on row 0, however wide.
fn wrap_rows(sizes: &[(usize, usize)], max_row_width: usize, padding: usize) -> Layout {
    let mut placements = Vec::with_capacity(sizes.len());
    let mut x = 0;
    let mut y = 0;
    let mut row_height = 0;
    let mut row_width = 0;
    let mut widest_row = 0;
    let mut widest_glyph = 0;

    for &(width, height) in sizes {
        if !placements.is_empty() && x + width > max_row_width {
            widest_row = widest_row.max(row_width);
            y += row_height + padding;
            x = 0;
            row_height = 0;
        }
        placements.push(Placement { x, y, width, height });
        row_width = x + width;
        x = row_width + padding;
        row_height = row_height.max(height);
        widest_glyph = widest_glyph.max(width);
    }
    widest_row = widest_row.max(row_width);

    Layout {
        width: widest_row.min(max_row_width).max(widest_glyph),
        height: y + row_height,
        placements,
    }
}

fn grid(sizes: &[(usize, usize)], columns: usize, padding: usize) -> Layout {
    let columns = columns.max(1);
    let cell_width = sizes.iter().map(|&(w, _)| w).max().unwrap_or(0);
    let cell_height = sizes.iter().map(|&(_, h)| h).max().unwrap_or(0);
    let used_columns = sizes.len().min(columns);
    let rows = (sizes.len() + columns - 1) / columns;

    let placements = sizes
        .iter()
        .enumerate()
        .map(|(i, &(width, height))| Placement {
            x: (i % columns) * (cell_width + padding),
            y: (i / columns) * (cell_height + padding),
            width,
            height,
        })
        .collect();

    Layout {
        width: used_columns * cell_width + used_columns.saturating_sub(1) * padding,
        height: rows * cell_height + rows.saturating_sub(1) * padding,
        placements,
    }
}
