//! Cell encoding: local color selection and bit packing for one 4×8 or 8×8 cell.

use std::fmt;

use crate::pixels::{Mode, PixelSource};

/// Rows in every cell.
pub const CELL_ROWS: usize = 8;

/// Packed form of one cell.
///
/// `screen` holds two colors in its nibbles. `colmap` holds the third multicolor color in
/// its low nibble and is unused in hires mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub bitmap: [u8; CELL_ROWS],
    pub screen: u8,
    pub colmap: u8,
}

/// A cell that needs more colors than its mode allows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clash {
    /// Logical x of the cell's top-left pixel
    pub x: i32,
    /// Logical y of the cell's top-left pixel
    pub y: i32,
    /// Cell column on screen
    pub column: usize,
    /// Cell row on screen
    pub row: usize,
    /// Every distinct color in the cell, in first-seen order
    pub colors: Vec<u8>,
}

impl fmt::Display for Clash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "too many colors in cell at x={:3}, y={:3}: {:?}",
            self.x, self.y, self.colors
        )
    }
}

/// Result of encoding a single cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellEncoding {
    pub cell: Cell,
    /// Observed colors when the cell is over budget
    pub overflow: Option<Vec<u8>>,
}

/// Distinct colors in first-seen order.
pub fn observed_colors(pixels: &[u8]) -> Vec<u8> {
    let mut seen = [false; 16];
    let mut colors = Vec::new();
    for &c in pixels {
        let slot = &mut seen[(c & 0x0F) as usize];
        if !*slot {
            *slot = true;
            colors.push(c);
        }
    }
    colors
}

/// Local color set of a multicolor cell: the background, then the other colors as seen.
///
/// The result is padded with color 0 to four entries and may be longer than four when
/// the cell clashes.
pub fn multicolor_colors(pixels: &[u8], background: u8) -> Vec<u8> {
    let mut colors = vec![background];
    colors.extend(
        observed_colors(pixels)
            .into_iter()
            .filter(|&c| c != background),
    );
    pad(colors, Mode::Multicolor.budget())
}

/// Local color set of a hires cell, padded with color 0 to two entries.
pub fn hires_colors(pixels: &[u8]) -> Vec<u8> {
    pad(observed_colors(pixels), Mode::Hires.budget())
}

fn pad(mut colors: Vec<u8>, len: usize) -> Vec<u8> {
    if colors.len() < len {
        colors.resize(len, 0);
    }
    colors
}

// Position of `color` among the first `budget` local colors; overflow colors get 0.
#[inline]
fn local_index(colors: &[u8], budget: usize, color: u8) -> u8 {
    colors[..budget]
        .iter()
        .position(|&c| c == color)
        .unwrap_or(0) as u8
}

fn pack(pixels: &[u8], colors: &[u8], mode: Mode) -> [u8; CELL_ROWS] {
    let width = mode.cell_width();
    let bits = mode.bits_per_pixel();
    let budget = mode.budget();
    let mut bitmap = [0u8; CELL_ROWS];
    for (row, line) in bitmap.iter_mut().zip(pixels.chunks_exact(width)) {
        *row = line
            .iter()
            .fold(0u8, |acc, &p| (acc << bits) | local_index(colors, budget, p));
    }
    bitmap
}

/// Encodes the multicolor cell whose top-left logical pixel is (x, y).
pub fn encode_multicolor_cell(source: &PixelSource<'_>, x: i32, y: i32) -> CellEncoding {
    let pixels = source.sample(x, y, Mode::Multicolor.cell_width(), CELL_ROWS);
    let colors = multicolor_colors(&pixels, source.background());
    let overflow = (colors.len() > Mode::Multicolor.budget()).then(|| observed_colors(&pixels));
    CellEncoding {
        cell: Cell {
            bitmap: pack(&pixels, &colors, Mode::Multicolor),
            screen: (colors[1] << 4) | (colors[2] & 0x0F),
            colmap: colors[3] & 0x0F,
        },
        overflow,
    }
}

/// Encodes a multicolor cell against three colors shared by the whole picture.
///
/// Local slot 0 is the background and slots 1-3 are `shared`. Pixels with any other
/// color are packed as slot 0 and make the cell clash.
pub fn encode_multicolor_char(
    source: &PixelSource<'_>,
    x: i32,
    y: i32,
    shared: [u8; 3],
) -> CellEncoding {
    let pixels = source.sample(x, y, Mode::Multicolor.cell_width(), CELL_ROWS);
    let colors = [source.background(), shared[0], shared[1], shared[2]];
    let overflow = pixels
        .iter()
        .any(|p| !colors.contains(p))
        .then(|| observed_colors(&pixels));
    CellEncoding {
        cell: Cell {
            bitmap: pack(&pixels, &colors, Mode::Multicolor),
            screen: ((shared[0] & 0x0F) << 4) | (shared[1] & 0x0F),
            colmap: shared[2] & 0x0F,
        },
        overflow,
    }
}

/// Encodes the 8×8 hires cell whose top-left pixel is (x, y).
pub fn encode_hires_cell(source: &PixelSource<'_>, x: i32, y: i32) -> CellEncoding {
    let pixels = source.sample(x, y, Mode::Hires.cell_width(), CELL_ROWS);
    let colors = hires_colors(&pixels);
    let overflow = (colors.len() > Mode::Hires.budget()).then(|| observed_colors(&pixels));
    CellEncoding {
        cell: Cell {
            bitmap: pack(&pixels, &colors, Mode::Hires),
            screen: (colors[0] << 4) | (colors[1] & 0x0F),
            colmap: 0,
        },
        overflow,
    }
}

/// Encodes a cell in the source's own mode.
pub fn encode_cell(source: &PixelSource<'_>, x: i32, y: i32) -> CellEncoding {
    match source.mode() {
        Mode::Multicolor => encode_multicolor_cell(source, x, y),
        Mode::Hires => encode_hires_cell(source, x, y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::PixelGrid;

    fn grid_from_rows(rows: &[[u8; 8]]) -> PixelGrid {
        PixelGrid::new(8, rows.len(), rows.iter().flatten().copied().collect()).unwrap()
    }

    // Multicolor rows are given in logical pixels and doubled into the grid.
    fn mc_grid(rows: &[[u8; 4]; 8]) -> PixelGrid {
        let data = rows
            .iter()
            .flat_map(|r| r.iter().flat_map(|&c| [c, c]))
            .collect();
        PixelGrid::new(8, 8, data).unwrap()
    }

    #[test]
    fn test_observed_colors_order() {
        assert_eq!(observed_colors(&[3, 3, 1, 7, 1, 0]), vec![3, 1, 7, 0]);
    }

    #[test]
    fn test_multicolor_colors_background_first() {
        assert_eq!(multicolor_colors(&[5, 6, 6, 9], 6), vec![6, 5, 9, 0]);
        assert_eq!(multicolor_colors(&[1, 2, 3, 4, 5], 0), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_multicolor_cell_packing() {
        let rows = [[0, 1, 2, 3]; 8];
        let grid = mc_grid(&rows);
        let source = PixelSource::multicolor(&grid, 0);
        let encoding = encode_multicolor_cell(&source, 0, 0);
        assert_eq!(encoding.overflow, None);
        assert_eq!(encoding.cell.bitmap, [0b00_01_10_11; 8]);
        assert_eq!(encoding.cell.screen, 0x12);
        assert_eq!(encoding.cell.colmap, 0x03);
    }

    #[test]
    fn test_multicolor_cell_single_color() {
        let grid = PixelGrid::filled(8, 8, 1);
        let source = PixelSource::multicolor(&grid, 0);
        let encoding = encode_multicolor_cell(&source, 0, 0);
        assert_eq!(encoding.cell.bitmap, [0x55; 8]);
        assert_eq!(encoding.cell.screen, 0x10);
        assert_eq!(encoding.cell.colmap, 0x00);
    }

    #[test]
    fn test_multicolor_cell_clash() {
        let mut rows = [[0u8; 4]; 8];
        rows[0] = [1, 2, 3, 4];
        rows[1] = [5, 0, 0, 0];
        let grid = mc_grid(&rows);
        let source = PixelSource::multicolor(&grid, 0);
        let encoding = encode_multicolor_cell(&source, 0, 0);
        assert_eq!(encoding.overflow, Some(vec![1, 2, 3, 4, 5, 0]));
        assert_eq!(encoding.cell.bitmap[0], 0b01_10_11_00);
        assert_eq!(encoding.cell.bitmap[1], 0);
        assert_eq!(encoding.cell.screen, 0x12);
        assert_eq!(encoding.cell.colmap, 0x03);
    }

    #[test]
    fn test_multicolor_cell_past_edge_is_background() {
        let grid = PixelGrid::filled(8, 8, 2);
        let source = PixelSource::multicolor(&grid, 9);
        let encoding = encode_multicolor_cell(&source, 2, 4);
        assert_eq!(encoding.overflow, None);
        assert_eq!(encoding.cell.bitmap[0], 0b01_01_00_00);
        assert_eq!(encoding.cell.bitmap[7], 0);
        assert_eq!(encoding.cell.screen, 0x20);
    }

    #[test]
    fn test_multicolor_char_fixed_colors() {
        let rows = [[0, 4, 5, 6]; 8];
        let grid = mc_grid(&rows);
        let source = PixelSource::multicolor(&grid, 0);
        let encoding = encode_multicolor_char(&source, 0, 0, [4, 5, 6]);
        assert_eq!(encoding.overflow, None);
        assert_eq!(encoding.cell.bitmap, [0b00_01_10_11; 8]);
        assert_eq!(encoding.cell.screen, 0x45);
        assert_eq!(encoding.cell.colmap, 0x06);

        let clash = encode_multicolor_char(&source, 0, 0, [4, 5, 7]);
        assert_eq!(clash.overflow, Some(vec![0, 4, 5, 6]));
        assert_eq!(clash.cell.bitmap[0], 0b00_01_10_00);
    }

    #[test]
    fn test_hires_cell_packing() {
        let mut rows = [[3u8; 8]; 8];
        rows[0] = [3, 7, 7, 3, 3, 3, 3, 7];
        let grid = grid_from_rows(&rows);
        let source = PixelSource::hires(&grid, 0);
        let encoding = encode_hires_cell(&source, 0, 0);
        assert_eq!(encoding.overflow, None);
        assert_eq!(encoding.cell.bitmap[0], 0b0110_0001);
        assert_eq!(encoding.cell.bitmap[1], 0);
        assert_eq!(encoding.cell.screen, 0x37);
    }

    #[test]
    fn test_hires_cell_clash() {
        let mut rows = [[1u8; 8]; 8];
        rows[3] = [1, 2, 3, 1, 1, 1, 1, 1];
        let grid = grid_from_rows(&rows);
        let source = PixelSource::hires(&grid, 0);
        let encoding = encode_cell(&source, 0, 0);
        assert_eq!(encoding.overflow, Some(vec![1, 2, 3]));
        assert_eq!(encoding.cell.bitmap[3], 0b0100_0000);
        assert_eq!(encoding.cell.screen, 0x12);
    }

    #[test]
    fn test_clash_display() {
        let clash = Clash {
            x: 4,
            y: 16,
            column: 1,
            row: 2,
            colors: vec![0, 1, 2, 3, 4],
        };
        assert_eq!(
            clash.to_string(),
            "too many colors in cell at x=  4, y= 16: [0, 1, 2, 3, 4]"
        );
    }
}
