//! Full-screen pictures in Koala (multicolor) and Hires format.

use log::debug;

use crate::cell::{
    encode_hires_cell, encode_multicolor_cell, encode_multicolor_char, Cell, CellEncoding, Clash,
    CELL_ROWS,
};
use crate::pixels::{Mode, PixelSource};
use crate::{Result, VicError, BITMAP_SIZE, CELL_COUNT, SCREEN_COLUMNS, SCREEN_ROWS};

/// A full-screen multicolor picture in KoalaPainter structure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Koala {
    /// 8000 bytes, 8 bytes per cell in cell raster order
    pub bitmap: Vec<u8>,
    /// 1000 bytes, colors for bit pairs `01` (high nibble) and `10` (low nibble)
    pub screen: Vec<u8>,
    /// 1000 bytes, color for bit pair `11` in the low nibble
    pub colmap: Vec<u8>,
    /// Color for bit pair `00`, shared by the whole picture
    pub background: u8,
}

/// A full-screen hires picture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hires {
    /// 8000 bytes, 8 bytes per cell in cell raster order
    pub bitmap: Vec<u8>,
    /// 1000 bytes, color for clear bits (high nibble) and set bits (low nibble)
    pub screen: Vec<u8>,
}

/// Either kind of picture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Picture {
    Koala(Koala),
    Hires(Hires),
}

/// An encoded picture together with the cells that did not fit their color budget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Encoded<P> {
    pub picture: P,
    pub clashes: Vec<Clash>,
}

impl<P> Encoded<P> {
    /// True when every cell fit its color budget.
    pub fn is_clean(&self) -> bool {
        self.clashes.is_empty()
    }

    pub fn map<Q>(self, f: impl FnOnce(P) -> Q) -> Encoded<Q> {
        Encoded {
            picture: f(self.picture),
            clashes: self.clashes,
        }
    }
}

#[inline]
fn bitmap_offset(index: usize) -> usize {
    let (row, col) = (index / SCREEN_COLUMNS, index % SCREEN_COLUMNS);
    row * SCREEN_COLUMNS * CELL_ROWS + col * CELL_ROWS
}

// Visits the 40×25 cells in raster order and hands each packed cell to `store`.
fn encode_cells(
    source: &PixelSource<'_>,
    x_offset: i32,
    y_offset: i32,
    mut encode: impl FnMut(i32, i32) -> CellEncoding,
    mut store: impl FnMut(usize, Cell),
) -> Vec<Clash> {
    let width = source.mode().cell_width() as i32;
    let height = source.mode().cell_height() as i32;
    let mut clashes = Vec::new();
    for row in 0..SCREEN_ROWS {
        for column in 0..SCREEN_COLUMNS {
            let x = x_offset.saturating_add(column as i32 * width);
            let y = y_offset.saturating_add(row as i32 * height);
            let encoding = encode(x, y);
            if let Some(colors) = encoding.overflow {
                clashes.push(Clash {
                    x,
                    y,
                    column,
                    row,
                    colors,
                });
            }
            store(row * SCREEN_COLUMNS + column, encoding.cell);
        }
    }
    debug!(
        "Encoded {} cells in {} mode with {} clashes",
        CELL_COUNT,
        source.mode(),
        clashes.len()
    );
    clashes
}

fn expect_mode(source: &PixelSource<'_>, expected: Mode) -> Result<()> {
    if source.mode() != expected {
        return Err(VicError::ModeMismatch {
            expected,
            actual: source.mode(),
        });
    }
    Ok(())
}

impl Koala {
    /// An all-background picture.
    pub fn blank(background: u8) -> Self {
        Self {
            bitmap: vec![0; BITMAP_SIZE],
            screen: vec![0; CELL_COUNT],
            colmap: vec![0; CELL_COUNT],
            background: background & 0x0F,
        }
    }

    /// Encodes the 160×200 logical pixels starting at (x_offset, y_offset).
    #[must_use = "this returns the encoded picture and its clashes"]
    pub fn encode(source: &PixelSource<'_>, x_offset: i32, y_offset: i32) -> Result<Encoded<Self>> {
        expect_mode(source, Mode::Multicolor)?;
        Ok(Self::encode_unchecked(source, x_offset, y_offset))
    }

    fn encode_unchecked(source: &PixelSource<'_>, x_offset: i32, y_offset: i32) -> Encoded<Self> {
        let mut koala = Self::blank(source.background());
        let clashes = encode_cells(
            source,
            x_offset,
            y_offset,
            |x, y| encode_multicolor_cell(source, x, y),
            |index, cell| koala.put_cell(index, cell),
        );
        Encoded {
            picture: koala,
            clashes,
        }
    }

    /// Encodes with the same three colors in every cell, as for multicolor charsets.
    #[must_use = "this returns the encoded picture and its clashes"]
    pub fn encode_with_shared_colors(
        source: &PixelSource<'_>,
        x_offset: i32,
        y_offset: i32,
        shared: [u8; 3],
    ) -> Result<Encoded<Self>> {
        expect_mode(source, Mode::Multicolor)?;
        let mut koala = Self::blank(source.background());
        let clashes = encode_cells(
            source,
            x_offset,
            y_offset,
            |x, y| encode_multicolor_char(source, x, y, shared),
            |index, cell| koala.put_cell(index, cell),
        );
        Ok(Encoded {
            picture: koala,
            clashes,
        })
    }

    fn put_cell(&mut self, index: usize, cell: Cell) {
        let offset = bitmap_offset(index);
        self.bitmap[offset..offset + CELL_ROWS].copy_from_slice(&cell.bitmap);
        self.screen[index] = cell.screen;
        self.colmap[index] = cell.colmap;
    }

    /// Packed cell `index` (0-999, raster order).
    pub fn cell(&self, index: usize) -> Cell {
        let offset = bitmap_offset(index);
        let mut bitmap = [0u8; CELL_ROWS];
        bitmap.copy_from_slice(&self.bitmap[offset..offset + CELL_ROWS]);
        Cell {
            bitmap,
            screen: self.screen[index],
            colmap: self.colmap[index],
        }
    }
}

impl Hires {
    /// An all-black picture.
    pub fn blank() -> Self {
        Self {
            bitmap: vec![0; BITMAP_SIZE],
            screen: vec![0; CELL_COUNT],
        }
    }

    /// Encodes the 320×200 pixels starting at (x_offset, y_offset).
    #[must_use = "this returns the encoded picture and its clashes"]
    pub fn encode(source: &PixelSource<'_>, x_offset: i32, y_offset: i32) -> Result<Encoded<Self>> {
        expect_mode(source, Mode::Hires)?;
        Ok(Self::encode_unchecked(source, x_offset, y_offset))
    }

    fn encode_unchecked(source: &PixelSource<'_>, x_offset: i32, y_offset: i32) -> Encoded<Self> {
        let mut hires = Self::blank();
        let clashes = encode_cells(
            source,
            x_offset,
            y_offset,
            |x, y| encode_hires_cell(source, x, y),
            |index, cell| hires.put_cell(index, cell),
        );
        Encoded {
            picture: hires,
            clashes,
        }
    }

    fn put_cell(&mut self, index: usize, cell: Cell) {
        let offset = bitmap_offset(index);
        self.bitmap[offset..offset + CELL_ROWS].copy_from_slice(&cell.bitmap);
        self.screen[index] = cell.screen;
    }

    /// Packed cell `index` (0-999, raster order).
    pub fn cell(&self, index: usize) -> Cell {
        let offset = bitmap_offset(index);
        let mut bitmap = [0u8; CELL_ROWS];
        bitmap.copy_from_slice(&self.bitmap[offset..offset + CELL_ROWS]);
        Cell {
            bitmap,
            screen: self.screen[index],
            colmap: 0,
        }
    }
}

impl Picture {
    /// Encodes in whatever mode the source was built for.
    #[must_use = "this returns the encoded picture and its clashes"]
    pub fn encode(source: &PixelSource<'_>, x_offset: i32, y_offset: i32) -> Encoded<Self> {
        match source.mode() {
            Mode::Multicolor => {
                Koala::encode_unchecked(source, x_offset, y_offset).map(Picture::Koala)
            }
            Mode::Hires => Hires::encode_unchecked(source, x_offset, y_offset).map(Picture::Hires),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Picture::Koala(_) => Mode::Multicolor,
            Picture::Hires(_) => Mode::Hires,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::PixelGrid;
    use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

    #[test]
    fn test_single_color_koala() {
        let grid = PixelGrid::filled(SCREEN_WIDTH, SCREEN_HEIGHT, 1);
        let source = PixelSource::multicolor(&grid, 0);
        let encoded = Koala::encode(&source, 0, 0).unwrap();
        assert!(encoded.is_clean());
        let koala = encoded.picture;
        assert!(koala.bitmap.iter().all(|&b| b == 0x55));
        assert!(koala.screen.iter().all(|&b| b == 0x10));
        assert!(koala.colmap.iter().all(|&b| b == 0x00));
        assert_eq!(koala.background, 0);
    }

    #[test]
    fn test_cell_placement_raster_order() {
        let mut grid = PixelGrid::filled(SCREEN_WIDTH, SCREEN_HEIGHT, 0);
        // Top-left pixel of cell column 1, row 1
        grid.set(8, 8, 3);
        let source = PixelSource::hires(&grid, 0);
        let hires = Hires::encode(&source, 0, 0).unwrap().picture;
        let index = SCREEN_COLUMNS + 1;
        // Slot 0 is the first color seen, so the lone pixel is the clear bit
        assert_eq!(hires.bitmap[320 + 8], 0b0111_1111);
        assert_eq!(hires.bitmap[320 + 9], 0xFF);
        assert_eq!(hires.screen[index], 0x30);
        assert_eq!(hires.cell(index).bitmap[0], 0b0111_1111);
        assert_eq!(hires.screen.iter().filter(|&&b| b != 0).count(), 1);
    }

    #[test]
    fn test_clash_origin() {
        let mut grid = PixelGrid::filled(SCREEN_WIDTH, SCREEN_HEIGHT, 0);
        for (i, color) in [1, 2, 3, 4].into_iter().enumerate() {
            // Cell column 2, row 3 starts at logical x 8, grid x 16
            grid.set(16 + i * 2, 24, color);
        }
        let source = PixelSource::multicolor(&grid, 0);
        let encoded = Koala::encode(&source, 0, 0).unwrap();
        assert_eq!(
            encoded.clashes,
            vec![Clash {
                x: 8,
                y: 24,
                column: 2,
                row: 3,
                colors: vec![1, 2, 3, 4, 0],
            }]
        );
    }

    #[test]
    fn test_offsets_shift_the_window() {
        let mut grid = PixelGrid::filled(SCREEN_WIDTH, SCREEN_HEIGHT, 0);
        grid.set(16, 16, 6);
        let source = PixelSource::hires(&grid, 0);
        let hires = Hires::encode(&source, 8, 8).unwrap().picture;
        assert_eq!(hires.screen[SCREEN_COLUMNS + 1], 0x60);
    }

    #[test]
    fn test_mode_mismatch() {
        let grid = PixelGrid::filled(8, 8, 0);
        let source = PixelSource::hires(&grid, 0);
        assert!(matches!(
            Koala::encode(&source, 0, 0),
            Err(VicError::ModeMismatch {
                expected: Mode::Multicolor,
                actual: Mode::Hires
            })
        ));
        assert_eq!(Picture::encode(&source, 0, 0).picture.mode(), Mode::Hires);
    }

    #[test]
    fn test_shared_colors() {
        let grid = PixelGrid::filled(SCREEN_WIDTH, SCREEN_HEIGHT, 5);
        let source = PixelSource::multicolor(&grid, 0);
        let encoded = Koala::encode_with_shared_colors(&source, 0, 0, [5, 6, 7]).unwrap();
        assert!(encoded.is_clean());
        assert!(encoded.picture.screen.iter().all(|&b| b == 0x56));
        assert!(encoded.picture.colmap.iter().all(|&b| b == 0x07));
    }
}
