//! Rebuilding pixel grids from packed Koala and Hires data.

use log::debug;

use crate::layout::Layout;
use crate::picture::{Hires, Koala, Picture};
use crate::pixels::{Mode, PixelGrid};
use crate::{
    Result, VicError, BITMAP_SIZE, CELL_COUNT, SCREEN_COLUMNS, SCREEN_HEIGHT, SCREEN_WIDTH,
};

// Bit pair of each multicolor pixel, high bit first.
const MULTICOLOR_MASKS: [(u8, u8); 4] = [(0x80, 0x40), (0x20, 0x10), (0x08, 0x04), (0x02, 0x01)];

const HIRES_MASKS: [u8; 8] = [0x80, 0x40, 0x20, 0x10, 0x08, 0x04, 0x02, 0x01];

/// Decodes a Koala blob in the unaligned bitmap-first layout (load address removed).
///
/// The blob holds 8000 bitmap bytes, 1000 screen bytes, 1000 color map bytes and the
/// background byte; anything after that is ignored.
#[must_use = "this returns the decoded picture"]
pub fn decode_koala(bytes: &[u8]) -> Result<Koala> {
    Koala::from_bytes(bytes, &Layout::LEGACY)
}

/// Decodes a Hires blob (load address removed).
///
/// The screen array follows the bitmap directly, or starts at offset 8192 when the blob
/// is long enough to hold the aligned layout.
#[must_use = "this returns the decoded picture"]
pub fn decode_hires(bytes: &[u8]) -> Result<Hires> {
    let aligned = Layout::new(true, false);
    let layout = if bytes.len() >= aligned.offsets(Mode::Hires).data_end() {
        aligned
    } else {
        Layout::LEGACY
    };
    debug!(
        "Decoding {} byte hires blob as {} layout",
        bytes.len(),
        if layout.align { "aligned" } else { "unaligned" }
    );
    Hires::from_bytes(bytes, &layout)
}

fn check_picture(bitmap: &[u8], screen: &[u8]) -> Result<()> {
    if bitmap.len() < BITMAP_SIZE {
        return Err(VicError::TruncatedData {
            what: "bitmap",
            expected: BITMAP_SIZE,
            actual: bitmap.len(),
        });
    }
    if screen.len() < CELL_COUNT {
        return Err(VicError::TruncatedData {
            what: "screen",
            expected: CELL_COUNT,
            actual: screen.len(),
        });
    }
    Ok(())
}

impl Koala {
    /// The four colors of cell `index`: background, screen high, screen low, color map.
    pub fn cell_colors(&self, index: usize) -> [u8; 4] {
        let screen = self.screen[index];
        [
            self.background & 0x0F,
            screen >> 4,
            screen & 0x0F,
            self.colmap[index] & 0x0F,
        ]
    }

    /// Renders the picture as a 320×200 grid with every multicolor pixel doubled.
    pub fn to_pixel_grid(&self) -> Result<PixelGrid> {
        check_picture(&self.bitmap, &self.screen)?;
        if self.colmap.len() < CELL_COUNT {
            return Err(VicError::TruncatedData {
                what: "color map",
                expected: CELL_COUNT,
                actual: self.colmap.len(),
            });
        }
        let mut grid = PixelGrid::filled(SCREEN_WIDTH, SCREEN_HEIGHT, 0);
        for index in 0..CELL_COUNT {
            let (row, col) = (index / SCREEN_COLUMNS, index % SCREEN_COLUMNS);
            let colors = self.cell_colors(index);
            for y in 0..8 {
                let byte = self.bitmap[row * 320 + col * 8 + y];
                for (x, &(high, low)) in MULTICOLOR_MASKS.iter().enumerate() {
                    let slot = match (byte & high != 0, byte & low != 0) {
                        (false, false) => 0,
                        (false, true) => 1,
                        (true, false) => 2,
                        (true, true) => 3,
                    };
                    let (px, py) = (col * 8 + x * 2, row * 8 + y);
                    grid.set(px, py, colors[slot]);
                    grid.set(px + 1, py, colors[slot]);
                }
            }
        }
        Ok(grid)
    }
}

impl Hires {
    /// The two colors of cell `index`: clear bits, then set bits.
    pub fn cell_colors(&self, index: usize) -> [u8; 2] {
        let screen = self.screen[index];
        [screen >> 4, screen & 0x0F]
    }

    /// Renders the picture as a 320×200 grid.
    pub fn to_pixel_grid(&self) -> Result<PixelGrid> {
        check_picture(&self.bitmap, &self.screen)?;
        let mut grid = PixelGrid::filled(SCREEN_WIDTH, SCREEN_HEIGHT, 0);
        for index in 0..CELL_COUNT {
            let (row, col) = (index / SCREEN_COLUMNS, index % SCREEN_COLUMNS);
            let colors = self.cell_colors(index);
            for y in 0..8 {
                let byte = self.bitmap[row * 320 + col * 8 + y];
                for (x, &mask) in HIRES_MASKS.iter().enumerate() {
                    let slot = usize::from(byte & mask != 0);
                    grid.set(col * 8 + x, row * 8 + y, colors[slot]);
                }
            }
        }
        Ok(grid)
    }
}

impl Picture {
    pub fn to_pixel_grid(&self) -> Result<PixelGrid> {
        match self {
            Picture::Koala(koala) => koala.to_pixel_grid(),
            Picture::Hires(hires) => hires.to_pixel_grid(),
        }
    }
}
