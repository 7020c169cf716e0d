//! Diagnostic image showing which cells clashed.

use crate::cell::Clash;
use crate::palette::{Palette, Rgb};
use crate::pixels::PixelSource;
use crate::{SCREEN_COLUMNS, SCREEN_ROWS};

/// Gutter between cells in pixels.
pub const GUTTER: usize = 2;
/// Side of the square swatch drawn for each cell.
pub const SWATCH: usize = 24;
/// Distance between the top-left corners of neighboring cells.
pub const CELL_PITCH: usize = GUTTER + SWATCH;

const GUTTER_COLOR: Rgb = Rgb::new(0x14, 0x14, 0x14);
const CLASH_COLOR: Rgb = Rgb::new(0xff, 0x00, 0x00);

/// An RGB image, 3 bytes per pixel, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClashMap {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl ClashMap {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 3],
        }
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize, color: Rgb) {
        if x < self.width && y < self.height {
            let i = (y * self.width + x) * 3;
            self.pixels[i..i + 3].copy_from_slice(&[color.r, color.g, color.b]);
        }
    }

    /// Color of pixel (x, y); panics outside the image.
    pub fn get(&self, x: usize, y: usize) -> Rgb {
        let i = (y * self.width + x) * 3;
        Rgb::new(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2])
    }
}

/// Draws every cell of the picture enlarged, with a dashed red frame around clashes.
///
/// Each cell becomes a 24×24 swatch separated by a 2 pixel gutter. Hires pixels are
/// drawn 3×3 and multicolor pixels 6×3.
pub fn render_clashes(
    source: &PixelSource<'_>,
    x_offset: i32,
    y_offset: i32,
    clashes: &[Clash],
    palette: &Palette,
) -> ClashMap {
    let mode = source.mode();
    let pixel_width = SWATCH / mode.cell_width();
    let pixel_height = SWATCH / mode.cell_height();
    let mut map = ClashMap::new(
        SCREEN_COLUMNS * CELL_PITCH + GUTTER,
        SCREEN_ROWS * CELL_PITCH + GUTTER,
    );

    for y in 0..map.height {
        for x in 0..map.width {
            if x % CELL_PITCH < GUTTER || y % CELL_PITCH < GUTTER {
                map.set(x, y, GUTTER_COLOR);
                continue;
            }
            let (column, sx) = ((x - GUTTER) / CELL_PITCH, (x - GUTTER) % CELL_PITCH);
            let (row, sy) = ((y - GUTTER) / CELL_PITCH, (y - GUTTER) % CELL_PITCH);
            let lx = column * mode.cell_width() + sx / pixel_width;
            let ly = row * mode.cell_height() + sy / pixel_height;
            let color = source.pixel_at(
                x_offset.saturating_add(lx as i32),
                y_offset.saturating_add(ly as i32),
            );
            map.set(x, y, palette.color(color));
        }
    }

    for clash in clashes {
        let (ox, oy) = (clash.column * CELL_PITCH, clash.row * CELL_PITCH);
        for i in (0..CELL_PITCH + GUTTER).step_by(2) {
            for t in 0..GUTTER {
                map.set(ox + i, oy + t, CLASH_COLOR);
                map.set(ox + i, oy + CELL_PITCH + t, CLASH_COLOR);
                map.set(ox + t, oy + i, CLASH_COLOR);
                map.set(ox + CELL_PITCH + t, oy + i, CLASH_COLOR);
            }
        }
    }
    map
}
