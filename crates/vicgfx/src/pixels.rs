//! Source pixels: indexed images, hardware-indexed pixel grids and mode-aware lookup.

use std::collections::HashMap;
use std::fmt;

use crate::palette::{remap_indices, Palette, Rgb, PALETTE_SIZE};
use crate::{Result, VicError};

/// Largest palette an [`IndexedImage`] can carry.
pub const MAX_IMAGE_COLORS: usize = 256;

/// Bitmap mode of the VIC-II.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// 160×200 with double-width pixels, 4 colors per 4×8 cell
    #[default]
    Multicolor,
    /// 320×200, 2 colors per 8×8 cell
    Hires,
}

impl Mode {
    /// Cell width in logical pixels.
    pub const fn cell_width(self) -> usize {
        match self {
            Mode::Multicolor => 4,
            Mode::Hires => 8,
        }
    }

    pub const fn cell_height(self) -> usize {
        8
    }

    /// Distinct colors allowed per cell.
    pub const fn budget(self) -> usize {
        match self {
            Mode::Multicolor => 4,
            Mode::Hires => 2,
        }
    }

    pub const fn bits_per_pixel(self) -> usize {
        match self {
            Mode::Multicolor => 2,
            Mode::Hires => 1,
        }
    }

    /// Screen pixels covered by one logical pixel horizontally.
    pub const fn pixel_width(self) -> usize {
        match self {
            Mode::Multicolor => 2,
            Mode::Hires => 1,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Multicolor => f.write_str("multicolor"),
            Mode::Hires => f.write_str("hires"),
        }
    }
}

/// A decoded source image: its own palette plus one palette index per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedImage {
    width: usize,
    height: usize,
    palette: Vec<Rgb>,
    indices: Vec<u8>,
}

impl IndexedImage {
    pub fn new(width: usize, height: usize, palette: Vec<Rgb>, indices: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height, indices.len())?;
        if palette.len() > MAX_IMAGE_COLORS {
            return Err(VicError::TooManyColors(MAX_IMAGE_COLORS));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= palette.len()) {
            return Err(VicError::IndexOutOfRange {
                index,
                palette_len: palette.len(),
            });
        }
        Ok(Self {
            width,
            height,
            palette,
            indices,
        })
    }

    /// Builds an indexed image from packed RGB bytes, numbering colors in first-seen order.
    pub fn from_rgb(width: usize, height: usize, rgb: &[u8]) -> Result<Self> {
        Self::from_channels(width, height, rgb, 3)
    }

    /// Like [`IndexedImage::from_rgb`] for packed RGBA bytes; alpha is ignored.
    pub fn from_rgba(width: usize, height: usize, rgba: &[u8]) -> Result<Self> {
        Self::from_channels(width, height, rgba, 4)
    }

    fn from_channels(width: usize, height: usize, data: &[u8], channels: usize) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels))
            .ok_or(VicError::InvalidDimensions { width, height })?;
        if width == 0 || height == 0 {
            return Err(VicError::InvalidDimensions { width, height });
        }
        if data.len() != expected {
            return Err(VicError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        let mut lookup: HashMap<Rgb, u8> = HashMap::new();
        let mut palette = Vec::new();
        let mut indices = Vec::with_capacity(width * height);
        for px in data.chunks_exact(channels) {
            let rgb = Rgb::new(px[0], px[1], px[2]);
            let index = match lookup.get(&rgb) {
                Some(&index) => index,
                None => {
                    if palette.len() >= MAX_IMAGE_COLORS {
                        return Err(VicError::TooManyColors(MAX_IMAGE_COLORS));
                    }
                    let index = palette.len() as u8;
                    palette.push(rgb);
                    lookup.insert(rgb, index);
                    index
                }
            };
            indices.push(index);
        }
        Ok(Self {
            width,
            height,
            palette,
            indices,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Palette colors that at least one pixel uses, in palette order.
    pub fn colors_present(&self) -> Vec<Rgb> {
        let mut used = [false; MAX_IMAGE_COLORS];
        for &i in &self.indices {
            used[i as usize] = true;
        }
        self.palette
            .iter()
            .enumerate()
            .filter(|(i, _)| used[*i])
            .map(|(_, &c)| c)
            .collect()
    }
}

fn check_dimensions(width: usize, height: usize, len: usize) -> Result<()> {
    if width == 0 || height == 0 || width > i32::MAX as usize || height > i32::MAX as usize {
        return Err(VicError::InvalidDimensions { width, height });
    }
    let expected = width
        .checked_mul(height)
        .ok_or(VicError::InvalidDimensions { width, height })?;
    if len != expected {
        return Err(VicError::BufferSizeMismatch {
            expected,
            actual: len,
        });
    }
    Ok(())
}

/// Screen pixels as hardware color numbers (0-15), row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelGrid {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height, data.len())?;
        if let Some(&index) = data.iter().find(|&&c| c as usize >= PALETTE_SIZE) {
            return Err(VicError::IndexOutOfRange {
                index,
                palette_len: PALETTE_SIZE,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A grid where every pixel has the same color.
    pub fn filled(width: usize, height: usize, color: u8) -> Self {
        Self {
            width,
            height,
            data: vec![color & 0x0F; width * height],
        }
    }

    /// Maps an indexed image into the hardware color numbers of `palette`.
    pub fn from_indexed(image: &IndexedImage, palette: &Palette) -> Self {
        let table = remap_indices(image.palette(), palette);
        Self {
            width: image.width(),
            height: image.height(),
            data: image.indices().iter().map(|&i| table[i as usize]).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Pixel at (x, y), or `None` outside the grid.
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Option<u8> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.data[y as usize * self.width + x as usize])
    }

    /// Sets a pixel; coordinates outside the grid are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: u8) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = color & 0x0F;
        }
    }

    /// Packed RGB bytes of the grid in the given palette.
    pub fn to_rgb(&self, palette: &Palette) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.data.len() * 3);
        for &c in &self.data {
            let color = palette.color(c);
            rgb.extend_from_slice(&[color.r, color.g, color.b]);
        }
        rgb
    }
}

/// Reads logical pixels of a [`PixelGrid`] for one bitmap mode.
///
/// In multicolor mode logical pixel (x, y) is grid pixel (2x, y). Lookups outside the
/// grid return the background color.
#[derive(Clone, Copy, Debug)]
pub struct PixelSource<'a> {
    grid: &'a PixelGrid,
    mode: Mode,
    background: u8,
}

impl<'a> PixelSource<'a> {
    pub fn new(grid: &'a PixelGrid, mode: Mode, background: u8) -> Self {
        Self {
            grid,
            mode,
            background: background & 0x0F,
        }
    }

    pub fn multicolor(grid: &'a PixelGrid, background: u8) -> Self {
        Self::new(grid, Mode::Multicolor, background)
    }

    pub fn hires(grid: &'a PixelGrid, background: u8) -> Self {
        Self::new(grid, Mode::Hires, background)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn background(&self) -> u8 {
        self.background
    }

    /// Color of logical pixel (x, y).
    #[inline]
    pub fn pixel_at(&self, x: i32, y: i32) -> u8 {
        let gx = i64::from(x) * self.mode.pixel_width() as i64;
        self.grid
            .get(gx, i64::from(y))
            .unwrap_or(self.background)
    }

    /// Row-major colors of the `width`×`height` block whose top-left corner is (x, y).
    pub fn sample(&self, x: i32, y: i32, width: usize, height: usize) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(width * height);
        for dy in 0..height as i32 {
            for dx in 0..width as i32 {
                pixels.push(self.pixel_at(x.saturating_add(dx), y.saturating_add(dy)));
            }
        }
        pixels
    }

    /// Byte with bit `7 - i` set where logical pixel (x + i, y) has `color`.
    pub fn mask_row(&self, x: i32, y: i32, color: u8) -> u8 {
        (0..8).fold(0u8, |byte, i| {
            let bit = u8::from(self.pixel_at(x.saturating_add(i), y) == color);
            (byte << 1) | bit
        })
    }
}
