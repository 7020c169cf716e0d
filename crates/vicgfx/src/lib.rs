//! # vicgfx
//!
//! Conversion between indexed images and the bitmap formats of the VIC-II video chip.
//!
//! ## Features
//!
//! - **Encoder**: splits a picture into 4×8 (multicolor) or 8×8 (hires) cells, picks
//!   each cell's local colors and packs the pixel indices into Koala or Hires layout
//! - **Clash detection**: cells that need more colors than the hardware allows are
//!   reported as [`Clash`] records while encoding carries on
//! - **Decoder**: rebuilds the pixel grid from a Koala or Hires blob
//! - **Palettes**: a catalog of the common VIC-II palettes with best-match selection
//!
//! ## Quick Start
//!
//! ### Encoding an image to Koala
//!
//! ```ignore
//! use vicgfx::{IndexedImage, Koala, Layout, PaletteCatalog, PixelGrid, PixelSource};
//!
//! let image = IndexedImage::from_rgb(320, 200, &rgb)?;
//! let catalog = PaletteCatalog::builtin();
//! let palette = catalog.best_match(&image.colors_present());
//! let grid = PixelGrid::from_indexed(&image, palette);
//! let encoded = Koala::encode(&PixelSource::multicolor(&grid, 0), 0, 0)?;
//! let bytes = encoded.picture.to_bytes(&Layout::default())?;
//! ```
//!
//! ### Decoding a Koala blob
//!
//! ```ignore
//! use vicgfx::{decode_koala, PaletteCatalog};
//!
//! let koala = decode_koala(&bytes)?;
//! let rgb = koala.to_pixel_grid()?.to_rgb(PaletteCatalog::builtin().by_name("pepto"));
//! ```

use std::path::PathBuf;

use thiserror::Error;

pub mod cell;
pub mod clash;
pub mod decode;
pub mod layout;
pub mod palette;
pub mod picture;
pub mod pixels;

pub use cell::{Cell, Clash};
pub use clash::{render_clashes, ClashMap};
pub use decode::{decode_hires, decode_koala};
pub use layout::Layout;
pub use palette::{remap_indices, Palette, PaletteCatalog, Rgb};
pub use picture::{Encoded, Hires, Koala, Picture};
pub use pixels::{IndexedImage, Mode, PixelGrid, PixelSource};

/// Width of the VIC-II bitmap screen in pixels.
pub const SCREEN_WIDTH: usize = 320;
/// Height of the VIC-II bitmap screen in pixels.
pub const SCREEN_HEIGHT: usize = 200;
/// Number of cell columns on screen.
pub const SCREEN_COLUMNS: usize = 40;
/// Number of cell rows on screen.
pub const SCREEN_ROWS: usize = 25;
/// Number of cells on screen, also the size of the screen and color map arrays.
pub const CELL_COUNT: usize = SCREEN_COLUMNS * SCREEN_ROWS;
/// Size of the bitmap plane in bytes.
pub const BITMAP_SIZE: usize = CELL_COUNT * 8;

/// Errors that can occur while converting pictures.
///
/// Color clashes are not errors; they are returned as [`Clash`] records next to the
/// encoded picture.
#[derive(Debug, Error)]
pub enum VicError {
    /// Image dimensions are zero or too large
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// Buffer size doesn't match the declared dimensions
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Binary blob is shorter than the layout requires
    #[error("truncated {what}: expected at least {expected} bytes, got {actual}")]
    TruncatedData {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Pixel value outside the palette it indexes
    #[error("pixel index {index} out of range for a palette of {palette_len} colors")]
    IndexOutOfRange { index: u8, palette_len: usize },

    /// Source image has more distinct colors than an indexed image can hold
    #[error("image has more than {0} distinct colors")]
    TooManyColors(usize),

    /// Pixel source was built for the other screen mode
    #[error("expected a {expected} pixel source, got {actual}")]
    ModeMismatch { expected: Mode, actual: Mode },

    /// Malformed palette definition
    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// Malformed palette configuration file
    #[error("invalid palette config: {0}")]
    PaletteConfig(#[from] serde_json::Error),

    /// Failure reading or writing a file
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VicError {
    /// Wraps an I/O error together with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        VicError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for errors caused by a source image or blob of the wrong shape.
    pub fn is_input_format(&self) -> bool {
        matches!(
            self,
            VicError::InvalidDimensions { .. }
                | VicError::BufferSizeMismatch { .. }
                | VicError::TruncatedData { .. }
                | VicError::IndexOutOfRange { .. }
                | VicError::TooManyColors(_)
                | VicError::ModeMismatch { .. }
        )
    }
}

/// Result type for vicgfx operations.
pub type Result<T> = core::result::Result<T, VicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_format_errors() {
        let shape_errors = [
            VicError::InvalidDimensions {
                width: 0,
                height: 200,
            },
            VicError::BufferSizeMismatch {
                expected: 3,
                actual: 2,
            },
            VicError::TruncatedData {
                what: "bitmap",
                expected: BITMAP_SIZE,
                actual: 0,
            },
            VicError::IndexOutOfRange {
                index: 16,
                palette_len: 16,
            },
            VicError::TooManyColors(256),
            VicError::ModeMismatch {
                expected: Mode::Hires,
                actual: Mode::Multicolor,
            },
        ];
        assert!(shape_errors.iter().all(VicError::is_input_format));

        assert!(!VicError::InvalidPalette("short".to_string()).is_input_format());
        let io = VicError::io(
            "missing.json",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(!io.is_input_format());
        assert!(io.to_string().starts_with("I/O error on 'missing.json'"));
    }
}
