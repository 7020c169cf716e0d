//! Byte layout of encoded pictures: segment order and page alignment.
//!
//! A Koala picture has three segments: the bitmap, the screen array and the color map
//! followed by the background byte. Hires pictures have only the first two. Segments are
//! written back to back, or padded to the next 1024-byte boundary when aligned, in
//! either bitmap-first or metadata-first order. When aligned, the bitmap and screen
//! arrays always carry their padding; the color map segment is only padded when another
//! segment follows it.

use log::debug;

use crate::picture::{Hires, Koala, Picture};
use crate::pixels::Mode;
use crate::{Result, VicError, BITMAP_SIZE, CELL_COUNT};

/// Boundary segments are padded to when aligned.
pub const ALIGNMENT: usize = 1024;

/// Segment order and padding of a serialized picture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Layout {
    /// Pad each segment to the next 1024-byte boundary before the next one begins
    pub align: bool,
    /// Put screen and color data ahead of the bitmap
    pub metadata_first: bool,
}

/// Offsets of each segment for one mode and layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentOffsets {
    pub bitmap: usize,
    pub screen: usize,
    /// Multicolor only
    pub colmap: Option<usize>,
    /// Multicolor only
    pub background: Option<usize>,
    /// Total length of the serialized picture
    pub len: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Segment {
    Bitmap,
    Screen,
    // Color map plus the background byte
    Colors,
}

impl Segment {
    fn len(self) -> usize {
        match self {
            Segment::Bitmap => BITMAP_SIZE,
            Segment::Screen => CELL_COUNT,
            Segment::Colors => CELL_COUNT + 1,
        }
    }

    fn padded_at_end(self) -> bool {
        self != Segment::Colors
    }
}

impl SegmentOffsets {
    /// Bytes needed to read every segment, ignoring padding after the last one.
    pub fn data_end(&self) -> usize {
        let bitmap = self.bitmap + BITMAP_SIZE;
        let screen = self.screen + CELL_COUNT;
        let background = self.background.map_or(0, |b| b + 1);
        bitmap.max(screen).max(background)
    }
}

#[inline]
fn align_up(offset: usize) -> usize {
    offset.div_ceil(ALIGNMENT) * ALIGNMENT
}

impl Layout {
    /// Unaligned bitmap-first layout of classic Koala files.
    pub const LEGACY: Layout = Layout {
        align: false,
        metadata_first: false,
    };

    pub const fn new(align: bool, metadata_first: bool) -> Self {
        Self {
            align,
            metadata_first,
        }
    }

    fn segments(&self, mode: Mode) -> &'static [Segment] {
        match (mode, self.metadata_first) {
            (Mode::Multicolor, false) => &[Segment::Bitmap, Segment::Screen, Segment::Colors],
            (Mode::Multicolor, true) => &[Segment::Screen, Segment::Colors, Segment::Bitmap],
            (Mode::Hires, false) => &[Segment::Bitmap, Segment::Screen],
            (Mode::Hires, true) => &[Segment::Screen, Segment::Bitmap],
        }
    }

    /// Where every segment starts for `mode`.
    pub fn offsets(&self, mode: Mode) -> SegmentOffsets {
        let segments = self.segments(mode);
        let mut offsets = SegmentOffsets {
            bitmap: 0,
            screen: 0,
            colmap: None,
            background: None,
            len: 0,
        };
        let mut offset = 0;
        for (i, segment) in segments.iter().enumerate() {
            match segment {
                Segment::Bitmap => offsets.bitmap = offset,
                Segment::Screen => offsets.screen = offset,
                Segment::Colors => {
                    offsets.colmap = Some(offset);
                    offsets.background = Some(offset + CELL_COUNT);
                }
            }
            offset += segment.len();
            if self.align && (segment.padded_at_end() || i + 1 < segments.len()) {
                offset = align_up(offset);
            }
        }
        offsets.len = offset;
        offsets
    }

    /// Serialized length for `mode`.
    pub fn len(&self, mode: Mode) -> usize {
        self.offsets(mode).len
    }

    /// Offset of the background byte, `None` in hires mode.
    pub fn background_offset(&self, mode: Mode) -> Option<usize> {
        self.offsets(mode).background
    }
}

fn check_len(bytes: &[u8], expected: usize, what: &'static str) -> Result<()> {
    if bytes.len() < expected {
        return Err(VicError::TruncatedData {
            what,
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

fn check_segment(segment: &[u8], expected: usize, what: &'static str) -> Result<()> {
    if segment.len() != expected {
        debug!("{what} segment is {} bytes, expected {expected}", segment.len());
        return Err(VicError::BufferSizeMismatch {
            expected,
            actual: segment.len(),
        });
    }
    Ok(())
}

impl Koala {
    /// Serializes the picture with the given layout.
    pub fn to_bytes(&self, layout: &Layout) -> Result<Vec<u8>> {
        check_segment(&self.bitmap, BITMAP_SIZE, "bitmap")?;
        check_segment(&self.screen, CELL_COUNT, "screen")?;
        check_segment(&self.colmap, CELL_COUNT, "color map")?;
        let at = layout.offsets(Mode::Multicolor);
        let mut bytes = vec![0u8; at.len];
        bytes[at.bitmap..at.bitmap + BITMAP_SIZE].copy_from_slice(&self.bitmap);
        bytes[at.screen..at.screen + CELL_COUNT].copy_from_slice(&self.screen);
        if let (Some(colmap), Some(background)) = (at.colmap, at.background) {
            bytes[colmap..colmap + CELL_COUNT].copy_from_slice(&self.colmap);
            bytes[background] = self.background;
        }
        Ok(bytes)
    }

    /// Parses a picture serialized with the given layout.
    ///
    /// Padding after the last segment may be missing and trailing bytes are ignored.
    pub fn from_bytes(bytes: &[u8], layout: &Layout) -> Result<Self> {
        let at = layout.offsets(Mode::Multicolor);
        check_len(bytes, at.data_end(), "Koala data")?;
        let colmap = at.colmap.unwrap_or_default();
        let background = at.background.unwrap_or_default();
        Ok(Self {
            bitmap: bytes[at.bitmap..at.bitmap + BITMAP_SIZE].to_vec(),
            screen: bytes[at.screen..at.screen + CELL_COUNT].to_vec(),
            colmap: bytes[colmap..colmap + CELL_COUNT].to_vec(),
            background: bytes[background] & 0x0F,
        })
    }
}

impl Hires {
    /// Serializes the picture with the given layout.
    pub fn to_bytes(&self, layout: &Layout) -> Result<Vec<u8>> {
        check_segment(&self.bitmap, BITMAP_SIZE, "bitmap")?;
        check_segment(&self.screen, CELL_COUNT, "screen")?;
        let at = layout.offsets(Mode::Hires);
        let mut bytes = vec![0u8; at.len];
        bytes[at.bitmap..at.bitmap + BITMAP_SIZE].copy_from_slice(&self.bitmap);
        bytes[at.screen..at.screen + CELL_COUNT].copy_from_slice(&self.screen);
        Ok(bytes)
    }

    /// Parses a picture serialized with the given layout.
    ///
    /// Padding after the last segment may be missing and trailing bytes are ignored.
    pub fn from_bytes(bytes: &[u8], layout: &Layout) -> Result<Self> {
        let at = layout.offsets(Mode::Hires);
        check_len(bytes, at.data_end(), "Hires data")?;
        Ok(Self {
            bitmap: bytes[at.bitmap..at.bitmap + BITMAP_SIZE].to_vec(),
            screen: bytes[at.screen..at.screen + CELL_COUNT].to_vec(),
        })
    }
}

impl Picture {
    pub fn to_bytes(&self, layout: &Layout) -> Result<Vec<u8>> {
        match self {
            Picture::Koala(koala) => koala.to_bytes(layout),
            Picture::Hires(hires) => hires.to_bytes(layout),
        }
    }

    pub fn from_bytes(bytes: &[u8], mode: Mode, layout: &Layout) -> Result<Self> {
        match mode {
            Mode::Multicolor => Koala::from_bytes(bytes, layout).map(Picture::Koala),
            Mode::Hires => Hires::from_bytes(bytes, layout).map(Picture::Hires),
        }
    }
}
