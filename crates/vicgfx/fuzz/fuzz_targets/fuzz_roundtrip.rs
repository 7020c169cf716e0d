#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vicgfx::{Layout, Mode, Picture, PixelGrid, PixelSource, SCREEN_HEIGHT, SCREEN_WIDTH};

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    seed: Vec<u8>,
    hires: bool,
    align: bool,
    metadata_first: bool,
}

fuzz_target!(|input: FuzzInput| {
    if input.seed.is_empty() {
        return;
    }

    // Tile the seed over the screen, 2 colors per cell so nothing clashes
    let mut grid = PixelGrid::filled(SCREEN_WIDTH, SCREEN_HEIGHT, 0);
    for y in 0..SCREEN_HEIGHT {
        for x in (0..SCREEN_WIDTH).step_by(2) {
            let cell = (y / 8) * 40 + x / 8;
            let bit = input.seed[(y * SCREEN_WIDTH + x) / 2 % input.seed.len()] & 1;
            let color = if bit == 0 { 0 } else { (cell % 15) as u8 + 1 };
            grid.set(x, y, color);
            grid.set(x + 1, y, color);
        }
    }

    let mode = if input.hires { Mode::Hires } else { Mode::Multicolor };
    let source = PixelSource::new(&grid, mode, 0);
    let encoded = Picture::encode(&source, 0, 0);
    assert!(encoded.is_clean());

    let layout = Layout::new(input.align, input.metadata_first);
    let bytes = encoded.picture.to_bytes(&layout).expect("complete picture");
    assert_eq!(bytes.len(), layout.len(mode));
    let decoded = Picture::from_bytes(&bytes, mode, &layout).expect("valid blob");
    assert_eq!(decoded.to_pixel_grid().expect("complete picture"), grid);
});
