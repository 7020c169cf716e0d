#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vicgfx::{Layout, Mode, Picture, PixelGrid, PixelSource};

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    width: u8,
    height: u8,
    pixels: Vec<u8>,
    hires: bool,
    background: u8,
    x_offset: i32,
    y_offset: i32,
}

fuzz_target!(|input: FuzzInput| {
    let width = (input.width as usize).max(1);
    let height = (input.height as usize).max(1);
    if input.pixels.len() < width * height {
        return;
    }

    let data = input.pixels[..width * height].iter().map(|p| p & 0x0F).collect();
    let Ok(grid) = PixelGrid::new(width, height, data) else {
        return;
    };
    let mode = if input.hires { Mode::Hires } else { Mode::Multicolor };
    let source = PixelSource::new(&grid, mode, input.background);

    // Encoding never panics and every clash is a real over-budget cell
    let encoded = Picture::encode(&source, input.x_offset, input.y_offset);
    for clash in &encoded.clashes {
        assert!(clash.colors.len() > mode.budget() - usize::from(mode == Mode::Multicolor));
    }
    let _ = encoded.picture.to_bytes(&Layout::default());
});
