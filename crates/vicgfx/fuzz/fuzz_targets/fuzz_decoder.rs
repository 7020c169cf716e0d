#![no_main]

use libfuzzer_sys::fuzz_target;
use vicgfx::{decode_hires, decode_koala, Layout, Mode, Picture};

fuzz_target!(|data: &[u8]| {
    // Decoding should never panic, whatever the blob length
    if let Ok(koala) = decode_koala(data) {
        let _ = koala.to_pixel_grid();
    }
    if let Ok(hires) = decode_hires(data) {
        let _ = hires.to_pixel_grid();
    }
    let _ = Picture::from_bytes(data, Mode::Multicolor, &Layout::new(true, true));
});
