use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use vicgfx::{decode_hires, decode_koala, Koala, Layout, Mode, PaletteCatalog, Picture};

// Bitmap bytes cycle through every bit pattern
fn generate_koala_blob() -> Vec<u8> {
    let mut koala = Koala::blank(6);
    for (i, byte) in koala.bitmap.iter_mut().enumerate() {
        *byte = i as u8;
    }
    for (i, byte) in koala.screen.iter_mut().enumerate() {
        *byte = (i * 37) as u8;
    }
    for (i, byte) in koala.colmap.iter_mut().enumerate() {
        *byte = (i % 16) as u8;
    }
    koala.to_bytes(&Layout::default()).expect("complete picture")
}

fn bench_decode_koala(c: &mut Criterion) {
    let blob = generate_koala_blob();

    c.bench_function("decode_koala", |b| {
        b.iter(|| {
            let result = decode_koala(black_box(&blob));
            assert!(result.is_ok());
            result
        })
    });
}

fn bench_decode_hires(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_hires");

    for len in [9000usize, 9192].iter() {
        let blob: Vec<u8> = (0..*len).map(|i| (i * 7) as u8).collect();
        group.bench_with_input(BenchmarkId::from_parameter(len), &blob, |b, data| {
            b.iter(|| {
                let result = decode_hires(black_box(data));
                assert!(result.is_ok());
                result
            })
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let koala = decode_koala(&generate_koala_blob()).expect("valid blob");
    let catalog = PaletteCatalog::builtin();
    let pepto = catalog.by_name("pepto");

    c.bench_function("render_koala_rgb", |b| {
        b.iter(|| {
            let grid = black_box(&koala).to_pixel_grid().expect("complete picture");
            grid.to_rgb(pepto)
        })
    });
}

fn bench_layouts(c: &mut Criterion) {
    let mut group = c.benchmark_group("layouts");
    let koala = decode_koala(&generate_koala_blob()).expect("valid blob");

    for (align, metadata_first) in [(false, false), (true, false), (true, true)] {
        let layout = Layout::new(align, metadata_first);
        let blob = koala.to_bytes(&layout).expect("complete picture");
        group.bench_with_input(
            BenchmarkId::new("from_bytes", format!("align={align},meta={metadata_first}")),
            &blob,
            |b, data| {
                b.iter(|| {
                    let result = Picture::from_bytes(black_box(data), Mode::Multicolor, &layout);
                    assert!(result.is_ok());
                    result
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_decode_koala,
    bench_decode_hires,
    bench_render,
    bench_layouts
);

criterion_main!(benches);
