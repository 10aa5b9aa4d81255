use criterion::{Criterion, black_box, criterion_group, criterion_main};
use gd_ascii::dither::dither;
use gd_ascii::luminance::{LuminanceOptions, compute_luminance};
use gd_core::frame::PixelBuffer;
use gd_core::palette::GlyphPalette;

/// Dégradé RGB synthétique, 320×240.
fn gradient() -> PixelBuffer {
    let (w, h) = (320u32, 240u32);
    let mut pb = PixelBuffer::new(w, h, 3);
    for y in 0..h {
        for x in 0..w {
            let i = ((y * w + x) * 3) as usize;
            pb.data[i] = (x * 255 / w) as u8;
            pb.data[i + 1] = (y * 255 / h) as u8;
            pb.data[i + 2] = ((x + y) % 256) as u8;
        }
    }
    pb
}

fn bench_pipeline(c: &mut Criterion) {
    let pixels = gradient();
    let palette = GlyphPalette::default();
    let options = LuminanceOptions::default();

    c.bench_function("luminance_320x240", |b| {
        b.iter(|| compute_luminance(black_box(&pixels), &options));
    });

    c.bench_function("dither_320x240", |b| {
        b.iter_batched(
            || compute_luminance(&pixels, &options).unwrap_or_default(),
            |grid| dither(black_box(grid), &palette, false),
            criterion::BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
