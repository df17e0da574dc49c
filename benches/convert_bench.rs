// Conversion Benchmarks
// Performance benchmarks for the receive and refresh pixel paths

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use topic_viewer::display::bgr_to_rgb;
use topic_viewer::frame::to_bgr8;
use topic_viewer::RawImage;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

/// Helper function to create a VGA test image in the given encoding
fn create_test_image(encoding: &str, bytes_per_pixel: u32) -> RawImage {
    let len = (WIDTH * HEIGHT * bytes_per_pixel) as usize;
    let data = (0..len).map(|i| (i % 251) as u8).collect();
    RawImage::packed(WIDTH, HEIGHT, encoding, bytes_per_pixel, data)
}

/// Benchmark raw message to BGR8 frame conversion
/// This runs once per received message on the pump tick
fn bench_receive(c: &mut Criterion) {
    let mut group = c.benchmark_group("receive");

    for (encoding, bpp) in [("bgr8", 3), ("rgb8", 3), ("rgba8", 4), ("mono8", 1)] {
        let msg = create_test_image(encoding, bpp);
        group.bench_function(encoding, |b| {
            b.iter(|| black_box(to_bgr8(black_box(&msg))));
        });
    }

    group.finish();
}

/// Benchmark the BGR to RGB swap done on every refresh tick
fn bench_refresh(c: &mut Criterion) {
    let frame = match to_bgr8(&create_test_image("bgr8", 3)) {
        Ok(frame) => frame,
        Err(e) => panic!("test image must convert: {}", e),
    };

    c.bench_function("refresh_swap_vga", |b| {
        b.iter(|| black_box(bgr_to_rgb(black_box(&frame))));
    });
}

criterion_group!(benches, bench_receive, bench_refresh);
criterion_main!(benches);
