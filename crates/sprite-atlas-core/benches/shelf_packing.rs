use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use image::{Rgba, RgbaImage};
use sprite_atlas_core::prelude::*;

fn generate_sizes(count: usize, min_size: u32, max_size: u32) -> Vec<(u32, u32)> {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
    (0..count)
        .map(|_| {
            (
                rng.gen_range(min_size..=max_size),
                rng.gen_range(min_size..=max_size),
            )
        })
        .collect()
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("shelf_layout");
    let packer = ShelfPacker::new(&PackConfig::default());
    for count in [50, 200, 1000] {
        let sizes = generate_sizes(count, 8, 96);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &sizes, |b, sizes| {
            b.iter(|| black_box(packer.pack(sizes)))
        });
    }
    group.finish();
}

fn bench_pack_images(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack_images");
    let cfg = PackConfig::default();
    for count in [32, 128] {
        let sizes = generate_sizes(count, 16, 64);
        let frames: Vec<RgbaImage> = sizes
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| {
                let mut img = RgbaImage::new(w + 4, h + 4);
                for y in 2..h + 2 {
                    for x in 2..w + 2 {
                        img.put_pixel(x, y, Rgba([(i % 251) as u8, 64, 128, 255]));
                    }
                }
                img
            })
            .collect();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &frames, |b, frames| {
            b.iter(|| {
                let inputs = frames
                    .iter()
                    .enumerate()
                    .map(|(i, img)| InputImage {
                        name: format!("frame_{i:04}"),
                        source: None,
                        image: img.clone().into(),
                    })
                    .collect();
                black_box(pack_images("bench", inputs, &cfg))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_layout, bench_pack_images);
criterion_main!(benches);
